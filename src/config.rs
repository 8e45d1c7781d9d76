use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Service configuration
///
/// Read from `ROSTER_*` environment variables (a `.env` file is honoured),
/// then adjusted with the builder setters, e.g. from command-line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Where the roster is saved on shutdown and loaded on start
    pub snapshot_path: Option<PathBuf>,

    /// Maximum retained undo entries; 0 keeps all of them
    pub undo_retention: usize,

    /// Load the sample roster when no snapshot is found
    pub seed: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            snapshot_path: None,
            undo_retention: 0,
            seed: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = lookup("ROSTER_HOST").unwrap_or(defaults.host);

        let port = match lookup("ROSTER_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .context("ROSTER_PORT must be a valid u16")?,
            None => defaults.port,
        };

        let snapshot_path = lookup("ROSTER_SNAPSHOT_PATH")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        let undo_retention = match lookup("ROSTER_UNDO_RETENTION") {
            Some(raw) => raw
                .parse::<usize>()
                .context("ROSTER_UNDO_RETENTION must be a non-negative integer")?,
            None => defaults.undo_retention,
        };

        let seed = match lookup("ROSTER_SEED") {
            Some(raw) => parse_flag(&raw).context("ROSTER_SEED must be true or false")?,
            None => defaults.seed,
        };

        Ok(Self {
            host,
            port,
            snapshot_path,
            undo_retention,
            seed,
        })
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn undo_retention(mut self, limit: usize) -> Self {
        self.undo_retention = limit;
        self
    }

    pub fn seed(mut self, seed: bool) -> Self {
        self.seed = seed;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("unrecognised flag value '{other}'")),
    }
}
