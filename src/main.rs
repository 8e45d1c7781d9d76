use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rosterdb::{
    AppConfig, AppState, build_router,
    app::{open_roster, persist_roster},
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "rosterdb",
    about = "Student roster service with one-step undo",
    version,
    long_about = None
)]
struct Cli {
    /// Address to bind (overrides ROSTER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides ROSTER_PORT)
    #[arg(long, short)]
    port: Option<u16>,

    /// Snapshot file loaded on start and written on shutdown
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Maximum undo entries kept in memory; 0 keeps all
    #[arg(long)]
    undo_retention: Option<usize>,

    /// Start empty instead of with the sample roster
    #[arg(long)]
    no_seed: bool,
}

impl Cli {
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = self.host.as_deref() {
            config = config.host(host);
        }
        if let Some(port) = self.port {
            config = config.port(port);
        }
        if let Some(path) = self.snapshot {
            config = config.snapshot_path(path);
        }
        if let Some(limit) = self.undo_retention {
            config = config.undo_retention(limit);
        }
        if self.no_seed {
            config = config.seed(false);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.apply(AppConfig::from_env().context("failed to load configuration")?);

    let roster = open_roster(&config).context("failed to open roster")?;
    let app = build_router(AppState::new(roster.clone()));

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "roster service started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    persist_roster(&roster, &config)
        .await
        .context("failed to save roster snapshot")?;

    info!("roster service stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rosterdb=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
