//! On-disk snapshots of a record store.
//!
//! Only entity state is written. The action log stays in memory and starts
//! empty after every restart.

use crate::core::{DbError, Entity, Result};
use crate::storage::RecordStore;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSnapshot<E> {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub entities: Vec<E>,
}

impl<E: Entity> StoreSnapshot<E> {
    pub fn capture(store: &RecordStore<E>) -> Self {
        Self::from_entities(store.list())
    }

    pub fn from_entities(entities: Vec<E>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            entities,
        }
    }

    pub fn into_store(self) -> Result<RecordStore<E>> {
        RecordStore::from_entities(self.entities)
    }
}

pub struct SnapshotManager {
    snapshot_path: PathBuf,
}

impl SnapshotManager {
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
        }
    }

    /// Write the snapshot atomically: temp file, fsync, rename.
    pub fn save<E: Serialize>(&self, snapshot: &StoreSnapshot<E>) -> Result<()> {
        if let Some(parent) = self.snapshot_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DbError::Persistence(format!("Failed to create snapshot directory: {}", e))
            })?;
        }
        let temp_path = self.snapshot_path.with_extension("tmp");
        let file = File::create(&temp_path)
            .map_err(|e| DbError::Persistence(format!("Failed to create snapshot: {}", e)))?;
        let mut writer = BufWriter::new(file);
        let serialized = rmp_serde::to_vec_named(snapshot)
            .map_err(|e| DbError::Persistence(format!("Failed to serialize snapshot: {}", e)))?;
        writer
            .write_all(&serialized)
            .map_err(|e| DbError::Persistence(format!("Failed to write snapshot: {}", e)))?;
        writer
            .flush()
            .map_err(|e| DbError::Persistence(format!("Failed to flush snapshot: {}", e)))?;
        writer
            .get_mut()
            .sync_all()
            .map_err(|e| DbError::Persistence(format!("Failed to sync snapshot: {}", e)))?;
        fs::rename(&temp_path, &self.snapshot_path)
            .map_err(|e| DbError::Persistence(format!("Failed to rename snapshot: {}", e)))?;
        Ok(())
    }

    pub fn load<E: DeserializeOwned>(&self) -> Result<Option<StoreSnapshot<E>>> {
        if !self.snapshot_path.exists() {
            return Ok(None);
        }
        let mut file = File::open(&self.snapshot_path)
            .map_err(|e| DbError::Persistence(format!("Failed to open snapshot: {}", e)))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| DbError::Persistence(format!("Failed to read snapshot: {}", e)))?;
        let snapshot: StoreSnapshot<E> = rmp_serde::from_slice(&data)
            .map_err(|e| DbError::Persistence(format!("Failed to deserialize snapshot: {}", e)))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DbError::Persistence(format!(
                "Unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(Some(snapshot))
    }
}
