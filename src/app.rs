//! Startup and shutdown wiring shared by the binary and the tests.

use crate::config::AppConfig;
use crate::core::Result;
use crate::history::ReversibleActionLog;
use crate::roster::{RosterService, Student, seed_students};
use crate::storage::{RecordStore, SnapshotManager};
use tracing::info;

/// Build the roster: snapshot first, then seed data, else empty.
pub fn open_roster(config: &AppConfig) -> Result<RosterService> {
    let store = match &config.snapshot_path {
        Some(path) => match SnapshotManager::new(path).load::<Student>()? {
            Some(snapshot) => {
                info!(path = %path.display(), students = snapshot.entities.len(), "loaded roster snapshot");
                snapshot.into_store()?
            }
            None => initial_store(config)?,
        },
        None => initial_store(config)?,
    };

    let log = ReversibleActionLog::new(store).with_retention(config.undo_retention);
    Ok(RosterService::with_log(log))
}

/// Save the roster when a snapshot path is configured. The undo log is
/// not saved.
pub async fn persist_roster(roster: &RosterService, config: &AppConfig) -> Result<()> {
    let Some(path) = &config.snapshot_path else {
        return Ok(());
    };
    let snapshot = roster.snapshot().await;
    let count = snapshot.entities.len();
    SnapshotManager::new(path).save(&snapshot)?;
    info!(path = %path.display(), students = count, "saved roster snapshot");
    Ok(())
}

fn initial_store(config: &AppConfig) -> Result<RecordStore<Student>> {
    if config.seed {
        info!("starting from sample roster");
        RecordStore::from_entities(seed_students())
    } else {
        Ok(RecordStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::NewStudent;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_seed_and_empty_start() {
        let seeded = open_roster(&AppConfig::default()).unwrap();
        assert_eq!(seeded.list(None).await.len(), 4);

        let empty = open_roster(&AppConfig::default().seed(false)).unwrap();
        assert!(empty.list(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_survives_restart_but_undo_does_not() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::default().snapshot_path(temp_dir.path().join("roster.snapshot"));

        let roster = open_roster(&config).unwrap();
        roster
            .add(NewStudent {
                id: "S200".to_string(),
                name: "Ada Lovelace".to_string(),
                age: 28,
                marks: 99,
                department: "Mathematics".to_string(),
            })
            .await
            .unwrap();
        persist_roster(&roster, &config).await.unwrap();

        let reopened = open_roster(&config).unwrap();
        assert_eq!(reopened.list(None).await.len(), 5);
        assert!(reopened.get("S200").await.is_ok());
        assert!(reopened.last_action().await.is_none());
        assert!(reopened.undo().await.is_none());
    }

    #[tokio::test]
    async fn test_persist_without_path_is_noop() {
        let roster = open_roster(&AppConfig::default()).unwrap();
        persist_roster(&roster, &AppConfig::default()).await.unwrap();
    }
}
