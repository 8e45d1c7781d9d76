use super::models::{NewStudent, SetStatus, Student, StudentPatch, StudentStatus};
use super::reports::RosterReport;
use crate::core::{DbError, Result};
use crate::history::{ActionRecord, ReversibleActionLog, UndoReport};
use crate::storage::{RecordStore, StoreSnapshot};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Shared handle to the roster and its undo log.
///
/// Created once at startup and cloned into every request handler. All
/// mutations, undo included, run under the same write lock, so a
/// read-merge-write can never interleave with another mutation.
#[derive(Clone)]
pub struct RosterService {
    log: Arc<RwLock<ReversibleActionLog<Student>>>,
}

impl RosterService {
    pub fn new(store: RecordStore<Student>) -> Self {
        Self::with_log(ReversibleActionLog::new(store))
    }

    pub fn with_log(log: ReversibleActionLog<Student>) -> Self {
        Self {
            log: Arc::new(RwLock::new(log)),
        }
    }

    pub async fn list(&self, status: Option<StudentStatus>) -> Vec<Student> {
        let log = self.log.read().await;
        log.store()
            .iter()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Student> {
        let log = self.log.read().await;
        log.store()
            .get(id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(id.to_string()))
    }

    pub async fn add(&self, payload: NewStudent) -> Result<Student> {
        payload.validate()?;
        let student = payload.into_student();
        let mut log = self.log.write().await;
        let action = log.record_insert(student)?;
        info!(student_id = action.entity_id(), "student added");
        Ok(action.entity_snapshot().clone())
    }

    pub async fn update(&self, id: &str, patch: StudentPatch) -> Result<Student> {
        patch.validate()?;
        let mut log = self.log.write().await;
        let action = log.record_update(id, &patch)?;
        info!(student_id = id, "student updated");
        Ok(action.entity_snapshot().clone())
    }

    pub async fn delete(&self, id: &str) -> Result<Student> {
        let mut log = self.log.write().await;
        let action = log.record_remove(id)?;
        info!(student_id = id, "student deleted");
        Ok(action.entity_snapshot().clone())
    }

    /// Pending -> approved, logged as an update so it can be undone.
    pub async fn approve(&self, id: &str) -> Result<Student> {
        let mut log = self.log.write().await;
        ensure_pending(log.store(), id, "approve")?;
        let action = log.record_update(id, &SetStatus(StudentStatus::Approved))?;
        info!(student_id = id, "student approved");
        Ok(action.entity_snapshot().clone())
    }

    /// Drops a pending student, logged as a remove so it can be undone.
    pub async fn reject(&self, id: &str) -> Result<Student> {
        let mut log = self.log.write().await;
        ensure_pending(log.store(), id, "reject")?;
        let action = log.record_remove(id)?;
        info!(student_id = id, "student rejected");
        Ok(action.entity_snapshot().clone())
    }

    /// Undo the newest action. Also returns the log depth left behind,
    /// read under the same write lock.
    pub async fn undo(&self) -> Option<(UndoReport<Student>, usize)> {
        let mut log = self.log.write().await;
        let report = log.undo_last()?;
        Some((report, log.len()))
    }

    /// Newest undoable action and the current log depth.
    pub async fn last_action(&self) -> Option<(ActionRecord<Student>, usize)> {
        let log = self.log.read().await;
        let action = log.peek_last()?.clone();
        Some((action, log.len()))
    }

    pub async fn snapshot(&self) -> StoreSnapshot<Student> {
        StoreSnapshot::capture(self.log.read().await.store())
    }

    pub async fn reports(&self) -> RosterReport {
        let log = self.log.read().await;
        let students = log.store().list();
        RosterReport::build(&students)
    }
}

fn ensure_pending(store: &RecordStore<Student>, id: &str, verb: &str) -> Result<()> {
    let student = store
        .get(id)
        .ok_or_else(|| DbError::NotFound(id.to_string()))?;
    if student.status != StudentStatus::Pending {
        return Err(DbError::InvalidTransition(format!(
            "cannot {} student '{}': status is {}",
            verb, id, student.status
        )));
    }
    Ok(())
}
