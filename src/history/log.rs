// ============================================================================
// Reversible Action Log
// ============================================================================
//
// Wraps a RecordStore so that every successful mutation made through the
// log is paired with exactly one ActionRecord. Only the newest record is
// reachable: undo pops it and reverses it against the store.
//
// State transitions:
//
//   Empty ──record_*──> NonEmpty ──undo_last (last entry)──> Empty
//
// There is no redo. A popped action is gone.
//
// ============================================================================

use super::{ActionKind, ActionRecord};
use crate::core::{DbError, Entity, Patch, Result};
use crate::storage::RecordStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogState {
    Empty,
    NonEmpty,
}

/// What reversing an action did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndoEffect {
    /// An inserted entity was removed again.
    Removed,
    /// The inserted entity was already gone; the store was not touched.
    AlreadyAbsent,
    /// A removed entity was put back.
    Reinserted,
    /// An updated entity got its prior state back.
    Restored,
}

/// Result of `undo_last`: the popped action and what happened to the store.
///
/// The action is consumed whether or not the store could be brought back.
#[derive(Debug, Clone)]
pub struct UndoReport<E> {
    pub action: ActionRecord<E>,
    pub outcome: Result<UndoEffect>,
}

impl<E> UndoReport<E> {
    pub fn is_clean(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub struct ReversibleActionLog<E: Entity> {
    store: RecordStore<E>,
    actions: VecDeque<ActionRecord<E>>,
    /// Maximum number of retained actions; `None` keeps everything
    retention: Option<usize>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl<E: Entity> ReversibleActionLog<E> {
    pub fn new(store: RecordStore<E>) -> Self {
        Self {
            store,
            actions: VecDeque::new(),
            retention: None,
            last_timestamp: None,
        }
    }

    /// Keep at most `limit` actions, dropping the oldest first.
    ///
    /// Dropped actions were already unreachable by `undo_last`. A limit of
    /// zero means unbounded.
    pub fn with_retention(mut self, limit: usize) -> Self {
        self.retention = (limit > 0).then_some(limit);
        self.enforce_retention();
        self
    }

    pub fn retention(&self) -> Option<usize> {
        self.retention
    }

    /// Read access to the wrapped store.
    pub fn store(&self) -> &RecordStore<E> {
        &self.store
    }

    /// Direct, unlogged access to the wrapped store.
    ///
    /// Changes made here leave no undo trail, and may make a later undo
    /// report `ReinsertConflict` or `StaleUndo`.
    pub fn store_mut(&mut self) -> &mut RecordStore<E> {
        &mut self.store
    }

    pub fn into_store(self) -> RecordStore<E> {
        self.store
    }

    pub fn record_insert(&mut self, entity: E) -> Result<&ActionRecord<E>> {
        self.store.insert(entity.clone())?;
        debug!(entity_id = entity.id(), "recorded insert");
        let timestamp = self.next_timestamp();
        Ok(self.push(ActionRecord::insert(entity, timestamp)))
    }

    pub fn record_update<P>(&mut self, id: &str, patch: &P) -> Result<&ActionRecord<E>>
    where
        P: Patch<E> + ?Sized,
    {
        let current = self
            .store
            .get(id)
            .ok_or_else(|| DbError::NotFound(id.to_string()))?;

        // The prior snapshot is its own clone, taken before the merge.
        let prior = current.clone();
        let mut updated = current.clone();
        patch.apply_to(&mut updated);

        self.store.replace(id, updated.clone())?;
        debug!(entity_id = id, "recorded update");
        let timestamp = self.next_timestamp();
        Ok(self.push(ActionRecord::update(updated, prior, timestamp)))
    }

    pub fn record_remove(&mut self, id: &str) -> Result<&ActionRecord<E>> {
        let removed = self.store.remove(id)?;
        debug!(entity_id = id, "recorded remove");
        let timestamp = self.next_timestamp();
        Ok(self.push(ActionRecord::remove(removed, timestamp)))
    }

    pub fn peek_last(&self) -> Option<&ActionRecord<E>> {
        self.actions.back()
    }

    /// Pop the newest action and reverse it.
    ///
    /// Returns `None` on an empty log, leaving the store untouched.
    pub fn undo_last(&mut self) -> Option<UndoReport<E>> {
        let action = self.actions.pop_back()?;
        let outcome = self.reverse(&action);

        match &outcome {
            Ok(effect) => info!(
                action_id = %action.id(),
                kind = %action.kind(),
                entity_id = action.entity_id(),
                ?effect,
                "undid action"
            ),
            Err(err) => warn!(
                action_id = %action.id(),
                kind = %action.kind(),
                entity_id = action.entity_id(),
                error = %err,
                "undo consumed action without restoring it"
            ),
        }

        Some(UndoReport { action, outcome })
    }

    /// Newest-first view of the retained actions.
    pub fn history(&self) -> impl Iterator<Item = &ActionRecord<E>> {
        self.actions.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn state(&self) -> LogState {
        if self.actions.is_empty() {
            LogState::Empty
        } else {
            LogState::NonEmpty
        }
    }

    fn reverse(&mut self, action: &ActionRecord<E>) -> Result<UndoEffect> {
        let id = action.entity_id();
        match action.kind() {
            ActionKind::Insert => match self.store.remove(id) {
                Ok(_) => Ok(UndoEffect::Removed),
                Err(DbError::NotFound(_)) => Ok(UndoEffect::AlreadyAbsent),
                Err(err) => Err(err),
            },
            ActionKind::Remove => match self.store.insert(action.entity_snapshot().clone()) {
                Ok(()) => Ok(UndoEffect::Reinserted),
                Err(DbError::DuplicateId(_)) => Err(DbError::ReinsertConflict(id.to_string())),
                Err(err) => Err(err),
            },
            ActionKind::Update => {
                let prior = action
                    .prior_snapshot()
                    .ok_or_else(|| DbError::StaleUndo(id.to_string()))?;
                match self.store.replace(prior.id(), prior.clone()) {
                    Ok(()) => Ok(UndoEffect::Restored),
                    Err(DbError::NotFound(_)) => Err(DbError::StaleUndo(id.to_string())),
                    Err(err) => Err(err),
                }
            }
        }
    }

    fn push(&mut self, action: ActionRecord<E>) -> &ActionRecord<E> {
        self.actions.push_back(action);
        self.enforce_retention();
        // push_back above guarantees a tail; retention never drops below one.
        &self.actions[self.actions.len() - 1]
    }

    fn enforce_retention(&mut self) {
        let Some(limit) = self.retention else {
            return;
        };
        while self.actions.len() > limit {
            if let Some(dropped) = self.actions.pop_front() {
                debug!(action_id = %dropped.id(), "dropped action past retention limit");
            }
        }
    }

    fn next_timestamp(&mut self) -> DateTime<Utc> {
        self.stamp(Utc::now())
    }

    /// Clamp `now` so the log never goes backwards.
    fn stamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let timestamp = match self.last_timestamp {
            Some(last) if now < last => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }
}

impl<E: Entity> Default for ReversibleActionLog<E> {
    fn default() -> Self {
        Self::new(RecordStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Record, RecordPatch};
    use serde_json::json;

    fn student(id: &str, name: &str, marks: i64) -> Record {
        Record::new(id)
            .with_field("name", name)
            .with_field("marks", marks)
            .with_field("department", "Physics")
    }

    fn marks(log: &ReversibleActionLog<Record>, id: &str) -> Option<serde_json::Value> {
        log.store().get(id).and_then(|r| r.get("marks").cloned())
    }

    #[test]
    fn test_insert_then_undo_empties_store() {
        let mut log = ReversibleActionLog::default();
        log.record_insert(student("S1", "Alice", 80)).unwrap();
        assert_eq!(log.store().list().len(), 1);
        assert_eq!(log.state(), LogState::NonEmpty);

        let report = log.undo_last().unwrap();
        assert_eq!(report.outcome, Ok(UndoEffect::Removed));
        assert_eq!(report.action.kind(), ActionKind::Insert);
        assert!(log.store().is_empty());
        assert_eq!(log.state(), LogState::Empty);
    }

    #[test]
    fn test_update_then_undo_restores_marks() {
        let store = RecordStore::from_entities(vec![student("S1", "Alice", 80)]).unwrap();
        let mut log = ReversibleActionLog::new(store);

        log.record_update("S1", &RecordPatch::new().set("marks", 95))
            .unwrap();
        assert_eq!(marks(&log, "S1"), Some(json!(95)));

        let report = log.undo_last().unwrap();
        assert_eq!(report.outcome, Ok(UndoEffect::Restored));
        assert_eq!(marks(&log, "S1"), Some(json!(80)));
    }

    #[test]
    fn test_remove_then_undo_reinserts_exact_entity() {
        let original = student("S1", "Alice", 80);
        let store = RecordStore::from_entities(vec![original.clone()]).unwrap();
        let mut log = ReversibleActionLog::new(store);

        log.record_remove("S1").unwrap();
        assert!(log.store().get("S1").is_none());

        let report = log.undo_last().unwrap();
        assert_eq!(report.outcome, Ok(UndoEffect::Reinserted));
        assert_eq!(log.store().get("S1"), Some(&original));
    }

    #[test]
    fn test_undo_on_empty_log_is_noop() {
        let store = RecordStore::from_entities(vec![student("S1", "Alice", 80)]).unwrap();
        let mut log = ReversibleActionLog::new(store);
        let before = log.store().list();

        assert!(log.undo_last().is_none());
        assert_eq!(log.store().list(), before);
        assert_eq!(log.state(), LogState::Empty);
    }

    #[test]
    fn test_chained_updates_unwind_one_step() {
        let store = RecordStore::from_entities(vec![student("S1", "Alice", 80)]).unwrap();
        let mut log = ReversibleActionLog::new(store);

        log.record_update("S1", &RecordPatch::new().set("marks", 90))
            .unwrap();
        log.record_update("S1", &RecordPatch::new().set("marks", 99))
            .unwrap();

        log.undo_last().unwrap();
        assert_eq!(marks(&log, "S1"), Some(json!(90)));
        assert_eq!(log.len(), 1);

        log.undo_last().unwrap();
        assert_eq!(marks(&log, "S1"), Some(json!(80)));
        assert!(log.is_empty());
    }

    #[test]
    fn test_update_prior_snapshot_is_independent_of_merge() {
        let store = RecordStore::from_entities(vec![student("S1", "Alice", 80)]).unwrap();
        let mut log = ReversibleActionLog::new(store);

        let rename = |r: &mut Record| {
            r.fields.insert("name".into(), json!("Alicia"));
            r.fields.insert("marks".into(), json!(0));
        };
        let action = log.record_update("S1", &rename).unwrap();

        let prior = action.prior_snapshot().unwrap();
        assert_eq!(prior.get("name"), Some(&json!("Alice")));
        assert_eq!(prior.get("marks"), Some(&json!(80)));
        assert_eq!(action.entity_snapshot().get("name"), Some(&json!("Alicia")));
    }

    #[test]
    fn test_failed_mutations_are_not_logged() {
        let store = RecordStore::from_entities(vec![student("S1", "Alice", 80)]).unwrap();
        let mut log = ReversibleActionLog::new(store);

        assert_eq!(
            log.record_insert(student("S1", "Other", 1)).unwrap_err(),
            DbError::DuplicateId("S1".into())
        );
        assert_eq!(
            log.record_update("S9", &RecordPatch::new()).unwrap_err(),
            DbError::NotFound("S9".into())
        );
        assert_eq!(
            log.record_remove("S9").unwrap_err(),
            DbError::NotFound("S9".into())
        );
        assert!(log.is_empty());
        assert!(log.peek_last().is_none());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut log = ReversibleActionLog::default();
        log.record_insert(student("S1", "Alice", 80)).unwrap();

        let first = log.peek_last().unwrap().id();
        let second = log.peek_last().unwrap().id();
        assert_eq!(first, second);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_undo_insert_after_out_of_band_removal() {
        let mut log = ReversibleActionLog::default();
        log.record_insert(student("S1", "Alice", 80)).unwrap();
        log.store_mut().remove("S1").unwrap();

        let report = log.undo_last().unwrap();
        assert_eq!(report.outcome, Ok(UndoEffect::AlreadyAbsent));
        assert!(log.is_empty());
        assert!(log.store().is_empty());
    }

    #[test]
    fn test_undo_remove_after_id_reused_is_conflict() {
        let store = RecordStore::from_entities(vec![student("S1", "Alice", 80)]).unwrap();
        let mut log = ReversibleActionLog::new(store);

        log.record_remove("S1").unwrap();
        log.store_mut().insert(student("S1", "Impostor", 10)).unwrap();

        let report = log.undo_last().unwrap();
        assert_eq!(report.outcome, Err(DbError::ReinsertConflict("S1".into())));
        assert!(!report.is_clean());
        assert_eq!(report.action.kind(), ActionKind::Remove);
        assert!(log.is_empty());
        assert_eq!(
            log.store().get("S1").and_then(|r| r.get("name")),
            Some(&json!("Impostor"))
        );
    }

    #[test]
    fn test_undo_update_after_removal_is_stale() {
        let store = RecordStore::from_entities(vec![student("S1", "Alice", 80)]).unwrap();
        let mut log = ReversibleActionLog::new(store);

        log.record_update("S1", &RecordPatch::new().set("marks", 95))
            .unwrap();
        log.store_mut().remove("S1").unwrap();

        let report = log.undo_last().unwrap();
        assert_eq!(report.outcome, Err(DbError::StaleUndo("S1".into())));
        assert!(log.is_empty());
        assert!(log.store().is_empty());
    }

    #[test]
    fn test_log_order_decides_what_is_undone() {
        let store = RecordStore::from_entities(vec![student("S1", "Alice", 80)]).unwrap();
        let mut log = ReversibleActionLog::new(store);

        log.record_remove("S1").unwrap();
        log.record_insert(student("S1", "Someone Else", 50)).unwrap();

        let report = log.undo_last().unwrap();
        assert_eq!(report.action.kind(), ActionKind::Insert);
        assert_eq!(report.outcome, Ok(UndoEffect::Removed));
        assert!(log.store().get("S1").is_none());
        assert_eq!(log.peek_last().map(|a| a.kind()), Some(ActionKind::Remove));
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let mut log = ReversibleActionLog::default();
        for i in 0..20 {
            log.record_insert(Record::new(format!("S{i}"))).unwrap();
        }
        let stamps: Vec<_> = log.history().map(|a| a.timestamp()).collect();
        assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_backwards_clock_is_clamped() {
        let mut log: ReversibleActionLog<Record> = ReversibleActionLog::default();
        let later = Utc::now();
        let earlier = later - chrono::Duration::seconds(30);

        assert_eq!(log.stamp(later), later);
        assert_eq!(log.stamp(earlier), later);

        let next = later + chrono::Duration::seconds(1);
        assert_eq!(log.stamp(next), next);

        // A recorded action made while the clock lags still sorts last.
        let ahead = Utc::now() + chrono::Duration::hours(1);
        log.stamp(ahead);
        let action = log.record_insert(Record::new("S1")).unwrap();
        assert_eq!(action.timestamp(), ahead);
    }

    #[test]
    fn test_retention_drops_oldest() {
        let mut log: ReversibleActionLog<Record> = ReversibleActionLog::default().with_retention(2);
        for id in ["a", "b", "c"] {
            log.record_insert(Record::new(id)).unwrap();
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.store().len(), 3);

        log.undo_last().unwrap();
        log.undo_last().unwrap();
        assert!(log.undo_last().is_none());
        assert_eq!(
            log.store().iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["a"]
        );
    }

    #[test]
    fn test_zero_retention_means_unbounded() {
        let mut log: ReversibleActionLog<Record> = ReversibleActionLog::default().with_retention(0);
        assert_eq!(log.retention(), None);
        for i in 0..5 {
            log.record_insert(Record::new(format!("S{i}"))).unwrap();
        }
        assert_eq!(log.len(), 5);
    }
}
