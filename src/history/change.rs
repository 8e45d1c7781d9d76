// ============================================================================
// Action Records
// ============================================================================
//
// One reversible description of a past mutation. Insert and Remove carry
// a single snapshot; Update also carries the state it overwrote, so that
// chained updates unwind one step at a time.
//
// ============================================================================

use crate::core::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a logged action (not of the entity it touched)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(Uuid);

impl ActionId {
    pub fn new() -> Self {
        ActionId(Uuid::new_v4())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Insert,
    Update,
    Remove,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Insert => write!(f, "INSERT"),
            ActionKind::Update => write!(f, "UPDATE"),
            ActionKind::Remove => write!(f, "REMOVE"),
        }
    }
}

/// A logged mutation that `undo_last` knows how to reverse.
///
/// Built only through the three constructors, which keeps
/// `prior_snapshot` present exactly for updates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord<E> {
    id: ActionId,
    kind: ActionKind,
    entity_snapshot: E,
    #[serde(skip_serializing_if = "Option::is_none")]
    prior_snapshot: Option<E>,
    timestamp: DateTime<Utc>,
}

impl<E: Entity> ActionRecord<E> {
    pub(crate) fn insert(entity: E, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: ActionId::new(),
            kind: ActionKind::Insert,
            entity_snapshot: entity,
            prior_snapshot: None,
            timestamp,
        }
    }

    pub(crate) fn update(updated: E, prior: E, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: ActionId::new(),
            kind: ActionKind::Update,
            entity_snapshot: updated,
            prior_snapshot: Some(prior),
            timestamp,
        }
    }

    pub(crate) fn remove(removed: E, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: ActionId::new(),
            kind: ActionKind::Remove,
            entity_snapshot: removed,
            prior_snapshot: None,
            timestamp,
        }
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// State after the action, or the removed entity for `Remove`.
    pub fn entity_snapshot(&self) -> &E {
        &self.entity_snapshot
    }

    /// State before the action; only present for `Update`.
    pub fn prior_snapshot(&self) -> Option<&E> {
        self.prior_snapshot.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn entity_id(&self) -> &str {
        self.entity_snapshot.id()
    }

    /// One-line description for "last action" displays
    pub fn summary(&self) -> String {
        format!(
            "{} {} at {}",
            self.kind,
            self.entity_id(),
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}
