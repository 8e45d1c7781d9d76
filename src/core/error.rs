use thiserror::Error;

/// Every failure the store, the action log and the roster can report.
///
/// None of these are fatal: after any of them the store and the log are
/// left in a consistent state that the caller can inspect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("Entity '{0}' already exists")]
    DuplicateId(String),

    #[error("Entity '{0}' not found")]
    NotFound(String),

    #[error("Cannot reinsert '{0}': the id was reused after it was removed")]
    ReinsertConflict(String),

    #[error("Cannot restore '{0}': the entity was removed after it was updated")]
    StaleUndo(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl DbError {
    /// True for the two conditions an undo can hit when the store has
    /// diverged from what the logged action expects.
    pub fn is_undo_conflict(&self) -> bool {
        matches!(self, DbError::ReinsertConflict(_) | DbError::StaleUndo(_))
    }

    /// Id of the entity involved, when the error is about one.
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            DbError::DuplicateId(id)
            | DbError::NotFound(id)
            | DbError::ReinsertConflict(id)
            | DbError::StaleUndo(id) => Some(id),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
