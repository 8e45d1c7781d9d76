// ============================================================================
// Undo History Module
// ============================================================================
//
// Reversible mutation log over a RecordStore.
//
// Design Patterns Used:
// - Command Pattern: each ActionRecord knows how to be reversed
// - Memento: snapshots are deep clones, never references into the store
//
// ============================================================================

pub mod change;
pub mod log;

pub use change::{ActionId, ActionKind, ActionRecord};
pub use log::{LogState, ReversibleActionLog, UndoEffect, UndoReport};
