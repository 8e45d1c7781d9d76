// ============================================================================
// RosterDB Library
// ============================================================================
//
// In-memory student roster with a one-step undo log.
//
// Layers, bottom-up:
// - core:    entity contract and error taxonomy
// - storage: RecordStore and on-disk snapshots
// - history: ReversibleActionLog (record_* / peek_last / undo_last)
// - roster:  student domain, shared service handle, reports
// - web:     axum router over the roster
//
// ============================================================================

pub mod app;
pub mod config;
pub mod core;
pub mod history;
pub mod roster;
pub mod storage;
pub mod web;

pub use config::AppConfig;
pub use core::{DbError, Entity, Patch, Record, RecordPatch, Result};
pub use history::{
    ActionId, ActionKind, ActionRecord, LogState, ReversibleActionLog, UndoEffect, UndoReport,
};
pub use roster::{NewStudent, RosterService, Student, StudentPatch, StudentStatus};
pub use storage::{RecordStore, SnapshotManager, StoreSnapshot};
pub use web::{AppState, build_router};
