//! HTTP surface for the roster.
//!
//! Every success body is wrapped as `{ "data": ... }`; every failure as
//! `{ "error": ..., "code": ... }`.

pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;

use crate::core::DbError;
use crate::history::ActionRecord;
use crate::roster::Student;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// The undo entry that was consumed, when an undo could not be applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionRecord<Student>>,
}

#[derive(Debug)]
pub enum WebError {
    Database(DbError),
    NotFound(String),
    /// Request body or query string could not be extracted.
    InvalidRequest { status: StatusCode, message: String },
    /// Undo popped `action` but the store had diverged.
    UndoConflict {
        error: DbError,
        action: Box<ActionRecord<Student>>,
    },
}

impl From<DbError> for WebError {
    fn from(err: DbError) -> Self {
        WebError::Database(err)
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        WebError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        WebError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

fn classify(err: &DbError) -> (StatusCode, &'static str) {
    match err {
        DbError::DuplicateId(_) => (StatusCode::CONFLICT, "duplicate_id"),
        DbError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        DbError::ReinsertConflict(_) => (StatusCode::CONFLICT, "reinsert_conflict"),
        DbError::StaleUndo(_) => (StatusCode::CONFLICT, "stale_undo"),
        DbError::InvalidTransition(_) => (StatusCode::CONFLICT, "invalid_transition"),
        DbError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
        DbError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error"),
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            WebError::Database(err) => {
                let (status, code) = classify(&err);
                (
                    status,
                    ErrorResponse {
                        error: err.to_string(),
                        code: code.to_string(),
                        action: None,
                    },
                )
            }
            WebError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: msg,
                    code: "not_found".to_string(),
                    action: None,
                },
            ),
            WebError::InvalidRequest { status, message } => (
                status,
                ErrorResponse {
                    error: message,
                    code: "invalid_request".to_string(),
                    action: None,
                },
            ),
            WebError::UndoConflict { error, action } => {
                let (status, code) = classify(&error);
                (
                    status,
                    ErrorResponse {
                        error: error.to_string(),
                        code: code.to_string(),
                        action: Some(*action),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
