use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use super::{ApiResponse, Result, WebError, state::AppState};
use crate::history::{ActionRecord, UndoEffect};
use crate::roster::{NewStudent, RosterReport, Student, StudentPatch, StudentStatus};

#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListStudentsQuery {
    pub status: Option<StudentStatus>,
}

/// Newest undo entry plus its one-line description.
#[derive(Debug, Serialize)]
pub struct LastActionView {
    pub summary: String,
    pub action: ActionRecord<Student>,
    pub depth: usize,
}

#[derive(Debug, Serialize)]
pub struct UndoView {
    pub action: ActionRecord<Student>,
    pub effect: UndoEffect,
    pub remaining: usize,
}

pub async fn healthcheck() -> Json<ApiResponse<ApiMessage>> {
    Json(ApiResponse {
        data: ApiMessage {
            message: "ok".to_string(),
        },
    })
}

pub async fn list_students(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListStudentsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Student>>>> {
    let Query(query) = query?;
    let students = state.roster.list(query.status).await;
    Ok(Json(ApiResponse { data: students }))
}

pub async fn create_student(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewStudent>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Student>>)> {
    let Json(payload) = payload?;
    let student = state.roster.add(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse { data: student })))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Student>>> {
    let student = state.roster.get(&id).await?;
    Ok(Json(ApiResponse { data: student }))
}

pub async fn patch_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<StudentPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Student>>> {
    let Json(payload) = payload?;
    let student = state.roster.update(&id, payload).await?;
    Ok(Json(ApiResponse { data: student }))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Student>>> {
    let removed = state.roster.delete(&id).await?;
    Ok(Json(ApiResponse { data: removed }))
}

pub async fn approve_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Student>>> {
    let student = state.roster.approve(&id).await?;
    Ok(Json(ApiResponse { data: student }))
}

pub async fn reject_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Student>>> {
    let student = state.roster.reject(&id).await?;
    Ok(Json(ApiResponse { data: student }))
}

pub async fn last_action(
    State(state): State<AppState>,
) -> Json<ApiResponse<Option<LastActionView>>> {
    let view = state
        .roster
        .last_action()
        .await
        .map(|(action, depth)| LastActionView {
            summary: action.summary(),
            action,
            depth,
        });
    Json(ApiResponse { data: view })
}

pub async fn undo_last(State(state): State<AppState>) -> Result<Json<ApiResponse<UndoView>>> {
    let (report, remaining) = state
        .roster
        .undo()
        .await
        .ok_or_else(|| WebError::NotFound("nothing to undo".to_string()))?;

    match report.outcome {
        Ok(effect) => Ok(Json(ApiResponse {
            data: UndoView {
                action: report.action,
                effect,
                remaining,
            },
        })),
        Err(error) => Err(WebError::UndoConflict {
            error,
            action: Box::new(report.action),
        }),
    }
}

pub async fn reports(State(state): State<AppState>) -> Json<ApiResponse<RosterReport>> {
    Json(ApiResponse {
        data: state.roster.reports().await,
    })
}
