use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, state::AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::healthcheck))
        .route(
            "/api/v1/students",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route(
            "/api/v1/students/{id}",
            get(handlers::get_student)
                .patch(handlers::patch_student)
                .delete(handlers::delete_student),
        )
        .route(
            "/api/v1/students/{id}/approve",
            post(handlers::approve_student),
        )
        .route("/api/v1/students/{id}/reject", post(handlers::reject_student))
        .route(
            "/api/v1/undo",
            get(handlers::last_action).post(handlers::undo_last),
        )
        .route("/api/v1/reports", get(handlers::reports))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
