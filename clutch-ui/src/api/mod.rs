//! HTTP API surface
//!
//! REST endpoints plus the SSE event stream. Handlers return domain errors
//! mapped onto HTTP statuses through [`ApiError`]; the body is always a
//! JSON `{"error": "..."}` envelope.

pub mod activity;
pub mod agents;
pub mod dashboard;
pub mod health;
pub mod logs;
pub mod missions;
pub mod sse;
pub mod tasks;
pub mod usage;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use clutch_common::Error;

use crate::AppState;

/// JSON error envelope returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Domain error carried to the HTTP layer
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) | Error::Config(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Assemble the full application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/agents", get(agents::list))
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route("/api/tasks/:id/status", patch(tasks::update_status))
        .route("/api/missions", get(missions::list).post(missions::create))
        .route("/api/missions/board", get(missions::board))
        .route("/api/missions/:id/advance", post(missions::advance))
        .route("/api/missions/:id/status", put(missions::report_status))
        .route(
            "/api/autopilot",
            get(missions::autopilot_state).post(missions::autopilot_toggle),
        )
        .route("/api/activity", get(activity::list))
        .route("/api/logs", get(logs::list).post(logs::create))
        .route("/api/usage", get(usage::summary).post(usage::report))
        .route("/api/dashboard", get(dashboard::summary))
        .route("/api/events", get(sse::events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
