//! Diagnostic log endpoints
//!
//! Agents push their log lines here; the dashboard's log panel reads them
//! back newest first.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use clutch_common::db::logs::{recent_logs, record_log};
use clutch_common::db::models::LogRow;
use clutch_common::Error;

use super::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLogRequest {
    pub message: String,
    #[serde(default = "default_level")]
    pub level: String,
    pub agent_id: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

const ALLOWED_LEVELS: &[&str] = &["debug", "info", "warn", "error"];

/// GET /api/logs - newest entries first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<LogRow>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let logs = recent_logs(&state.pool, limit).await?;
    Ok(Json(logs))
}

/// POST /api/logs - append one log line
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateLogRequest>,
) -> ApiResult<Json<LogRow>> {
    if !ALLOWED_LEVELS.contains(&req.level.as_str()) {
        return Err(Error::InvalidInput(format!("invalid log level: {}", req.level)).into());
    }

    let row = record_log(
        &state.pool,
        req.agent_id.as_deref(),
        &req.level,
        &req.message,
    )
    .await?;
    Ok(Json(row))
}
