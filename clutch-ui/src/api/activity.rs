//! Activity feed endpoint

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use clutch_common::db::activity::recent_activity;
use clutch_common::db::models::ActivityRow;

use super::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// GET /api/activity - newest entries first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ActivityRow>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let feed = recent_activity(&state.pool, limit).await?;
    Ok(Json(feed))
}
