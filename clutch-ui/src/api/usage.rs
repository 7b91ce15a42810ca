//! Token usage endpoints
//!
//! Agents report their token spend per call; the budget panel reads the
//! trailing-24h aggregate.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use clutch_common::db::models::UsageSummary;
use clutch_common::db::usage::{record_usage, usage_summary};
use clutch_common::Error;

use super::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportUsageRequest {
    pub agent_id: Option<String>,
    pub tokens_in: i64,
    pub tokens_out: i64,
    pub cost_usd: f64,
}

/// GET /api/usage - trailing-24h aggregate
pub async fn summary(State(state): State<AppState>) -> ApiResult<Json<UsageSummary>> {
    Ok(Json(usage_summary(&state.pool).await?))
}

/// POST /api/usage - record one usage sample
pub async fn report(
    State(state): State<AppState>,
    Json(req): Json<ReportUsageRequest>,
) -> ApiResult<Json<UsageSummary>> {
    if req.tokens_in < 0 || req.tokens_out < 0 || req.cost_usd < 0.0 {
        return Err(Error::InvalidInput("usage values must be non-negative".to_string()).into());
    }

    record_usage(
        &state.pool,
        req.agent_id.as_deref(),
        req.tokens_in,
        req.tokens_out,
        req.cost_usd,
    )
    .await?;
    Ok(Json(usage_summary(&state.pool).await?))
}
