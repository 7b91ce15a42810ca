//! Agent roster endpoint

use axum::extract::State;
use axum::Json;

use clutch_common::db::agents::list_agents;
use clutch_common::db::models::AgentRow;

use super::ApiResult;
use crate::AppState;

/// GET /api/agents - full roster, oldest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<AgentRow>>> {
    let agents = list_agents(&state.pool).await?;
    Ok(Json(agents))
}
