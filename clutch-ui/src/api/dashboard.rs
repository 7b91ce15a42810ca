//! Aggregate dashboard endpoint
//!
//! One round trip for the initial page render: roster, recent tasks,
//! recent logs, activity feed, usage summary, and the mission board.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use clutch_common::db::activity::recent_activity;
use clutch_common::db::agents::list_agents;
use clutch_common::db::logs::recent_logs;
use clutch_common::db::models::{ActivityRow, AgentRow, LogRow, TaskRow, UsageSummary};
use clutch_common::db::tasks::list_tasks;
use clutch_common::db::usage::usage_summary;

use super::ApiResult;
use crate::board::BoardColumn;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub agents: Vec<AgentRow>,
    pub tasks: Vec<TaskRow>,
    pub logs: Vec<LogRow>,
    pub activity: Vec<ActivityRow>,
    pub usage: UsageSummary,
    pub board: Vec<BoardColumn>,
    pub autopilot_enabled: bool,
}

/// GET /api/dashboard
pub async fn summary(State(state): State<AppState>) -> ApiResult<Json<DashboardResponse>> {
    let agents = list_agents(&state.pool).await?;
    let tasks = list_tasks(&state.pool, 20).await?;
    let logs = recent_logs(&state.pool, 50).await?;
    let activity = recent_activity(&state.pool, 20).await?;
    let usage = usage_summary(&state.pool).await?;

    Ok(Json(DashboardResponse {
        agents,
        tasks,
        logs,
        activity,
        usage,
        board: state.board.grouped(None),
        autopilot_enabled: state.autopilot.is_enabled(),
    }))
}
