//! Task endpoints
//!
//! Tasks are flat work items outside the mission pipeline; mutations are
//! broadcast on the event bus for connected dashboards.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use clutch_common::db::agents::touch_agent;
use clutch_common::db::models::TaskRow;
use clutch_common::db::tasks::{create_task, list_tasks, update_task_status};
use clutch_common::events::ClutchEvent;
use clutch_common::Error;

use super::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub description: String,
    pub agent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// GET /api/tasks - most recent tasks first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<TaskRow>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let tasks = list_tasks(&state.pool, limit).await?;
    Ok(Json(tasks))
}

/// POST /api/tasks - create a pending task
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<TaskRow>> {
    if req.description.trim().is_empty() {
        return Err(Error::InvalidInput("task description is empty".to_string()).into());
    }

    let task = create_task(&state.pool, req.agent_id.as_deref(), req.description.trim()).await?;
    if let Some(agent_id) = &task.agent_id {
        touch_agent(&state.pool, agent_id).await?;
    }
    state.bus.emit_lossy(ClutchEvent::TaskCreated {
        task: task.clone(),
        timestamp: Utc::now(),
    });
    Ok(Json(task))
}

/// PATCH /api/tasks/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<TaskRow>> {
    let task = update_task_status(&state.pool, &id, &req.status).await?;
    if let Some(agent_id) = &task.agent_id {
        touch_agent(&state.pool, agent_id).await?;
    }
    state.bus.emit_lossy(ClutchEvent::TaskUpdated {
        task: task.clone(),
        timestamp: Utc::now(),
    });
    Ok(Json(task))
}
