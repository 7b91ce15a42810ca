//! Mission pipeline endpoints
//!
//! Creation, the flat and kanban views, the two transition surfaces (the
//! one-step advance and the authoritative status report), and the
//! auto-pilot toggle.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clutch_common::db::NewMission;
use clutch_common::events::AdvanceSource;
use clutch_common::{Error, Mission, MissionId, MissionStatus, Priority, SequenceKind};

use super::ApiResult;
use crate::board::{AdvanceOutcome, BoardColumn};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMissionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sequence: SequenceKind,
    pub assignee_id: Option<Uuid>,
    pub priority: Option<Priority>,
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ReportStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AutoPilotStateResponse {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct AutoPilotToggleRequest {
    pub enabled: bool,
}

fn parse_mission_id(raw: &str) -> Result<MissionId, Error> {
    MissionId::from_str(raw)
}

/// GET /api/missions - flat projection snapshot, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Mission>>> {
    Ok(Json(state.board.snapshot(query.project_id)))
}

/// GET /api/missions/board - kanban columns in stage order
pub async fn board(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<BoardColumn>>> {
    Ok(Json(state.board.grouped(query.project_id)))
}

/// POST /api/missions - persist a mission at its sequence's initial stage
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateMissionRequest>,
) -> ApiResult<Json<Mission>> {
    if req.title.trim().is_empty() {
        return Err(Error::InvalidInput("mission title is empty".to_string()).into());
    }

    let fields = NewMission {
        title: req.title.trim().to_string(),
        description: req.description,
        sequence: req.sequence,
        assignee_id: req.assignee_id,
        priority: req.priority.unwrap_or(Priority::Medium),
        project_id: req.project_id,
    };
    let mission = state.board.create_stored(fields).await?;
    Ok(Json(mission))
}

/// POST /api/missions/:id/advance - one-step interactive advance
///
/// A terminal mission answers 200 with `advanced: false` rather than an
/// error; the control is idempotent at the end of the pipeline.
pub async fn advance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AdvanceOutcome>> {
    let id = parse_mission_id(&id)?;
    let outcome = state
        .board
        .request_advance(&id, AdvanceSource::Interactive)
        .await?;
    Ok(Json(outcome))
}

/// PUT /api/missions/:id/status - authoritative external status report
///
/// The reported stage may be a non-adjacent jump within the mission's own
/// sequence; stages outside it are rejected with 400.
pub async fn report_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReportStatusRequest>,
) -> ApiResult<Json<Mission>> {
    let id = parse_mission_id(&id)?;
    let status = MissionStatus::from_str(&req.status)?;
    let mission = state.board.apply_remote_status(&id, status).await?;
    Ok(Json(mission))
}

/// GET /api/autopilot
pub async fn autopilot_state(State(state): State<AppState>) -> Json<AutoPilotStateResponse> {
    Json(AutoPilotStateResponse {
        enabled: state.autopilot.is_enabled(),
    })
}

/// POST /api/autopilot - toggle the simulator
pub async fn autopilot_toggle(
    State(state): State<AppState>,
    Json(req): Json<AutoPilotToggleRequest>,
) -> Json<AutoPilotStateResponse> {
    state.autopilot.set_enabled(req.enabled);
    Json(AutoPilotStateResponse {
        enabled: state.autopilot.is_enabled(),
    })
}
