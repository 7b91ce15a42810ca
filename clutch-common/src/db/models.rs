//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::missions::{Mission, MissionId};
use crate::{Error, Result};

/// Agent worker record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AgentRow {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub tier: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

/// Task record (flat work item outside the mission pipeline)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskRow {
    pub id: String,
    pub agent_id: Option<String>,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Activity/audit feed entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityRow {
    pub id: String,
    pub kind: String,
    pub agent_id: Option<String>,
    pub project_id: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Diagnostic log entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LogRow {
    pub id: String,
    pub agent_id: Option<String>,
    pub level: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregated token spend for the dashboard summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSummary {
    pub daily_cost: f64,
    pub monthly_cost: f64,
    pub total_tokens: i64,
}

/// Mission as stored in the missions table
///
/// Only store-confirmed missions ever appear here; local-only missions live
/// purely in the board projection.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MissionRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub sequence: String,
    pub assignee_id: Option<String>,
    pub priority: String,
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MissionRow {
    /// Convert a stored row into the domain mission
    pub fn into_mission(self) -> Result<Mission> {
        let uuid = Uuid::parse_str(&self.id)
            .map_err(|_| Error::Internal(format!("corrupt mission id in store: {}", self.id)))?;
        Ok(Mission {
            id: MissionId::Stored(uuid),
            title: self.title,
            description: self.description,
            status: self.status.parse()?,
            sequence: self.sequence.parse()?,
            assignee_id: parse_optional_uuid(self.assignee_id.as_deref())?,
            priority: self.priority.parse()?,
            project_id: parse_optional_uuid(self.project_id.as_deref())?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_optional_uuid(raw: Option<&str>) -> Result<Option<Uuid>> {
    match raw {
        None => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|_| Error::Internal(format!("corrupt uuid reference in store: {}", s))),
    }
}
