//! Mission entity store
//!
//! The narrow CRUD contract the pipeline core depends on. The store is the
//! single source of truth for stored missions; the board projection is a
//! provisional copy reconciled against `list_missions`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::MissionRow;
use crate::missions::{Mission, MissionId, MissionStatus, Priority, SequenceKind};
use crate::{Error, Result};

/// Fields for creating a stored mission
#[derive(Debug, Clone)]
pub struct NewMission {
    pub title: String,
    pub description: String,
    pub sequence: SequenceKind,
    pub assignee_id: Option<Uuid>,
    pub priority: Priority,
    pub project_id: Option<Uuid>,
}

impl NewMission {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            sequence: SequenceKind::Standard,
            assignee_id: None,
            priority: Priority::Medium,
            project_id: None,
        }
    }
}

/// Durable mission persistence contract
///
/// `update_status` is the only mutation the pipeline core issues; creation
/// happens when a mission enters the system, deletion is out of scope.
#[async_trait]
pub trait MissionStore: Send + Sync {
    /// Full or project-scoped fetch, used by reconciliation
    async fn list_missions(&self, project_id: Option<Uuid>) -> Result<Vec<Mission>>;

    /// Persist a new mission at its sequence's initial stage
    async fn create_mission(&self, fields: NewMission) -> Result<Mission>;

    /// Fetch one mission by store id
    async fn get_mission(&self, id: Uuid) -> Result<Option<Mission>>;

    /// Record a mission's new status, refreshing updated_at
    async fn update_mission_status(&self, id: Uuid, status: MissionStatus) -> Result<()>;
}

/// SQLite-backed mission store
#[derive(Clone)]
pub struct SqliteMissionStore {
    pool: SqlitePool,
}

impl SqliteMissionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MissionStore for SqliteMissionStore {
    async fn list_missions(&self, project_id: Option<Uuid>) -> Result<Vec<Mission>> {
        let rows: Vec<MissionRow> = match project_id {
            Some(project) => {
                sqlx::query_as(
                    "SELECT * FROM missions WHERE project_id = ?1 ORDER BY created_at ASC",
                )
                .bind(project.to_string())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM missions ORDER BY created_at ASC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.into_iter().map(MissionRow::into_mission).collect()
    }

    async fn create_mission(&self, fields: NewMission) -> Result<Mission> {
        let now = Utc::now();
        let mission = Mission {
            id: MissionId::new_stored(),
            title: fields.title,
            description: fields.description,
            status: fields.sequence.initial(),
            sequence: fields.sequence,
            assignee_id: fields.assignee_id,
            priority: fields.priority,
            project_id: fields.project_id,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO missions
                 (id, title, description, status, sequence, assignee_id, priority,
                  project_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(mission.id.to_string())
        .bind(&mission.title)
        .bind(&mission.description)
        .bind(mission.status.as_str())
        .bind(mission.sequence.to_string())
        .bind(mission.assignee_id.map(|id| id.to_string()))
        .bind(mission.priority.as_str())
        .bind(mission.project_id.map(|id| id.to_string()))
        .bind(mission.created_at)
        .bind(mission.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(mission)
    }

    async fn get_mission(&self, id: Uuid) -> Result<Option<Mission>> {
        let row: Option<MissionRow> = sqlx::query_as("SELECT * FROM missions WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(MissionRow::into_mission).transpose()
    }

    async fn update_mission_status(&self, id: Uuid, status: MissionStatus) -> Result<()> {
        let result = sqlx::query(
            "UPDATE missions SET status = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("mission {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    async fn store() -> SqliteMissionStore {
        let pool = init_memory_database().await.unwrap();
        SqliteMissionStore::new(pool)
    }

    #[tokio::test]
    async fn create_then_list_round_trip() {
        let store = store().await;
        let mut fields = NewMission::new("Audit login flow");
        fields.priority = Priority::High;
        fields.sequence = SequenceKind::Extended;

        let created = store.create_mission(fields).await.unwrap();
        assert_eq!(created.status, MissionStatus::Planning);
        assert!(created.id.is_stored());

        let listed = store.list_missions(None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].title, "Audit login flow");
        assert_eq!(listed[0].priority, Priority::High);
        assert_eq!(listed[0].sequence, SequenceKind::Extended);
    }

    #[tokio::test]
    async fn project_scope_filters_listing() {
        let store = store().await;
        let project = Uuid::new_v4();

        let mut scoped = NewMission::new("scoped");
        scoped.project_id = Some(project);
        store.create_mission(scoped).await.unwrap();
        store.create_mission(NewMission::new("unscoped")).await.unwrap();

        assert_eq!(store.list_missions(None).await.unwrap().len(), 2);
        let filtered = store.list_missions(Some(project)).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "scoped");
    }

    #[tokio::test]
    async fn update_status_refreshes_updated_at() {
        let store = store().await;
        let created = store.create_mission(NewMission::new("m")).await.unwrap();
        let id = created.id.stored_uuid().unwrap();

        store
            .update_mission_status(id, MissionStatus::Assigned)
            .await
            .unwrap();

        let fetched = store.get_mission(id).await.unwrap().unwrap();
        assert_eq!(fetched.status, MissionStatus::Assigned);
        assert!(fetched.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_status_for_unknown_id_is_not_found() {
        let store = store().await;
        let err = store
            .update_mission_status(Uuid::new_v4(), MissionStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
