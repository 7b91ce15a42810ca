//! Task queries
//!
//! Tasks are flat work items outside the mission pipeline; their status set
//! is validated here rather than modeled as a sequence.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::TaskRow;
use crate::{Error, Result};

/// Task statuses accepted on the PATCH surface
pub const ALLOWED_TASK_STATUSES: &[&str] = &["pending", "in_progress", "done", "failed"];

/// List most recent tasks first
pub async fn list_tasks(pool: &SqlitePool, limit: i64) -> Result<Vec<TaskRow>> {
    let rows = sqlx::query_as::<_, TaskRow>(
        "SELECT * FROM tasks ORDER BY created_at DESC LIMIT ?1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Create a pending task, optionally assigned to an agent
pub async fn create_task(
    pool: &SqlitePool,
    agent_id: Option<&str>,
    description: &str,
) -> Result<TaskRow> {
    let now = Utc::now();
    let task = TaskRow {
        id: Uuid::new_v4().to_string(),
        agent_id: agent_id.map(str::to_string),
        description: description.to_string(),
        status: "pending".to_string(),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO tasks (id, agent_id, description, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(&task.id)
    .bind(&task.agent_id)
    .bind(&task.description)
    .bind(&task.status)
    .bind(task.created_at)
    .bind(task.updated_at)
    .execute(pool)
    .await?;

    Ok(task)
}

/// Set a task's status, returning the updated row
pub async fn update_task_status(pool: &SqlitePool, id: &str, status: &str) -> Result<TaskRow> {
    if !ALLOWED_TASK_STATUSES.contains(&status) {
        return Err(Error::InvalidInput(format!("invalid task status: {}", status)));
    }

    let result = sqlx::query("UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("task {}", id)));
    }

    let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = ?1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    #[tokio::test]
    async fn create_update_list_cycle() {
        let pool = init_memory_database().await.unwrap();

        let task = create_task(&pool, None, "scrape pricing pages").await.unwrap();
        assert_eq!(task.status, "pending");

        let updated = update_task_status(&pool, &task.id, "in_progress").await.unwrap();
        assert_eq!(updated.status, "in_progress");
        assert!(updated.updated_at >= task.updated_at);

        let listed = list_tasks(&pool, 50).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, "in_progress");
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let pool = init_memory_database().await.unwrap();
        let task = create_task(&pool, None, "t").await.unwrap();
        let err = update_task_status(&pool, &task.id, "galloping").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unknown_task_is_not_found() {
        let pool = init_memory_database().await.unwrap();
        let err = update_task_status(&pool, "nope", "done").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
