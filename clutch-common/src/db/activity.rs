//! Activity feed queries
//!
//! Every successful mission transition appends one entry here, interactive
//! or automatic; the feed is the audit trail the dashboard renders.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::ActivityRow;
use crate::Result;

/// Append an activity entry
pub async fn record_activity(
    pool: &SqlitePool,
    kind: &str,
    agent_id: Option<&str>,
    project_id: Option<&str>,
    message: &str,
) -> Result<ActivityRow> {
    let row = ActivityRow {
        id: Uuid::new_v4().to_string(),
        kind: kind.to_string(),
        agent_id: agent_id.map(str::to_string),
        project_id: project_id.map(str::to_string),
        message: message.to_string(),
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO activity (id, kind, agent_id, project_id, message, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(&row.id)
    .bind(&row.kind)
    .bind(&row.agent_id)
    .bind(&row.project_id)
    .bind(&row.message)
    .bind(row.created_at)
    .execute(pool)
    .await?;

    Ok(row)
}

/// Most recent activity entries, newest first
pub async fn recent_activity(pool: &SqlitePool, limit: i64) -> Result<Vec<ActivityRow>> {
    let rows = sqlx::query_as::<_, ActivityRow>(
        "SELECT * FROM activity ORDER BY created_at DESC LIMIT ?1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    #[tokio::test]
    async fn recorded_entries_come_back_newest_first() {
        let pool = init_memory_database().await.unwrap();

        record_activity(&pool, "status_change", None, None, "first").await.unwrap();
        record_activity(&pool, "status_change", None, None, "second").await.unwrap();

        let feed = recent_activity(&pool, 10).await.unwrap();
        assert_eq!(feed.len(), 2);
        assert!(feed[0].created_at >= feed[1].created_at);
    }
}
