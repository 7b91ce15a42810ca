//! Diagnostic log queries

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::LogRow;
use crate::Result;

/// Append a log entry
pub async fn record_log(
    pool: &SqlitePool,
    agent_id: Option<&str>,
    level: &str,
    message: &str,
) -> Result<LogRow> {
    let row = LogRow {
        id: Uuid::new_v4().to_string(),
        agent_id: agent_id.map(str::to_string),
        level: level.to_string(),
        message: message.to_string(),
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO logs (id, agent_id, level, message, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&row.id)
    .bind(&row.agent_id)
    .bind(&row.level)
    .bind(&row.message)
    .bind(row.created_at)
    .execute(pool)
    .await?;

    Ok(row)
}

/// Most recent log entries, newest first
pub async fn recent_logs(pool: &SqlitePool, limit: i64) -> Result<Vec<LogRow>> {
    let rows = sqlx::query_as::<_, LogRow>(
        "SELECT * FROM logs ORDER BY created_at DESC LIMIT ?1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
