//! Token usage aggregation for the budget/analytics summary

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::db::models::UsageSummary;
use crate::Result;

/// Aggregate token spend over the trailing 24 hours
///
/// Monthly cost is the dashboard's rough projection (daily x 30), matching
/// what the summary panel displays.
pub async fn usage_summary(pool: &SqlitePool) -> Result<UsageSummary> {
    let cutoff = Utc::now() - Duration::hours(24);

    let (total_tokens, daily_cost): (i64, f64) = sqlx::query_as(
        "SELECT COALESCE(SUM(tokens_in + tokens_out), 0),
                COALESCE(SUM(cost_usd), 0.0)
         FROM token_usage WHERE created_at > ?1",
    )
    .bind(cutoff)
    .fetch_one(pool)
    .await?;

    Ok(UsageSummary {
        daily_cost,
        monthly_cost: daily_cost * 30.0,
        total_tokens,
    })
}

/// Record one usage sample for an agent
pub async fn record_usage(
    pool: &SqlitePool,
    agent_id: Option<&str>,
    tokens_in: i64,
    tokens_out: i64,
    cost_usd: f64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO token_usage (id, agent_id, tokens_in, tokens_out, cost_usd, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(agent_id)
    .bind(tokens_in)
    .bind(tokens_out)
    .bind(cost_usd)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}
