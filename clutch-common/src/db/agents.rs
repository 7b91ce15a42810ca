//! Agent queries

use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::AgentRow;
use crate::Result;

/// List all agents, stable order
pub async fn list_agents(pool: &SqlitePool) -> Result<Vec<AgentRow>> {
    let rows = sqlx::query_as::<_, AgentRow>("SELECT * FROM agents ORDER BY created_at ASC")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Refresh an agent's last_active timestamp
pub async fn touch_agent(pool: &SqlitePool, agent_id: &str) -> Result<()> {
    sqlx::query("UPDATE agents SET last_active = ?1 WHERE id = ?2")
        .bind(Utc::now())
        .bind(agent_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    #[tokio::test]
    async fn seeded_agents_are_listed_in_creation_order() {
        let pool = init_memory_database().await.unwrap();
        let agents = list_agents(&pool).await.unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].name, "Genie");
        assert_eq!(agents[0].tier, "lead");
        assert_eq!(agents[1].name, "Scraper Bot");
        assert_eq!(agents[1].parent_id.as_deref(), Some(agents[0].id.as_str()));
    }
}
