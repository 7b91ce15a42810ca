//! Clutch dashboard service entry point

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clutch_common::config::ClutchConfig;
use clutch_common::db::{init_database, MissionStore};

use clutch_ui::api::build_router;
use clutch_ui::sync::Reconciler;
use clutch_ui::AppState;

#[derive(Parser, Debug)]
#[command(name = "clutch-ui", about = "Clutch fleet dashboard service")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config and CLUTCH_DB)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("clutch-ui {} starting", env!("CARGO_PKG_VERSION"));

    let mut config = ClutchConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    let db_path = cli.db.unwrap_or_else(|| config.resolve_database_path());
    info!("opening database at {}", db_path.display());
    let pool = init_database(&db_path).await.context("initializing database")?;

    let state = AppState::new(pool, config.autopilot.clone());

    // Prime the projection from the store, then seed demo missions only if
    // the board is still empty
    let missions = state.store.list_missions(None).await?;
    state.board.reconcile(missions);
    state.board.seed_demo_missions();

    let _reconciler = Reconciler::spawn(
        state.board.clone(),
        state.store.clone() as Arc<dyn MissionStore>,
        Duration::from_secs(config.reconcile_interval_secs),
    );
    state.autopilot.start();

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
