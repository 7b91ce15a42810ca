//! Clutch dashboard service
//!
//! HTTP surface and runtime plumbing for the mission pipeline: the mission
//! board projection, the auto-pilot simulator, the store reconciler, and
//! the REST + SSE API the dashboard front end consumes.

pub mod api;
pub mod autopilot;
pub mod board;
pub mod sync;

use std::sync::Arc;

use sqlx::SqlitePool;

use clutch_common::db::SqliteMissionStore;
use clutch_common::events::EventBus;

use autopilot::AutoPilot;
use board::MissionBoard;

/// Shared state handed to every HTTP handler
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub store: Arc<SqliteMissionStore>,
    pub board: Arc<MissionBoard>,
    pub autopilot: Arc<AutoPilot>,
    pub bus: EventBus,
}

impl AppState {
    pub fn new(pool: SqlitePool, autopilot_config: clutch_common::config::AutoPilotConfig) -> Self {
        let bus = EventBus::new(256);
        let store = Arc::new(SqliteMissionStore::new(pool.clone()));
        let board = Arc::new(MissionBoard::new(
            store.clone(),
            pool.clone(),
            bus.clone(),
        ));
        let autopilot = Arc::new(AutoPilot::new(board.clone(), bus.clone(), autopilot_config));

        Self {
            pool,
            store,
            board,
            autopilot,
            bus,
        }
    }
}
