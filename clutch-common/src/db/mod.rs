//! Database access layer
//!
//! Schema initialization, row models and queries for the dashboard's SQLite
//! store. Ids are stored as TEXT uuids, timestamps as RFC3339 TEXT.

pub mod activity;
pub mod agents;
pub mod init;
pub mod logs;
pub mod missions;
pub mod models;
pub mod tasks;
pub mod usage;

pub use init::{init_database, init_memory_database};
pub use missions::{MissionStore, NewMission, SqliteMissionStore};
