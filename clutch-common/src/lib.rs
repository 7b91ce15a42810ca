//! # Clutch Common Library
//!
//! Shared code for the Clutch fleet dashboard services including:
//! - Mission pipeline domain model (states, sequences, transitions)
//! - Event types (ClutchEvent enum) and EventBus
//! - Database schema, models and queries
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod missions;

pub use error::{Error, Result};
pub use missions::{Mission, MissionId, MissionStatus, Priority, SequenceKind};
