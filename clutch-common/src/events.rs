//! Event types for the Clutch event system
//!
//! Provides the shared event definitions and EventBus used by the dashboard
//! service. Events are broadcast in-process via the EventBus and serialized
//! as-is for SSE transmission to connected web clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::db::models::{ActivityRow, TaskRow};
use crate::missions::{Mission, MissionId, MissionStatus};

/// Which trigger requested a mission transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceSource {
    /// Explicit user action (the advance control)
    Interactive,
    /// The autonomous timer-driven simulator
    AutoPilot,
}

impl AdvanceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvanceSource::Interactive => "interactive",
            AdvanceSource::AutoPilot => "auto_pilot",
        }
    }
}

/// Clutch event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
/// All domain events use this central enum for type safety and exhaustive
/// matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClutchEvent {
    /// A mission was created and persisted
    ///
    /// Triggers:
    /// - SSE: insert card into the kanban board
    MissionCreated {
        /// Full mission record as stored
        mission: Mission,
        /// When the mission was created
        timestamp: DateTime<Utc>,
    },

    /// A mission moved one stage forward through its pipeline
    ///
    /// Emitted for interactive and auto-pilot advances alike; both share the
    /// same transition entry point.
    MissionAdvanced {
        /// Mission that moved
        mission_id: MissionId,
        /// Stage before the transition
        from: MissionStatus,
        /// Stage after the transition
        to: MissionStatus,
        /// Which trigger requested the transition
        source: AdvanceSource,
        /// When the transition was applied
        timestamp: DateTime<Utc>,
    },

    /// An external source reported a mission's observed status
    ///
    /// The reported stage is authoritative and may be a non-adjacent jump.
    MissionStatusReported {
        /// Mission the report refers to
        mission_id: MissionId,
        /// Reported stage
        status: MissionStatus,
        /// When the report was applied
        timestamp: DateTime<Utc>,
    },

    /// A task was created
    TaskCreated {
        /// Task record as stored
        task: TaskRow,
        /// When the task was created
        timestamp: DateTime<Utc>,
    },

    /// A task's status changed
    TaskUpdated {
        /// Task record after the update
        task: TaskRow,
        /// When the task was updated
        timestamp: DateTime<Utc>,
    },

    /// An activity/audit entry was recorded
    ///
    /// Triggers:
    /// - SSE: prepend to the activity feed
    ActivityRecorded {
        /// Activity entry as stored
        activity: ActivityRow,
        /// When the entry was recorded
        timestamp: DateTime<Utc>,
    },

    /// The auto-pilot simulator was toggled on or off
    AutoPilotToggled {
        /// New auto-pilot state
        enabled: bool,
        /// When the toggle happened
        timestamp: DateTime<Utc>,
    },
}

impl ClutchEvent {
    /// Get event type as string for SSE event naming and filtering
    pub fn event_type(&self) -> &str {
        match self {
            ClutchEvent::MissionCreated { .. } => "MissionCreated",
            ClutchEvent::MissionAdvanced { .. } => "MissionAdvanced",
            ClutchEvent::MissionStatusReported { .. } => "MissionStatusReported",
            ClutchEvent::TaskCreated { .. } => "TaskCreated",
            ClutchEvent::TaskUpdated { .. } => "TaskUpdated",
            ClutchEvent::ActivityRecorded { .. } => "ActivityRecorded",
            ClutchEvent::AutoPilotToggled { .. } => "AutoPilotToggled",
        }
    }
}

/// Central event distribution bus for application-wide events
///
/// Wraps tokio::broadcast, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClutchEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    ///
    /// Events beyond the capacity displace the oldest buffered events for
    /// lagging subscribers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ClutchEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ClutchEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<ClutchEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// For non-critical events where it's acceptable if no component is
    /// currently listening (e.g. SSE updates with no connected clients).
    pub fn emit_lossy(&self, event: ClutchEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
