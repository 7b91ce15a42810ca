//! Mission pipeline domain model
//!
//! A mission is a trackable unit of work progressing through a fixed ordered
//! pipeline of stages. Two sequence variants coexist (standard and extended);
//! each mission carries its kind from creation and never switches.
//!
//! All status mutation goes through [`Mission::advance`] (one step forward,
//! interactive and auto-pilot triggers share this single entry point) or
//! [`Mission::set_status`] (authoritative external jump, push-event path
//! only).

mod status;

pub use status::{MissionStatus, Priority, SequenceKind};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{Error, Result};

/// Mission identifier, split across two identifier spaces
///
/// `Stored` ids are assigned by the entity store and support server-side
/// status mutation. `Local` ids are synthesized client-side for missions
/// that were never persisted; those participate fully in the pipeline and
/// display but are excluded from store writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MissionId {
    /// Store-assigned, persisted id
    Stored(Uuid),
    /// Client-synthesized id, never persisted
    Local(Uuid),
}

impl MissionId {
    /// Synthesize a fresh local-only id
    pub fn new_local() -> Self {
        MissionId::Local(Uuid::new_v4())
    }

    /// Mint a fresh store-assigned id
    pub fn new_stored() -> Self {
        MissionId::Stored(Uuid::new_v4())
    }

    /// Whether this id refers to a store-confirmed mission
    pub fn is_stored(&self) -> bool {
        matches!(self, MissionId::Stored(_))
    }

    /// The underlying store uuid, if this is a stored id
    pub fn stored_uuid(&self) -> Option<Uuid> {
        match self {
            MissionId::Stored(uuid) => Some(*uuid),
            MissionId::Local(_) => None,
        }
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionId::Stored(uuid) => write!(f, "{}", uuid),
            MissionId::Local(uuid) => write!(f, "local-{}", uuid),
        }
    }
}

impl FromStr for MissionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (local, raw) = match s.strip_prefix("local-") {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let uuid = Uuid::parse_str(raw)
            .map_err(|_| Error::InvalidInput(format!("invalid mission id: {}", s)))?;
        Ok(if local {
            MissionId::Local(uuid)
        } else {
            MissionId::Stored(uuid)
        })
    }
}

impl From<MissionId> for String {
    fn from(id: MissionId) -> String {
        id.to_string()
    }
}

impl TryFrom<String> for MissionId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// A unit of work moving through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub title: String,
    pub description: String,
    pub status: MissionStatus,
    pub sequence: SequenceKind,
    pub assignee_id: Option<Uuid>,
    pub priority: Priority,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mission {
    /// Create a mission at its sequence's initial stage
    pub fn new(id: MissionId, title: impl Into<String>, sequence: SequenceKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: String::new(),
            status: sequence.initial(),
            sequence,
            assignee_id: None,
            priority: Priority::Medium,
            project_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether an advance control should be surfaced for this mission
    pub fn can_advance(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Move one step forward in this mission's sequence
    ///
    /// Returns the new status when a move happened. At the terminal stage
    /// this is an idempotent no-op (None), not an error; callers must
    /// tolerate it since concurrent triggers may race to the last stage.
    pub fn advance(&mut self) -> Option<MissionStatus> {
        let next = self.sequence.next_after(self.status)?;
        self.status = next;
        self.updated_at = Utc::now();
        Some(next)
    }

    /// Jump directly to `target`, which need not be the immediate successor
    ///
    /// Reserved for status reported by an authoritative external source
    /// (push events); the interactive advance control never takes this
    /// path. Targets outside this mission's sequence are rejected.
    pub fn set_status(&mut self, target: MissionStatus) -> Result<()> {
        if !self.sequence.contains(target) {
            return Err(Error::InvalidInput(format!(
                "status {} is not part of the {} sequence",
                target, self.sequence
            )));
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mission(sequence: SequenceKind) -> Mission {
        Mission::new(MissionId::new_stored(), "test mission", sequence)
    }

    #[test]
    fn standard_mission_advances_in_order_then_stops() {
        let mut m1 = mission(SequenceKind::Standard);
        assert_eq!(m1.status, MissionStatus::Inbox);

        let visited: Vec<_> = (0..4).filter_map(|_| m1.advance()).collect();
        assert_eq!(
            visited,
            vec![
                MissionStatus::Assigned,
                MissionStatus::InProgress,
                MissionStatus::Review,
                MissionStatus::Done,
            ]
        );

        // Fifth call is an idempotent no-op at the terminal stage
        let before = m1.updated_at;
        assert_eq!(m1.advance(), None);
        assert_eq!(m1.status, MissionStatus::Done);
        assert_eq!(m1.updated_at, before);
    }

    #[test]
    fn advance_never_skips_a_stage() {
        let mut m = mission(SequenceKind::Extended);
        let stages = SequenceKind::Extended.stages();
        for expected in &stages[1..] {
            assert_eq!(m.advance(), Some(*expected));
        }
        assert_eq!(m.advance(), None);
    }

    #[test]
    fn advance_refreshes_updated_at() {
        let mut m = mission(SequenceKind::Standard);
        let created = m.created_at;
        m.advance();
        assert!(m.updated_at >= created);
    }

    #[test]
    fn set_status_accepts_non_adjacent_jump() {
        let mut m2 = mission(SequenceKind::Extended);
        assert_eq!(m2.status, MissionStatus::Planning);
        let before = m2.updated_at;

        // A push event may report a stage several steps ahead
        m2.set_status(MissionStatus::Testing).unwrap();
        assert_eq!(m2.status, MissionStatus::Testing);
        assert!(m2.updated_at >= before);
    }

    #[test]
    fn set_status_rejects_stage_outside_sequence() {
        let mut m = mission(SequenceKind::Standard);
        let err = m.set_status(MissionStatus::Testing).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        // Mission untouched by the rejected jump
        assert_eq!(m.status, MissionStatus::Inbox);
    }

    #[test]
    fn can_advance_tracks_terminal_stage() {
        let mut m = mission(SequenceKind::Standard);
        while m.advance().is_some() {
            // draining the pipeline
        }
        assert!(!m.can_advance());
        assert_eq!(m.status, MissionStatus::Done);
    }

    #[test]
    fn mission_id_string_round_trip() {
        let stored = MissionId::new_stored();
        let local = MissionId::new_local();
        assert_eq!(stored.to_string().parse::<MissionId>().unwrap(), stored);
        assert_eq!(local.to_string().parse::<MissionId>().unwrap(), local);
        assert!(local.to_string().starts_with("local-"));
        assert!(!local.is_stored());
        assert!(stored.is_stored());
    }

    #[test]
    fn mission_id_serde_uses_string_form() {
        let local = MissionId::new_local();
        let json = serde_json::to_string(&local).unwrap();
        assert!(json.contains("local-"));
        let back: MissionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, local);
    }
}
