//! Pipeline stages, sequence kinds and mission priority

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// One named position in a mission's ordered pipeline
///
/// The union of both sequence variants. Which stages a given mission can
/// actually occupy is decided by its [`SequenceKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Planning,
    Inbox,
    Assigned,
    InProgress,
    Testing,
    Review,
    Done,
}

impl MissionStatus {
    /// Whether this stage is the terminal stage (no further advance)
    pub fn is_terminal(&self) -> bool {
        matches!(self, MissionStatus::Done)
    }

    /// Stable wire name (snake_case, matches serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Planning => "planning",
            MissionStatus::Inbox => "inbox",
            MissionStatus::Assigned => "assigned",
            MissionStatus::InProgress => "in_progress",
            MissionStatus::Testing => "testing",
            MissionStatus::Review => "review",
            MissionStatus::Done => "done",
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MissionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "planning" => Ok(MissionStatus::Planning),
            "inbox" => Ok(MissionStatus::Inbox),
            "assigned" => Ok(MissionStatus::Assigned),
            "in_progress" => Ok(MissionStatus::InProgress),
            "testing" => Ok(MissionStatus::Testing),
            "review" => Ok(MissionStatus::Review),
            "done" => Ok(MissionStatus::Done),
            other => Err(Error::InvalidInput(format!(
                "unknown mission status: {}",
                other
            ))),
        }
    }
}

/// Which ordered stage list a mission progresses through
///
/// Fixed at creation time. Transition logic dispatches on this kind, the two
/// sequences are never mixed for one mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    /// inbox → assigned → in_progress → review → done
    #[default]
    Standard,
    /// planning → inbox → assigned → in_progress → testing → review → done
    Extended,
}

impl SequenceKind {
    /// The full ordered stage list for this sequence kind
    pub fn stages(&self) -> &'static [MissionStatus] {
        use MissionStatus::*;
        match self {
            SequenceKind::Standard => &[Inbox, Assigned, InProgress, Review, Done],
            SequenceKind::Extended => {
                &[Planning, Inbox, Assigned, InProgress, Testing, Review, Done]
            }
        }
    }

    /// First stage of the sequence (where new missions start)
    pub fn initial(&self) -> MissionStatus {
        self.stages()[0]
    }

    /// Position of a stage within this sequence, if it belongs to it
    pub fn position(&self, status: MissionStatus) -> Option<usize> {
        self.stages().iter().position(|s| *s == status)
    }

    /// Whether a stage belongs to this sequence
    pub fn contains(&self, status: MissionStatus) -> bool {
        self.position(status).is_some()
    }

    /// The stage immediately after `status`, or None at the end of the
    /// sequence (or if `status` is not part of it)
    pub fn next_after(&self, status: MissionStatus) -> Option<MissionStatus> {
        let stages = self.stages();
        let idx = self.position(status)?;
        stages.get(idx + 1).copied()
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceKind::Standard => write!(f, "standard"),
            SequenceKind::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for SequenceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(SequenceKind::Standard),
            "extended" => Ok(SequenceKind::Extended),
            other => Err(Error::InvalidInput(format!(
                "unknown sequence kind: {}",
                other
            ))),
        }
    }
}

/// Mission priority, ordered most urgent first
///
/// Unrelated to transition legality; used for tie-break ordering when a view
/// or selector ranks missions within one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(Error::InvalidInput(format!("unknown priority: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_sequence_order() {
        let stages = SequenceKind::Standard.stages();
        assert_eq!(stages.first(), Some(&MissionStatus::Inbox));
        assert_eq!(stages.last(), Some(&MissionStatus::Done));
        assert_eq!(stages.len(), 5);
        assert!(!SequenceKind::Standard.contains(MissionStatus::Planning));
        assert!(!SequenceKind::Standard.contains(MissionStatus::Testing));
    }

    #[test]
    fn extended_sequence_order() {
        let stages = SequenceKind::Extended.stages();
        assert_eq!(stages.first(), Some(&MissionStatus::Planning));
        assert_eq!(stages.last(), Some(&MissionStatus::Done));
        assert_eq!(stages.len(), 7);
        assert_eq!(
            SequenceKind::Extended.next_after(MissionStatus::InProgress),
            Some(MissionStatus::Testing)
        );
    }

    #[test]
    fn next_after_terminal_is_none() {
        assert_eq!(SequenceKind::Standard.next_after(MissionStatus::Done), None);
        assert_eq!(SequenceKind::Extended.next_after(MissionStatus::Done), None);
    }

    #[test]
    fn next_after_foreign_stage_is_none() {
        // Testing is not part of the standard sequence
        assert_eq!(
            SequenceKind::Standard.next_after(MissionStatus::Testing),
            None
        );
    }

    #[test]
    fn status_round_trips_through_wire_name() {
        for kind in [SequenceKind::Standard, SequenceKind::Extended] {
            for status in kind.stages() {
                let parsed: MissionStatus = status.as_str().parse().unwrap();
                assert_eq!(parsed, *status);
            }
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert!("deployed".parse::<MissionStatus>().is_err());
        assert!("".parse::<MissionStatus>().is_err());
    }

    #[test]
    fn priority_orders_most_urgent_first() {
        assert!(Priority::Critical < Priority::High);
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
    }
}
