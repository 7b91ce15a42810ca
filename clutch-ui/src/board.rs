//! In-memory mission board projection
//!
//! The presentation layer reads this mirror of mission state instead of
//! querying the store on every render. Mutations are applied optimistically
//! (projection first, persistence write after), push-style status reports
//! land here via [`MissionBoard::apply_remote_status`], and the periodic
//! reconciliation refetch replaces every stored entry with the store's
//! state. The store always wins on conflict; the projection is never a
//! second source of truth.
//!
//! All map mutations happen under one short lock acquisition, never across
//! an await point, so concurrent handlers observe whole mission records.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use clutch_common::db::activity::record_activity;
use clutch_common::db::{MissionStore, NewMission};
use clutch_common::events::{AdvanceSource, ClutchEvent, EventBus};
use clutch_common::{Error, Mission, MissionId, MissionStatus, Result};

/// Kanban column order: the union of both sequence stage lists
pub const BOARD_COLUMNS: &[MissionStatus] = &[
    MissionStatus::Planning,
    MissionStatus::Inbox,
    MissionStatus::Assigned,
    MissionStatus::InProgress,
    MissionStatus::Testing,
    MissionStatus::Review,
    MissionStatus::Done,
];

/// Result of an advance request
#[derive(Debug, Clone, Serialize)]
pub struct AdvanceOutcome {
    /// Whether a transition actually happened (false at the terminal stage)
    pub advanced: bool,
    /// Stage before the request
    pub from: MissionStatus,
    /// Mission after the request
    pub mission: Mission,
}

/// One kanban column for rendering
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: MissionStatus,
    pub missions: Vec<Mission>,
}

/// The mission projection shared by all HTTP handlers and the auto-pilot
pub struct MissionBoard {
    missions: Mutex<HashMap<MissionId, Mission>>,
    store: Arc<dyn MissionStore>,
    pool: SqlitePool,
    bus: EventBus,
}

impl MissionBoard {
    pub fn new(store: Arc<dyn MissionStore>, pool: SqlitePool, bus: EventBus) -> Self {
        Self {
            missions: Mutex::new(HashMap::new()),
            store,
            pool,
            bus,
        }
    }

    /// Insert a mission into the projection directly (seeds, tests)
    pub fn insert(&self, mission: Mission) {
        self.missions.lock().unwrap().insert(mission.id, mission);
    }

    /// Copy of one mission, if present
    pub fn get(&self, id: &MissionId) -> Option<Mission> {
        self.missions.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.missions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a stored mission: persist first (the store assigns authority),
    /// then mirror it into the projection
    pub async fn create_stored(&self, fields: NewMission) -> Result<Mission> {
        let mission = self.store.create_mission(fields).await?;
        self.insert(mission.clone());

        self.bus.emit_lossy(ClutchEvent::MissionCreated {
            mission: mission.clone(),
            timestamp: Utc::now(),
        });
        self.record_audit(
            &mission,
            "mission_created",
            format!("Mission \"{}\" created in {}", mission.title, mission.status),
        )
        .await;

        Ok(mission)
    }

    /// The sole transition entry point for interactive and auto-pilot
    /// triggers
    ///
    /// Applies the one-step advance to the projection immediately, then
    /// issues the persistence write (stored missions only). A failed write
    /// is logged and left for the next reconciliation cycle to heal; the
    /// optimistic change is not rolled back. A terminal mission yields
    /// `advanced: false` with no audit record.
    pub async fn request_advance(
        &self,
        id: &MissionId,
        source: AdvanceSource,
    ) -> Result<AdvanceOutcome> {
        let (outcome, new_status) = {
            let mut map = self.missions.lock().unwrap();
            let mission = map
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(format!("mission {}", id)))?;

            let from = mission.status;
            let new_status = mission.advance();
            (
                AdvanceOutcome {
                    advanced: new_status.is_some(),
                    from,
                    mission: mission.clone(),
                },
                new_status,
            )
        };

        let Some(to) = new_status else {
            debug!("advance on terminal mission {} is a no-op", id);
            return Ok(outcome);
        };

        self.bus.emit_lossy(ClutchEvent::MissionAdvanced {
            mission_id: *id,
            from: outcome.from,
            to,
            source,
            timestamp: Utc::now(),
        });

        if let Some(uuid) = id.stored_uuid() {
            if let Err(e) = self.store.update_mission_status(uuid, to).await {
                warn!(
                    "status write for mission {} failed, next reconcile will heal it: {}",
                    id, e
                );
            }
        }

        self.record_audit(
            &outcome.mission,
            "status_change",
            format!(
                "Mission \"{}\" moved to {}",
                outcome.mission.title,
                to.as_str().replace('_', " ")
            ),
        )
        .await;

        Ok(outcome)
    }

    /// Apply a status reported by an authoritative external source
    ///
    /// The report is its own confirmation, so no optimistic/confirm dance:
    /// the projection takes the jump directly and stored missions get the
    /// matching persistence write. Unknown mission ids and stages outside
    /// the mission's sequence are rejected so callers can drop them.
    pub async fn apply_remote_status(
        &self,
        id: &MissionId,
        status: MissionStatus,
    ) -> Result<Mission> {
        let mission = {
            let mut map = self.missions.lock().unwrap();
            let mission = map
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(format!("mission {}", id)))?;
            mission.set_status(status)?;
            mission.clone()
        };

        self.bus.emit_lossy(ClutchEvent::MissionStatusReported {
            mission_id: *id,
            status,
            timestamp: Utc::now(),
        });

        if let Some(uuid) = id.stored_uuid() {
            if let Err(e) = self.store.update_mission_status(uuid, status).await {
                warn!(
                    "status write for mission {} failed, next reconcile will heal it: {}",
                    id, e
                );
            }
        }

        self.record_audit(
            &mission,
            "status_change",
            format!(
                "Mission \"{}\" reported at {}",
                mission.title,
                status.as_str().replace('_', " ")
            ),
        )
        .await;

        Ok(mission)
    }

    /// Replace the stored half of the projection with the store's state
    ///
    /// Stored entries absent from the fetch are dropped, fetched entries
    /// overwrite any divergent copy, local-only missions are retained
    /// untouched. Returns the resulting projection size.
    pub fn reconcile(&self, fetched: Vec<Mission>) -> usize {
        let mut map = self.missions.lock().unwrap();
        map.retain(|id, _| !id.is_stored());
        for mission in fetched {
            map.insert(mission.id, mission);
        }
        map.len()
    }

    /// Flat snapshot, optionally project-scoped, newest first
    pub fn snapshot(&self, project_id: Option<Uuid>) -> Vec<Mission> {
        let map = self.missions.lock().unwrap();
        let mut missions: Vec<Mission> = map
            .values()
            .filter(|m| project_id.is_none() || m.project_id == project_id)
            .cloned()
            .collect();
        missions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        missions
    }

    /// Kanban view: one column per stage in board order, cards sorted by
    /// priority then age
    pub fn grouped(&self, project_id: Option<Uuid>) -> Vec<BoardColumn> {
        let missions = self.snapshot(project_id);
        BOARD_COLUMNS
            .iter()
            .map(|status| {
                let mut column: Vec<Mission> = missions
                    .iter()
                    .filter(|m| m.status == *status)
                    .cloned()
                    .collect();
                column.sort_by(|a, b| {
                    a.priority
                        .cmp(&b.priority)
                        .then(a.created_at.cmp(&b.created_at))
                });
                BoardColumn {
                    status: *status,
                    missions: column,
                }
            })
            .collect()
    }

    /// Seed a handful of local-only demo missions on an empty board
    ///
    /// These never touch the store; they exercise the pipeline purely in
    /// the projection, like the original dashboard's canned board.
    pub fn seed_demo_missions(&self) {
        use clutch_common::{Priority, SequenceKind};

        if !self.is_empty() {
            return;
        }

        let seeds: [(&str, SequenceKind, Priority); 4] = [
            ("Map competitor pricing pages", SequenceKind::Standard, Priority::High),
            ("Summarize overnight scrape results", SequenceKind::Standard, Priority::Medium),
            ("Draft outreach sequence v2", SequenceKind::Extended, Priority::Critical),
            ("Retire stale data sources", SequenceKind::Standard, Priority::Low),
        ];

        for (title, sequence, priority) in seeds {
            let mut mission = Mission::new(MissionId::new_local(), title, sequence);
            mission.priority = priority;
            self.insert(mission);
        }
        debug!("seeded {} local demo missions", self.len());
    }

    /// Append the transition audit record and broadcast it; failures are
    /// diagnostic-only
    async fn record_audit(&self, mission: &Mission, kind: &str, message: String) {
        let agent = mission.assignee_id.map(|id| id.to_string());
        let project = mission.project_id.map(|id| id.to_string());
        match record_activity(
            &self.pool,
            kind,
            agent.as_deref(),
            project.as_deref(),
            &message,
        )
        .await
        {
            Ok(row) => self.bus.emit_lossy(ClutchEvent::ActivityRecorded {
                activity: row,
                timestamp: Utc::now(),
            }),
            Err(e) => warn!("failed to record activity entry: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clutch_common::db::{init_memory_database, SqliteMissionStore};
    use clutch_common::SequenceKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store double whose writes always fail, with call counting
    struct FlakyStore {
        update_calls: AtomicUsize,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                update_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MissionStore for FlakyStore {
        async fn list_missions(&self, _project_id: Option<Uuid>) -> Result<Vec<Mission>> {
            Ok(vec![])
        }

        async fn create_mission(&self, _fields: NewMission) -> Result<Mission> {
            Err(Error::Internal("store offline".to_string()))
        }

        async fn get_mission(&self, _id: Uuid) -> Result<Option<Mission>> {
            Ok(None)
        }

        async fn update_mission_status(&self, _id: Uuid, _status: MissionStatus) -> Result<()> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Internal("store offline".to_string()))
        }
    }

    async fn sqlite_board() -> (Arc<MissionBoard>, Arc<SqliteMissionStore>) {
        let pool = init_memory_database().await.unwrap();
        let store = Arc::new(SqliteMissionStore::new(pool.clone()));
        let board = Arc::new(MissionBoard::new(
            store.clone(),
            pool,
            EventBus::new(64),
        ));
        (board, store)
    }

    async fn flaky_board() -> (Arc<MissionBoard>, Arc<FlakyStore>) {
        let pool = init_memory_database().await.unwrap();
        let store = Arc::new(FlakyStore::new());
        let board = Arc::new(MissionBoard::new(
            store.clone(),
            pool,
            EventBus::new(64),
        ));
        (board, store)
    }

    #[tokio::test]
    async fn optimistic_advance_survives_failed_write() {
        let (board, store) = flaky_board().await;
        let mission = Mission::new(MissionId::new_stored(), "m", SequenceKind::Standard);
        let id = mission.id;
        board.insert(mission);

        let outcome = board
            .request_advance(&id, AdvanceSource::Interactive)
            .await
            .unwrap();

        assert!(outcome.advanced);
        assert_eq!(outcome.from, MissionStatus::Inbox);
        assert_eq!(board.get(&id).unwrap().status, MissionStatus::Assigned);
        // The write was attempted and its failure swallowed
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn local_missions_never_hit_the_store() {
        let (board, store) = flaky_board().await;
        let mission = Mission::new(MissionId::new_local(), "local", SequenceKind::Standard);
        let id = mission.id;
        board.insert(mission);

        let outcome = board
            .request_advance(&id, AdvanceSource::AutoPilot)
            .await
            .unwrap();

        assert!(outcome.advanced);
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reconcile_restores_store_state_and_keeps_locals() {
        let (board, _store) = flaky_board().await;

        // Stored mission diverged: optimistic advance, write failed
        let stored = Mission::new(MissionId::new_stored(), "stored", SequenceKind::Standard);
        let stored_id = stored.id;
        board.insert(stored.clone());
        board
            .request_advance(&stored_id, AdvanceSource::Interactive)
            .await
            .unwrap();
        assert_eq!(board.get(&stored_id).unwrap().status, MissionStatus::Assigned);

        let local = Mission::new(MissionId::new_local(), "local", SequenceKind::Standard);
        let local_id = local.id;
        board.insert(local);

        // Store still has the mission at inbox; it wins
        let size = board.reconcile(vec![stored]);
        assert_eq!(size, 2);
        assert_eq!(board.get(&stored_id).unwrap().status, MissionStatus::Inbox);
        assert!(board.get(&local_id).is_some());
    }

    #[tokio::test]
    async fn reconcile_drops_stored_entries_missing_from_fetch() {
        let (board, _store) = flaky_board().await;
        let ghost = Mission::new(MissionId::new_stored(), "ghost", SequenceKind::Standard);
        let ghost_id = ghost.id;
        board.insert(ghost);

        board.reconcile(vec![]);
        assert!(board.get(&ghost_id).is_none());
    }

    #[tokio::test]
    async fn terminal_advance_is_a_no_op_without_audit() {
        let (board, store) = sqlite_board().await;
        let mission = board
            .create_stored(NewMission::new("finish line"))
            .await
            .unwrap();
        let id = mission.id;

        for _ in 0..4 {
            assert!(board
                .request_advance(&id, AdvanceSource::Interactive)
                .await
                .unwrap()
                .advanced);
        }
        assert_eq!(board.get(&id).unwrap().status, MissionStatus::Done);

        let feed_before =
            clutch_common::db::activity::recent_activity(&store_pool(&board), 100).await;

        let outcome = board
            .request_advance(&id, AdvanceSource::AutoPilot)
            .await
            .unwrap();
        assert!(!outcome.advanced);
        assert_eq!(outcome.mission.status, MissionStatus::Done);

        let feed_after =
            clutch_common::db::activity::recent_activity(&store_pool(&board), 100).await;
        assert_eq!(
            feed_before.unwrap().len(),
            feed_after.unwrap().len(),
            "terminal no-op must not produce an audit record"
        );

        // Store agrees with the projection
        let stored = store
            .get_mission(id.stored_uuid().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, MissionStatus::Done);
    }

    #[tokio::test]
    async fn remote_status_accepts_jump_and_persists() {
        let (board, store) = sqlite_board().await;
        let mut fields = NewMission::new("extended run");
        fields.sequence = SequenceKind::Extended;
        let mission = board.create_stored(fields).await.unwrap();
        let id = mission.id;
        assert_eq!(mission.status, MissionStatus::Planning);

        let updated = board
            .apply_remote_status(&id, MissionStatus::Testing)
            .await
            .unwrap();
        assert_eq!(updated.status, MissionStatus::Testing);
        assert!(updated.updated_at >= mission.updated_at);

        let stored = store
            .get_mission(id.stored_uuid().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, MissionStatus::Testing);
    }

    #[tokio::test]
    async fn remote_status_for_unknown_mission_is_not_found() {
        let (board, _store) = flaky_board().await;
        let err = board
            .apply_remote_status(&MissionId::new_stored(), MissionStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn remote_status_outside_sequence_leaves_projection_untouched() {
        let (board, _store) = flaky_board().await;
        let mission = Mission::new(MissionId::new_stored(), "std", SequenceKind::Standard);
        let id = mission.id;
        board.insert(mission);

        let err = board
            .apply_remote_status(&id, MissionStatus::Testing)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(board.get(&id).unwrap().status, MissionStatus::Inbox);
    }

    #[tokio::test]
    async fn grouped_view_sorts_columns_by_priority() {
        let (board, _store) = flaky_board().await;

        let mut low = Mission::new(MissionId::new_local(), "low", SequenceKind::Standard);
        low.priority = clutch_common::Priority::Low;
        let mut critical = Mission::new(MissionId::new_local(), "critical", SequenceKind::Standard);
        critical.priority = clutch_common::Priority::Critical;
        board.insert(low);
        board.insert(critical);

        let columns = board.grouped(None);
        assert_eq!(columns.len(), BOARD_COLUMNS.len());
        let inbox = columns
            .iter()
            .find(|c| c.status == MissionStatus::Inbox)
            .unwrap();
        assert_eq!(inbox.missions.len(), 2);
        assert_eq!(inbox.missions[0].title, "critical");
    }

    fn store_pool(board: &MissionBoard) -> SqlitePool {
        board.pool.clone()
    }
}
