//! Auto-pilot: the autonomous advancement source
//!
//! Periodically picks one eligible (non-terminal) mission uniformly at
//! random and advances it through the same entry point the interactive
//! control uses. The tick interval is randomized within configured bounds
//! so the simulator never locks step with the reconciliation poller.
//!
//! The running loop is owned through a CancellationToken: toggling the
//! auto-pilot off cancels the pending sleep immediately, no tick can fire
//! after disablement.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use clutch_common::config::AutoPilotConfig;
use clutch_common::events::{AdvanceSource, ClutchEvent, EventBus};
use clutch_common::{Mission, MissionId};

use crate::board::MissionBoard;

/// Uniform-random choice among missions that can still advance
///
/// Pure over its inputs so tests can drive it with a seeded rng. Terminal
/// missions are never eligible; an empty eligible set yields None.
pub fn select_candidate<'a>(missions: &'a [Mission], rng: &mut impl Rng) -> Option<&'a Mission> {
    let eligible: Vec<&Mission> = missions.iter().filter(|m| m.can_advance()).collect();
    eligible.choose(rng).copied()
}

struct AutoPilotState {
    enabled: bool,
    token: Option<CancellationToken>,
}

/// The timer-driven simulator advancing missions without user input
pub struct AutoPilot {
    board: Arc<MissionBoard>,
    bus: EventBus,
    config: AutoPilotConfig,
    state: Mutex<AutoPilotState>,
}

impl AutoPilot {
    pub fn new(board: Arc<MissionBoard>, bus: EventBus, config: AutoPilotConfig) -> Self {
        Self {
            board,
            bus,
            config,
            state: Mutex::new(AutoPilotState {
                enabled: false,
                token: None,
            }),
        }
    }

    /// Start the loop if the configuration enables it by default
    pub fn start(&self) {
        if self.config.enabled {
            self.set_enabled(true);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().unwrap().enabled
    }

    /// Toggle the simulator; disabling cancels the pending timer
    pub fn set_enabled(&self, enabled: bool) {
        {
            let mut state = self.state.lock().unwrap();
            if state.enabled == enabled {
                return;
            }
            state.enabled = enabled;

            if enabled {
                let token = CancellationToken::new();
                state.token = Some(token.clone());
                tokio::spawn(run_loop(Arc::clone(&self.board), self.config.clone(), token));
                info!("auto-pilot enabled");
            } else if let Some(token) = state.token.take() {
                token.cancel();
                info!("auto-pilot disabled, pending tick cancelled");
            }
        }

        self.bus.emit_lossy(ClutchEvent::AutoPilotToggled {
            enabled,
            timestamp: Utc::now(),
        });
    }
}

impl Drop for AutoPilot {
    fn drop(&mut self) {
        // No loop may outlive its owner
        if let Some(token) = self.state.lock().unwrap().token.take() {
            token.cancel();
        }
    }
}

async fn run_loop(board: Arc<MissionBoard>, config: AutoPilotConfig, token: CancellationToken) {
    loop {
        let delay = random_delay(&config);
        tokio::select! {
            _ = token.cancelled() => {
                debug!("auto-pilot loop stopped");
                break;
            }
            _ = tokio::time::sleep(delay) => {
                tick(&board, config.project_id).await;
            }
        }
    }
}

/// One simulator tick: pick an eligible mission and advance it
async fn tick(board: &MissionBoard, project_id: Option<Uuid>) {
    let missions = board.snapshot(project_id);
    let candidate: Option<MissionId> = {
        let mut rng = rand::thread_rng();
        select_candidate(&missions, &mut rng).map(|m| m.id)
    };

    let Some(id) = candidate else {
        debug!("auto-pilot tick: no eligible missions");
        return;
    };

    match board.request_advance(&id, AdvanceSource::AutoPilot).await {
        Ok(outcome) if outcome.advanced => {
            debug!(
                "auto-pilot advanced mission {} to {}",
                id, outcome.mission.status
            );
        }
        Ok(_) => {
            // Raced another trigger to the terminal stage; harmless
        }
        Err(e) => warn!("auto-pilot advance failed: {}", e),
    }
}

fn random_delay(config: &AutoPilotConfig) -> Duration {
    let (min, max) = config.interval_bounds();
    if min >= max {
        return min;
    }
    let millis = rand::thread_rng().gen_range(min.as_millis()..=max.as_millis());
    Duration::from_millis(millis as u64)
}
