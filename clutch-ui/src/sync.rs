//! Periodic reconciliation against the mission store
//!
//! The projection in [`MissionBoard`] may drift from the store after a
//! failed persistence write. This task refetches the full stored mission
//! list on a fixed interval and feeds it to the board, which replaces every
//! stored entry wholesale. The store wins every conflict.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use clutch_common::db::MissionStore;

use crate::board::MissionBoard;

/// Background refetch loop keeping the projection honest
pub struct Reconciler {
    token: CancellationToken,
}

impl Reconciler {
    /// Spawn the loop; the returned handle stops it
    pub fn spawn(
        board: Arc<MissionBoard>,
        store: Arc<dyn MissionStore>,
        interval: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        tokio::spawn(run_loop(board, store, interval, token.clone()));
        Self { token }
    }

    pub fn stop(&self) {
        self.token.cancel();
    }
}

impl Drop for Reconciler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_loop(
    board: Arc<MissionBoard>,
    store: Arc<dyn MissionStore>,
    interval: Duration,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("reconciler stopped");
                break;
            }
            _ = tokio::time::sleep(interval) => {
                // A failed fetch leaves the projection as-is; the next
                // cycle retries
                match store.list_missions(None).await {
                    Ok(missions) => {
                        let size = board.reconcile(missions);
                        debug!("reconciled projection, {} missions", size);
                    }
                    Err(e) => warn!("reconcile fetch failed: {}", e),
                }
            }
        }
    }
}
