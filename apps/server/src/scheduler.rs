//! Background scheduler for periodic quote sync.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::api::sync::perform_quote_sync;
use crate::main_lib::AppState;

/// Handle to the recurring sync task. Dropping it leaves the task running;
/// call [`SyncScheduler::shutdown`] to stop it.
pub struct SyncScheduler {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SyncScheduler {
    /// Starts syncing every `period`. With `sync_on_start` the first cycle
    /// runs right away, otherwise after one full period.
    ///
    /// A tick that comes due while a cycle is still running is skipped.
    pub fn start(state: Arc<AppState>, period: Duration, sync_on_start: bool) -> Self {
        let (cancel, mut cancelled) = watch::channel(false);

        let handle = tokio::spawn(async move {
            info!("Quote sync scheduler started ({}s interval)", period.as_secs());

            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            if !sync_on_start {
                // The first tick completes immediately.
                ticker.tick().await;
            }

            loop {
                tokio::select! {
                    _ = ticker.tick() => run_scheduled_sync(&state).await,
                    changed = cancelled.changed() => {
                        if changed.is_err() || *cancelled.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Quote sync scheduler stopped");
        });

        Self { cancel, handle }
    }

    /// Stops the task and waits for an in-flight cycle to finish.
    pub async fn shutdown(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}

/// Starts the scheduler when a remote is configured and the interval is non-zero.
pub fn start_quote_sync_scheduler(
    state: Arc<AppState>,
    period: Option<Duration>,
    sync_on_start: bool,
) -> Option<SyncScheduler> {
    if state.sync_engine.is_none() {
        debug!("Sync scheduler not started: no remote configured");
        return None;
    }
    let Some(period) = period else {
        debug!("Sync scheduler disabled by configuration");
        return None;
    };
    Some(SyncScheduler::start(state, period, sync_on_start))
}

async fn run_scheduled_sync(state: &Arc<AppState>) {
    if state
        .sync_engine
        .as_ref()
        .is_some_and(|engine| engine.is_syncing())
    {
        debug!("Scheduled sync skipped: a cycle is already running");
        return;
    }

    // Failures are already reported through the notification log.
    if let Err(e) = perform_quote_sync(state).await {
        debug!("Scheduled sync failed: {}", e);
    }
}
