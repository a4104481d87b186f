//! Start-once guard and owner of the polling task.
//!
//! The composition root owns one [`PollingSupervisor`] and hands references
//! to whatever needs to start or stop polling. There is no global state, so
//! tests can build as many isolated supervisors as they like.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::poller::PricePoller;

/// Whether polling has been started in this process.
///
/// Starts false, flips to true on the first start and never goes back.
#[derive(Debug, Default)]
pub struct PollingState {
    active: AtomicBool,
}

impl PollingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Mark active. Returns false if it already was.
    fn try_activate(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Result of [`PollingSupervisor::start_polling`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The polling task was spawned by this call.
    Started,
    /// Polling was already started earlier; nothing changed.
    AlreadyActive,
}

/// Spawns the polling loop at most once and can stop it again.
pub struct PollingSupervisor {
    poller: Arc<PricePoller>,
    state: PollingState,
    stop_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollingSupervisor {
    pub fn new(poller: Arc<PricePoller>) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            poller,
            state: PollingState::new(),
            stop_tx,
            task: Mutex::new(None),
        }
    }

    /// Lock the task handle, recovering from poison if necessary.
    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|poisoned| {
            warn!("Polling supervisor mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Start background polling. Idempotent for the lifetime of the supervisor.
    ///
    /// The first call spawns the loop on the current Tokio runtime; its first
    /// cycle begins after the configured startup delay. Later calls only log.
    pub fn start_polling(&self) -> StartOutcome {
        if !self.state.try_activate() {
            info!("Polling already active.");
            return StartOutcome::AlreadyActive;
        }

        info!("Initializing background polling (delayed start)...");
        let poller = Arc::clone(&self.poller);
        let stop = self.stop_tx.subscribe();
        let handle = tokio::spawn(async move { poller.run(stop).await });
        *self.lock_task() = Some(handle);

        StartOutcome::Started
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// True while the spawned task is still alive.
    pub fn is_running(&self) -> bool {
        self.lock_task()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Ask the loop to stop at its next wait. Does not wait for it.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Stop the loop and wait up to `grace` for it to finish, then abort it.
    ///
    /// Polling cannot be restarted afterwards.
    pub async fn shutdown(&self, grace: Duration) {
        self.stop();

        let Some(mut handle) = self.lock_task().take() else {
            return;
        };

        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(())) => info!("Price polling task finished"),
            Ok(Err(e)) => error!("Price polling task ended abnormally: {}", e),
            Err(_) => {
                warn!(
                    "Price polling did not stop within {}s, aborting",
                    grace.as_secs()
                );
                handle.abort();
            }
        }
    }
}
