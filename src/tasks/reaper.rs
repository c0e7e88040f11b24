//! Expired Entry Reaper
//!
//! Background task that periodically removes expired cache entries,
//! independent of read traffic.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::{CacheStore, RefreshStats};
use crate::error::{CacheError, Result};

// == Reaper State ==
/// Lifecycle of a cache's reaper. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaperState {
    /// The cache was built without a clean interval
    NotStarted,
    Running,
    Stopped,
}

// == Reaper ==
/// Handle to a running sweep task.
///
/// The stop signal is a one-shot sender taken out of its slot exactly once,
/// so repeated stops are no-ops. Dropping the handle stops the task too.
#[derive(Debug)]
pub struct Reaper {
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
    handle: JoinHandle<()>,
}

impl Reaper {
    /// Spawns a task that sweeps `store` every `interval`.
    ///
    /// The sweep holds the write lock over the whole store and never calls a
    /// fetcher. The first sweep happens one interval after spawning.
    pub fn spawn<T>(
        store: Arc<RwLock<CacheStore<T>>>,
        interval: Duration,
        stats: Arc<RefreshStats>,
    ) -> Result<Self>
    where
        T: Send + Sync + 'static,
    {
        if interval.is_zero() {
            return Err(CacheError::InvalidConfiguration(
                "clean interval must be greater than zero".to_string(),
            ));
        }
        let runtime = Handle::try_current().map_err(|_| {
            CacheError::InvalidConfiguration(
                "background reaper requires a Tokio runtime".to_string(),
            )
        })?;

        let first_tick = Instant::now().checked_add(interval).ok_or_else(|| {
            CacheError::InvalidConfiguration(format!(
                "clean interval {:?} is too large",
                interval
            ))
        })?;

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = runtime.spawn(async move {
            info!("Starting reaper with interval of {:?}", interval);

            let mut ticker = interval_at(first_tick, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    // Fires on stop() and when the handle is dropped
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let removed = {
                            let mut store_guard = store.write().await;
                            store_guard.cleanup_expired(Instant::now())
                        };
                        stats.record_reaped(removed);

                        if removed > 0 {
                            info!("Reaper: removed {} expired entries", removed);
                        } else {
                            debug!("Reaper: no expired entries found");
                        }
                    }
                }
            }

            info!("Reaper stopped");
        });

        Ok(Self {
            stop_tx: Mutex::new(Some(stop_tx)),
            handle,
        })
    }

    /// Signals the task to stop. Returns false if it was already stopped.
    pub fn stop(&self) -> bool {
        let sender = self
            .stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => {
                // The task may already have exited; nothing left to signal then.
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> ReaperState {
        let signalled = self
            .stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none();
        if signalled || self.handle.is_finished() {
            ReaperState::Stopped
        } else {
            ReaperState::Running
        }
    }

    /// Whether the task has fully exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.stop();
    }
}
