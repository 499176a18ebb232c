//! Expiry reclaimer: background sweep that cancels stale holds and
//! frees their seats.
//!
//! Runs on a fixed interval as one independently scheduled task; it
//! shares nothing with request handling except the store. Each due
//! booking is reclaimed in its own unit of work, and the
//! temporary-and-expired predicate is re-evaluated inside that unit,
//! so a booking finalized or cancelled concurrently between selection
//! and commit is simply skipped. Repeated sweeps are idempotent.

use crate::config::EngineConfig;
use crate::environment::Clock;
use crate::state_machine;
use crate::store::MemoryStore;
use crate::types::BookingId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// What one sweep cycle did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Holds selected as due at the start of the cycle
    pub examined: usize,
    /// Holds actually cancelled by this cycle
    pub cancelled: usize,
}

/// Periodic task that reclaims expired holds
pub struct ExpiryReclaimer {
    store: Arc<MemoryStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ExpiryReclaimer {
    /// Creates a new `ExpiryReclaimer`
    #[must_use]
    pub fn new(store: Arc<MemoryStore>, clock: Arc<dyn Clock>, config: &EngineConfig) -> Self {
        Self {
            store,
            clock,
            interval: config.reclaim_interval,
        }
    }

    /// Runs one sweep cycle.
    ///
    /// Selection happens against a read snapshot; each reclamation then
    /// re-checks the predicate inside its own unit of work.
    pub fn sweep_once(&self) -> SweepReport {
        let now = self.clock.now();
        let due: Vec<BookingId> = self.store.read(|data| {
            data.bookings
                .values()
                .filter(|booking| booking.is_expired(now))
                .map(|booking| booking.id)
                .collect()
        });

        let mut cancelled = 0;
        for booking_id in &due {
            match self
                .store
                .unit_of_work(|data| state_machine::expire_if_due(data, *booking_id, now))
            {
                Ok(true) => cancelled += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(booking_id = %booking_id, error = %err, "reclaim failed");
                }
            }
        }

        if cancelled > 0 {
            tracing::info!(examined = due.len(), cancelled, "reclaimer sweep finished");
        }
        SweepReport {
            examined: due.len(),
            cancelled,
        }
    }

    /// Starts the periodic sweep and returns its stop handle.
    #[must_use]
    pub fn spawn(self) -> ReclaimerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.sweep_once();
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            tracing::info!("expiry reclaimer stopped");
        });
        ReclaimerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Stop handle for a running reclaimer
pub struct ReclaimerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReclaimerHandle {
    /// Signals the task to stop and waits for it, up to `timeout`.
    pub async fn shutdown(self, timeout: Duration) {
        let _ = self.shutdown.send(true);
        match tokio::time::timeout(timeout, self.task).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(error = %err, "reclaimer task failed"),
            Err(_) => tracing::warn!("reclaimer shutdown timed out"),
        }
    }
}
