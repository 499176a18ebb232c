//! Engine tuning knobs.

use chrono::Duration;

/// Configuration for the booking engine's time-based behavior
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// How long a hold stays valid before expiring (default 600 s)
    pub hold_duration: Duration,
    /// Interval between reclaimer sweeps (default 60 s)
    pub reclaim_interval: std::time::Duration,
}

impl EngineConfig {
    /// Default hold duration in seconds
    pub const DEFAULT_HOLD_SECS: i64 = 600;
    /// Default reclaimer sweep interval in seconds
    pub const DEFAULT_RECLAIM_SECS: u64 = 60;

    /// Overrides the hold duration
    #[must_use]
    pub const fn with_hold_duration(mut self, hold_duration: Duration) -> Self {
        self.hold_duration = hold_duration;
        self
    }

    /// Overrides the reclaimer sweep interval
    #[must_use]
    pub const fn with_reclaim_interval(mut self, reclaim_interval: std::time::Duration) -> Self {
        self.reclaim_interval = reclaim_interval;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hold_duration: Duration::seconds(Self::DEFAULT_HOLD_SECS),
            reclaim_interval: std::time::Duration::from_secs(Self::DEFAULT_RECLAIM_SECS),
        }
    }
}
