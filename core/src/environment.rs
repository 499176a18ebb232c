//! Injected dependencies for the booking engine.
//!
//! External concerns are abstracted behind traits and passed in as
//! `Arc<dyn ...>` so production and tests compose the same services with
//! different implementations.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability.
///
/// Expiry logic compares wall-clock time against hold deadlines, so
/// every component takes its notion of "now" from this trait rather
/// than calling `Utc::now()` directly.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for deterministic tests.
///
/// Always returns the same time, making expiry assertions reproducible.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}
