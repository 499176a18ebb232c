//! Error taxonomy for the booking engine.
//!
//! Business errors are explicit variants so callers (and the HTTP layer)
//! can map them to specific codes. Anything unexpected aborts its unit
//! of work and surfaces as [`Error::Internal`].

use crate::types::{BookingId, BookingStatus, SeatId, ShowtimeId};
use thiserror::Error;

/// Result alias for booking-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// All failures the booking engine can report
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The target showtime does not exist
    #[error("showtime {0} not found")]
    ShowtimeNotFound(ShowtimeId),

    /// The target booking does not exist
    #[error("booking {0} not found")]
    BookingNotFound(BookingId),

    /// A requested seat already carries an active claim
    #[error("seat conflict: {} seat(s) already claimed", .seats.len())]
    SeatConflict {
        /// The contested seats
        seats: Vec<SeatId>,
    },

    /// The hold deadline has passed; the booking was lazily cancelled
    #[error("booking {0} has expired")]
    BookingExpired(BookingId),

    /// The requested transition is not allowed from the current status
    #[error("cannot {action} a booking in status '{status}'")]
    InvalidState {
        /// Current booking status
        status: BookingStatus,
        /// The attempted operation, for the error message
        action: &'static str,
    },

    /// The requester does not own the booking and holds no elevated privilege
    #[error("requester does not own booking {0}")]
    Forbidden(BookingId),

    /// A request value failed shape validation before any transaction
    #[error("validation failed: {0}")]
    Validation(String),

    /// The payment instrument was rejected; the booking stays retryable
    #[error("payment failed: {reason}")]
    PaymentFailed {
        /// Specific validation or gateway reason
        reason: String,
    },

    /// Transient storage failure, safe to retry
    #[error("storage failure: {0}")]
    Storage(String),

    /// Unexpected failure; the enclosing unit of work was aborted
    #[error("internal error: {0}")]
    Internal(String),
}
