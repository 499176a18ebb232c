//! Booking status transitions and the guards around them.
//!
//! `Temporary` is the only non-terminal state:
//!
//! ```text
//! Temporary ──▶ Completed   (terminal)
//!     └───────▶ Cancelled   (terminal)
//! ```
//!
//! No transition leaves a terminal state. Expired holds transition
//! lazily: any access to a temporary booking past its deadline cancels
//! it before further logic runs, so the state machine self-heals even
//! if the background reclaimer has not swept yet.

use crate::error::{Error, Result};
use crate::ledger;
use crate::store::StoreData;
use crate::types::{Booking, BookingId, BookingStatus, PaymentProgress};
use chrono::{DateTime, Utc};

/// Applies a status transition, enforcing the terminal-state guard.
///
/// On entering a terminal state the hold deadline is cleared; it only
/// has meaning while the booking is temporary.
///
/// # Errors
///
/// Returns [`Error::InvalidState`] if the booking is already terminal.
pub fn transition(booking: &mut Booking, to: BookingStatus, action: &'static str) -> Result<()> {
    if booking.status.is_terminal() {
        return Err(Error::InvalidState {
            status: booking.status,
            action,
        });
    }
    booking.status = to;
    if to.is_terminal() {
        booking.expires_at = None;
    }
    Ok(())
}

/// Lazily cancels a temporary booking whose deadline has passed.
///
/// Re-checks the full predicate (`Temporary` and `expires_at <= now`)
/// against the snapshot it runs in, so it is safe to call from any
/// access path concurrently with the reclaimer: a booking finalized or
/// cancelled in the meantime is simply left alone. Returns whether the
/// booking was cancelled by this call.
///
/// # Errors
///
/// Returns [`Error::BookingNotFound`] if the booking does not exist.
pub fn expire_if_due(data: &mut StoreData, id: BookingId, now: DateTime<Utc>) -> Result<bool> {
    let booking = data.booking(id)?;
    if !booking.is_expired(now) {
        return Ok(false);
    }

    ledger::release_booking(data, id);
    let booking = data.booking_mut(id)?;
    transition(booking, BookingStatus::Cancelled, "expire")?;
    booking.payment_status = PaymentProgress::Failed;
    tracing::debug!(booking_id = %id, "expired hold cancelled");
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{AccountId, Money, SeatId, SeatKind, SeatSelection, ShowtimeId};
    use chrono::Duration;

    fn temporary_booking(expires_at: DateTime<Utc>) -> Booking {
        Booking {
            id: BookingId::new(),
            account_id: AccountId::new(),
            showtime_id: ShowtimeId::new(),
            seats: vec![SeatSelection {
                seat_id: SeatId::new(),
                row: "B".to_string(),
                number: 4,
                kind: SeatKind::Vip,
            }],
            total_amount: Money::from_cents(2500),
            status: BookingStatus::Temporary,
            payment_status: PaymentProgress::Pending,
            ticket_number: None,
            expires_at: Some(expires_at),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn temporary_can_complete_and_clears_deadline() {
        let mut booking = temporary_booking(Utc::now() + Duration::minutes(10));
        transition(&mut booking, BookingStatus::Completed, "complete").unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
        assert!(booking.expires_at.is_none());
    }

    #[test]
    fn terminal_states_reject_every_transition() {
        for terminal in [BookingStatus::Completed, BookingStatus::Cancelled] {
            let mut booking = temporary_booking(Utc::now());
            booking.status = terminal;
            let err = transition(&mut booking, BookingStatus::Cancelled, "cancel").unwrap_err();
            assert!(matches!(err, Error::InvalidState { status, .. } if status == terminal));
            assert_eq!(booking.status, terminal);
        }
    }

    #[test]
    fn expire_if_due_cancels_and_releases_seats() {
        let mut data = StoreData::default();
        let now = Utc::now();
        let booking = temporary_booking(now - Duration::seconds(1));
        let id = booking.id;
        let showtime_id = booking.showtime_id;
        let seat_id = booking.seats[0].seat_id;
        data.bookings.insert(id, booking);
        ledger::reserve(&mut data, showtime_id, &[seat_id], id);

        assert!(expire_if_due(&mut data, id, now).unwrap());
        let booking = data.booking(id).unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.payment_status, PaymentProgress::Failed);
        assert!(booking.expires_at.is_none());
        assert!(data.claims[&showtime_id].get(&seat_id).is_none());

        // A second pass over the same booking is a no-op.
        assert!(!expire_if_due(&mut data, id, now).unwrap());
    }

    #[test]
    fn expire_if_due_leaves_live_holds_alone() {
        let mut data = StoreData::default();
        let now = Utc::now();
        let booking = temporary_booking(now + Duration::minutes(5));
        let id = booking.id;
        data.bookings.insert(id, booking);

        assert!(!expire_if_due(&mut data, id, now).unwrap());
        assert_eq!(data.booking(id).unwrap().status, BookingStatus::Temporary);
    }

    #[test]
    fn expire_if_due_skips_completed_bookings() {
        let mut data = StoreData::default();
        let now = Utc::now();
        let mut booking = temporary_booking(now - Duration::minutes(1));
        booking.status = BookingStatus::Completed;
        booking.expires_at = None;
        let id = booking.id;
        data.bookings.insert(id, booking);

        assert!(!expire_if_due(&mut data, id, now).unwrap());
        assert_eq!(data.booking(id).unwrap().status, BookingStatus::Completed);
    }
}
