//! Reservation manager: turns a seat request into a time-bounded hold.
//!
//! `create_booking` is the only way a booking comes into existence. The
//! whole algorithm (identity resolution, showtime load, conflict
//! check, booking creation, ledger claims) runs as one unit of work,
//! so two racing requests for the same seats serialize and exactly one
//! of them commits its claims; the loser observes them and fails with
//! a seat conflict. All-or-nothing: a single contested seat aborts the
//! entire request.

use crate::config::EngineConfig;
use crate::environment::Clock;
use crate::error::{Error, Result};
use crate::store::MemoryStore;
use crate::types::{
    Booking, BookingId, BookingIdentity, BookingStatus, Money, PaymentProgress, SeatId,
    SeatSelection, ShowtimeId,
};
use crate::{identity, ledger};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// A request for a new hold
#[derive(Clone, Debug)]
pub struct HoldRequest {
    /// Target showtime
    pub showtime_id: ShowtimeId,
    /// Seats to claim, by layout id
    pub seat_ids: Vec<SeatId>,
    /// Total amount the client expects to pay
    pub total_amount: Money,
    /// Authenticated account or guest contact
    pub identity: BookingIdentity,
}

/// What a successful hold returns to the caller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoldConfirmation {
    /// The new booking
    pub booking_id: BookingId,
    /// When the hold lapses
    pub expires_at: DateTime<Utc>,
    /// Always `Temporary` on creation
    pub status: BookingStatus,
}

/// Creates time-bounded holds after conflict-checking the ledger
pub struct ReservationManager {
    store: Arc<MemoryStore>,
    clock: Arc<dyn Clock>,
    hold_duration: chrono::Duration,
}

impl ReservationManager {
    /// Creates a new `ReservationManager`
    #[must_use]
    pub fn new(store: Arc<MemoryStore>, clock: Arc<dyn Clock>, config: &EngineConfig) -> Self {
        Self {
            store,
            clock,
            hold_duration: config.hold_duration,
        }
    }

    /// Creates a temporary booking holding the requested seats.
    ///
    /// Seats become unavailable to other callers the instant the unit
    /// of work commits.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for an empty or duplicated seat list,
    ///   malformed guest contact, unknown account, or a seat id absent
    ///   from the showtime layout
    /// - [`Error::ShowtimeNotFound`] if the showtime does not exist
    /// - [`Error::SeatConflict`] if any requested seat carries an
    ///   active claim; nothing is reserved in that case
    pub fn create_booking(&self, request: HoldRequest) -> Result<HoldConfirmation> {
        Self::validate_request(&request)?;

        let now = self.clock.now();
        let expires_at = now + self.hold_duration;
        let hold = self.store.unit_of_work(|data| {
            let account_id = identity::resolve(data, &request.identity)?;

            let showtime = data.showtime(request.showtime_id)?;
            let mut selections = Vec::with_capacity(request.seat_ids.len());
            for seat_id in &request.seat_ids {
                let seat = showtime.seat(*seat_id).ok_or_else(|| {
                    Error::Validation(format!(
                        "seat {seat_id} is not part of showtime {}",
                        request.showtime_id
                    ))
                })?;
                selections.push(SeatSelection {
                    seat_id: seat.id,
                    row: seat.row.clone(),
                    number: seat.number,
                    kind: seat.kind,
                });
            }

            let conflicts =
                ledger::conflicting_seats(data, request.showtime_id, &request.seat_ids, now);
            if !conflicts.is_empty() {
                return Err(Error::SeatConflict { seats: conflicts });
            }

            let booking = Booking {
                id: BookingId::new(),
                account_id,
                showtime_id: request.showtime_id,
                seats: selections,
                total_amount: request.total_amount,
                status: BookingStatus::Temporary,
                payment_status: PaymentProgress::Pending,
                ticket_number: None,
                expires_at: Some(expires_at),
                created_at: now,
            };
            let booking_id = booking.id;
            data.bookings.insert(booking_id, booking);
            ledger::reserve(data, request.showtime_id, &request.seat_ids, booking_id);

            Ok(HoldConfirmation {
                booking_id,
                expires_at,
                status: BookingStatus::Temporary,
            })
        })?;

        tracing::info!(
            booking_id = %hold.booking_id,
            showtime_id = %request.showtime_id,
            seats = request.seat_ids.len(),
            expires_at = %hold.expires_at,
            "hold created"
        );
        Ok(hold)
    }

    /// Shape checks that run before any transaction
    fn validate_request(request: &HoldRequest) -> Result<()> {
        if request.seat_ids.is_empty() {
            return Err(Error::Validation(
                "a booking must select at least one seat".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(request.seat_ids.len());
        for seat_id in &request.seat_ids {
            if !seen.insert(*seat_id) {
                return Err(Error::Validation(format!(
                    "seat {seat_id} is requested more than once"
                )));
            }
        }

        if let BookingIdentity::Guest(contact) = &request.identity {
            contact.validate().map_err(Error::Validation)?;
        }
        Ok(())
    }
}
