//! Inventory ledger: per-showtime seat claims.
//!
//! The ledger is the source of truth for conflict checks. It records,
//! per showtime, an ordered set of `(seat, booking)` claims. A claim is
//! *active* while its booking is completed, or temporary with an
//! unexpired hold. Invariant: a seat carries at most one active claim
//! at any instant.
//!
//! All functions here operate on a [`StoreData`] snapshot and are only
//! called from inside a unit of work, which is what makes the caller's
//! check-then-reserve sequence atomic.

use crate::store::StoreData;
use crate::types::{BookingId, SeatId, ShowtimeId};
use chrono::{DateTime, Utc};

/// Returns the booking holding an active claim on `seat_id`, if any.
#[must_use]
pub fn active_claim(
    data: &StoreData,
    showtime_id: ShowtimeId,
    seat_id: SeatId,
    now: DateTime<Utc>,
) -> Option<BookingId> {
    let booking_id = *data.claims.get(&showtime_id)?.get(&seat_id)?;
    let booking = data.bookings.get(&booking_id)?;
    booking.holds_active_claim(now).then_some(booking_id)
}

/// Returns every requested seat that already carries an active claim
/// from another booking.
#[must_use]
pub fn conflicting_seats(
    data: &StoreData,
    showtime_id: ShowtimeId,
    seat_ids: &[SeatId],
    now: DateTime<Utc>,
) -> Vec<SeatId> {
    seat_ids
        .iter()
        .copied()
        .filter(|seat_id| active_claim(data, showtime_id, *seat_id, now).is_some())
        .collect()
}

/// Adds claims for every seat, referencing `booking_id`.
///
/// Idempotent under retry: a claim already held by the same booking is
/// left as-is. A stale claim (one whose booking no longer holds an
/// active claim) is overwritten; the caller has already established via
/// [`conflicting_seats`] that no *active* claim stands in the way.
pub fn reserve(
    data: &mut StoreData,
    showtime_id: ShowtimeId,
    seat_ids: &[SeatId],
    booking_id: BookingId,
) {
    let claims = data.claims.entry(showtime_id).or_default();
    for seat_id in seat_ids {
        claims.insert(*seat_id, booking_id);
    }
}

/// Removes the claims `booking_id` holds on the given seats.
///
/// Idempotent: seats with no claim, or claimed by a different booking,
/// are left untouched.
pub fn release(
    data: &mut StoreData,
    showtime_id: ShowtimeId,
    seat_ids: &[SeatId],
    booking_id: BookingId,
) {
    if let Some(claims) = data.claims.get_mut(&showtime_id) {
        for seat_id in seat_ids {
            if claims.get(seat_id) == Some(&booking_id) {
                claims.remove(seat_id);
            }
        }
    }
}

/// Releases every claim a booking holds on its showtime.
pub fn release_booking(data: &mut StoreData, booking_id: BookingId) {
    let Some(booking) = data.bookings.get(&booking_id) else {
        return;
    };
    let showtime_id = booking.showtime_id;
    let seat_ids: Vec<SeatId> = booking.seats.iter().map(|seat| seat.seat_id).collect();
    release(data, showtime_id, &seat_ids, booking_id);
}
