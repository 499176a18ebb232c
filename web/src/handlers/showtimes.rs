//! Seat availability queries.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use cinebook_core::types::{SeatId, SeatKind, ShowtimeId};
use serde::Serialize;
use uuid::Uuid;

/// Availability of one seat in the layout.
#[derive(Debug, Serialize)]
pub struct SeatAvailabilityEntry {
    /// Layout seat id
    pub seat_id: SeatId,
    /// Row label
    pub row: String,
    /// Seat number within the row
    pub number: u32,
    /// Seat category
    pub seat_type: SeatKind,
    /// Price in cents
    pub price_cents: u64,
    /// Whether no active claim holds this seat right now
    pub available: bool,
}

/// Seat availability for a showtime.
#[derive(Debug, Serialize)]
pub struct SeatAvailabilityResponse {
    /// The queried showtime
    pub showtime_id: ShowtimeId,
    /// Per-seat availability, in layout order
    pub seats: Vec<SeatAvailabilityEntry>,
}

/// Get per-seat availability for a showtime.
///
/// Derived from the inventory ledger with the active-claim predicate:
/// a seat is available unless a completed booking or an unexpired hold
/// claims it.
///
/// # Errors
///
/// `404` if the showtime does not exist.
pub async fn get_seat_availability(
    State(state): State<AppState>,
    Path(showtime_id): Path<Uuid>,
) -> Result<Json<SeatAvailabilityResponse>, AppError> {
    let showtime_id = ShowtimeId::from_uuid(showtime_id);
    let availability = state.engine.seat_availability(showtime_id)?;

    Ok(Json(SeatAvailabilityResponse {
        showtime_id,
        seats: availability
            .into_iter()
            .map(|entry| SeatAvailabilityEntry {
                seat_id: entry.seat.id,
                row: entry.seat.row,
                number: entry.seat.number,
                seat_type: entry.seat.kind,
                price_cents: entry.seat.price.cents(),
                available: entry.available,
            })
            .collect(),
    }))
}
