//! Booking lifecycle endpoints.
//!
//! - `POST /api/bookings` - create a time-bounded hold
//! - `GET /api/bookings/:id` - read a booking with showtime and
//!   identity resolved (triggers lazy expiry)
//! - `POST /api/bookings/:id/payment` - finalize the hold with a card
//! - `POST /api/bookings/:id/cancel` - explicit owner/operator cancel

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use cinebook_core::engine::CancelRequester;
use cinebook_core::reservation::HoldRequest;
use cinebook_core::types::{
    AccountId, Booking, BookingId, BookingIdentity, BookingStatus, CardDetails, GuestContact,
    Money, Payment, SeatId, ShowtimeId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Guest contact details in a booking request.
#[derive(Debug, Deserialize)]
pub struct GuestRequest {
    /// Guest name
    pub name: String,
    /// Contact email (guest accounts are keyed by this)
    pub email: String,
    /// Contact phone
    #[serde(default)]
    pub phone: String,
}

/// Request to create a new booking hold.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Showtime to book seats for
    pub showtime_id: Uuid,
    /// Layout seat ids to claim
    pub seats: Vec<Uuid>,
    /// Total amount in cents
    pub total_amount_cents: u64,
    /// Authenticated account id, if any
    pub account_id: Option<Uuid>,
    /// Guest contact details, when no authenticated identity exists
    pub guest: Option<GuestRequest>,
}

/// Response after creating a hold.
#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    /// Created booking id
    pub booking_id: BookingId,
    /// When the hold lapses
    pub expires_at: DateTime<Utc>,
    /// Always `temporary` on creation
    pub status: BookingStatus,
    /// Message for the user
    pub message: String,
}

/// Request to finalize a booking with a payment instrument.
#[derive(Debug, Deserialize)]
pub struct CompleteBookingRequest {
    /// Card number (16 digits)
    pub card_number: String,
    /// Expiry in `MM/YY` form
    pub expiry: String,
    /// Card verification value (3 digits)
    pub cvv: String,
}

/// Response after successful payment.
#[derive(Debug, Serialize)]
pub struct CompleteBookingResponse {
    /// The completed booking, ticket number included
    pub booking: Booking,
    /// The settled payment record
    pub payment: Payment,
}

/// Showtime summary embedded in a booking read.
#[derive(Debug, Serialize)]
pub struct ShowtimeSummary {
    /// Showtime id
    pub id: ShowtimeId,
    /// Film title
    pub film: String,
    /// Screen name
    pub screen: String,
    /// Scheduled start
    pub starts_at: DateTime<Utc>,
}

/// Customer summary embedded in a booking read.
///
/// Deliberately omits the stored credential.
#[derive(Debug, Serialize)]
pub struct CustomerSummary {
    /// Account id
    pub id: AccountId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Whether the account came from the guest flow
    pub is_guest: bool,
}

/// Booking read response with collaborators resolved.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// The booking
    pub booking: Booking,
    /// Its showtime
    pub showtime: ShowtimeSummary,
    /// Its owner
    pub customer: CustomerSummary,
}

/// Request to cancel a booking.
#[derive(Debug, Deserialize)]
pub struct CancelBookingRequest {
    /// The requesting account
    pub account_id: Uuid,
    /// Elevated privilege (operators may cancel any booking)
    #[serde(default)]
    pub admin: bool,
}

/// Response after cancelling a booking.
#[derive(Debug, Serialize)]
pub struct CancelBookingResponse {
    /// The cancelled booking
    pub booking_id: BookingId,
    /// Message for the user
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new booking hold.
///
/// Resolves the identity (authenticated id, or guest contact keyed by
/// email), conflict-checks the requested seats, and grants a hold that
/// expires after the configured duration.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/bookings \
///   -H "Content-Type: application/json" \
///   -d '{
///     "showtime_id": "550e8400-e29b-41d4-a716-446655440000",
///     "seats": ["660e8400-e29b-41d4-a716-446655440001"],
///     "total_amount_cents": 1500,
///     "guest": {"name": "Ada", "email": "ada@example.com", "phone": "555-0100"}
///   }'
/// ```
///
/// # Errors
///
/// `400` for missing identity info or invalid seats, `404` for an
/// unknown showtime, `409 SEAT_CONFLICT` when any seat is already held.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let identity = match (request.account_id, request.guest) {
        // An authenticated identity wins over any guest payload.
        (Some(account_id), _) => BookingIdentity::Registered(AccountId::from_uuid(account_id)),
        (None, Some(guest)) => BookingIdentity::Guest(GuestContact {
            name: guest.name,
            email: guest.email,
            phone: guest.phone,
        }),
        (None, None) => {
            return Err(AppError::bad_request(
                "either account_id or guest contact details are required",
            ));
        }
    };

    let hold = state.engine.create_booking(HoldRequest {
        showtime_id: ShowtimeId::from_uuid(request.showtime_id),
        seat_ids: request.seats.into_iter().map(SeatId::from_uuid).collect(),
        total_amount: Money::from_cents(request.total_amount_cents),
        identity,
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            booking_id: hold.booking_id,
            expires_at: hold.expires_at,
            status: hold.status,
            message: "Seats held. Complete payment before the hold expires.".to_string(),
        }),
    ))
}

/// Get a booking with its showtime and identity resolved.
///
/// Reading an expired hold lazily cancels it first, so the returned
/// status is always current.
///
/// # Errors
///
/// `404` if the booking does not exist.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let view = state
        .engine
        .get_booking(BookingId::from_uuid(booking_id))?;

    Ok(Json(BookingResponse {
        showtime: ShowtimeSummary {
            id: view.showtime.id,
            film: view.showtime.film,
            screen: view.showtime.screen,
            starts_at: view.showtime.starts_at,
        },
        customer: CustomerSummary {
            id: view.account.id,
            name: view.account.name,
            email: view.account.email,
            is_guest: view.account.is_guest,
        },
        booking: view.booking,
    }))
}

/// Finalize a booking with a payment instrument.
///
/// # Errors
///
/// `400 PAYMENT_FAILED` for a rejected instrument (the booking stays
/// retryable), `400 INVALID_BOOKING_STATUS` for completed/cancelled
/// bookings, `404` for unknown bookings, `410 BOOKING_EXPIRED` when the
/// hold lapsed (the booking is cancelled and its seats released).
pub async fn complete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<CompleteBookingRequest>,
) -> Result<Json<CompleteBookingResponse>, AppError> {
    if request.card_number.trim().is_empty()
        || request.expiry.trim().is_empty()
        || request.cvv.trim().is_empty()
    {
        return Err(
            AppError::bad_request("card_number, expiry, and cvv are all required")
                .with_code("INVALID_CARD_DETAILS"),
        );
    }

    let card = CardDetails {
        number: request.card_number,
        expiry: request.expiry,
        cvv: request.cvv,
    };
    let (booking, payment) = state
        .engine
        .complete_booking(BookingId::from_uuid(booking_id), &card)
        .await?;

    Ok(Json(CompleteBookingResponse { booking, payment }))
}

/// Cancel a temporary booking and release its seats.
///
/// The requester must own the booking or carry elevated privilege.
///
/// # Errors
///
/// `400 INVALID_BOOKING_STATUS` for completed/cancelled bookings,
/// `403` for non-owners, `404` for unknown bookings.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    let booking_id = BookingId::from_uuid(booking_id);
    state.engine.cancel_booking(
        booking_id,
        CancelRequester {
            account_id: AccountId::from_uuid(request.account_id),
            elevated: request.admin,
        },
    )?;

    Ok(Json(CancelBookingResponse {
        booking_id,
        message: "Booking cancelled and seats released.".to_string(),
    }))
}
