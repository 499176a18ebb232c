//! Router configuration for the booking server.
//!
//! Builds the complete Axum router with all endpoints.

use crate::handlers::{bookings, health, showtimes};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Build the complete Axum router.
///
/// Configures all routes:
/// - Health checks
/// - Booking lifecycle endpoints
/// - Seat availability queries
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Booking lifecycle
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/payment", post(bookings::complete_booking))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking))
        // Seat availability (ledger read side)
        .route(
            "/showtimes/:id/seats",
            get(showtimes::get_seat_availability),
        );

    Router::new()
        // Health checks
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .with_state(state)
}
