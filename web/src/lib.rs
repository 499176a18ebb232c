//! # Cinebook Web
//!
//! HTTP surface for the seat-booking engine.
//!
//! Exposes the booking lifecycle over Axum:
//!
//! | Method | Path                        | Purpose                         |
//! |--------|-----------------------------|---------------------------------|
//! | POST   | `/api/bookings`             | create a time-bounded hold      |
//! | GET    | `/api/bookings/:id`         | read a booking (lazy expiry)    |
//! | POST   | `/api/bookings/:id/payment` | finalize the hold with a card   |
//! | POST   | `/api/bookings/:id/cancel`  | owner/operator cancellation     |
//! | GET    | `/api/showtimes/:id/seats`  | per-seat availability           |
//! | GET    | `/health`, `/ready`         | probes                          |
//!
//! The binary wires a [`cinebook_core::engine::BookingEngine`] around
//! the in-memory store, seeds a demo showtime, starts the expiry
//! reclaimer, and serves until Ctrl+C/SIGTERM.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use lifecycle::Application;
pub use routes::build_router;
pub use state::AppState;
