//! HTTP handlers for the booking API.

pub mod bookings;
pub mod health;
pub mod showtimes;
