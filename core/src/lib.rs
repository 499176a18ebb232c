//! # Cinebook Core
//!
//! Seat-reservation and booking lifecycle engine for cinema showtimes.
//!
//! The engine manages perishable inventory under concurrent demand:
//!
//! - **Inventory ledger** ([`ledger`]): per-showtime seat claims, the
//!   source of truth for conflict checks
//! - **Reservation manager** ([`reservation`]): grants short-lived
//!   exclusive holds after a race-free conflict check
//! - **State machine** ([`state_machine`]): `temporary → completed |
//!   cancelled`, with lazy expiry on any access
//! - **Payment finalizer** ([`payment`]): atomically converts a valid,
//!   unexpired hold into a confirmed sale
//! - **Expiry reclaimer** ([`reclaimer`]): background sweep cancelling
//!   stale holds and freeing their seats
//!
//! # Correctness
//!
//! The single shared-state discipline: every multi-step mutation runs
//! inside [`store::MemoryStore::unit_of_work`], which serializes units
//! and commits all-or-nothing. For any `(showtime, seat)` pair at most
//! one *active* claim (completed booking, or unexpired hold) exists at
//! any instant; the first unit to commit a claim wins and later
//! conflicting units observe it and fail with a seat conflict.
//!
//! # Example
//!
//! ```
//! use cinebook_core::config::EngineConfig;
//! use cinebook_core::engine::BookingEngine;
//! use cinebook_core::environment::SystemClock;
//! use cinebook_core::gateway::LocalPaymentGateway;
//! use cinebook_core::reservation::HoldRequest;
//! use cinebook_core::store::MemoryStore;
//! use cinebook_core::types::{
//!     BookingIdentity, GuestContact, Money, Seat, SeatId, SeatKind, Showtime, ShowtimeId,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), cinebook_core::error::Error> {
//! let store = Arc::new(MemoryStore::new());
//! let seat = Seat::new(
//!     SeatId::new(),
//!     "A".to_string(),
//!     1,
//!     SeatKind::Regular,
//!     Money::from_cents(1500),
//! );
//! let showtime = Showtime::new(
//!     ShowtimeId::new(),
//!     "M".to_string(),
//!     "Screen 1".to_string(),
//!     chrono::Utc::now(),
//!     vec![seat.clone()],
//! );
//! let showtime_id = showtime.id;
//! store.insert_showtime(showtime)?;
//!
//! let engine = BookingEngine::new(
//!     store,
//!     Arc::new(SystemClock),
//!     LocalPaymentGateway::shared(),
//!     EngineConfig::default(),
//! );
//! let hold = engine.create_booking(HoldRequest {
//!     showtime_id,
//!     seat_ids: vec![seat.id],
//!     total_amount: Money::from_cents(1500),
//!     identity: BookingIdentity::Guest(GuestContact {
//!         name: "Ada".to_string(),
//!         email: "ada@example.com".to_string(),
//!         phone: "555-0100".to_string(),
//!     }),
//! })?;
//! assert_eq!(hold.status, cinebook_core::types::BookingStatus::Temporary);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod ledger;
pub mod payment;
pub mod reclaimer;
pub mod reservation;
pub mod state_machine;
pub mod store;
pub mod types;

pub use config::EngineConfig;
pub use engine::{BookingEngine, BookingView, CancelRequester, SeatAvailability};
pub use environment::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use gateway::{LocalPaymentGateway, PaymentGateway};
pub use reclaimer::{ExpiryReclaimer, ReclaimerHandle};
pub use reservation::{HoldConfirmation, HoldRequest};
pub use store::MemoryStore;
