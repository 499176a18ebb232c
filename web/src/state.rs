//! Application state for the booking HTTP server.

use cinebook_core::engine::BookingEngine;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request. The engine is the only
/// dependency the handlers need; it owns the store, clock, and gateway.
#[derive(Clone)]
pub struct AppState {
    /// The booking lifecycle engine
    pub engine: Arc<BookingEngine>,
}

impl AppState {
    /// Create a new application state around an engine.
    #[must_use]
    pub const fn new(engine: Arc<BookingEngine>) -> Self {
        Self { engine }
    }
}
