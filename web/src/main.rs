//! Cinebook booking server.
//!
//! Wires the booking engine around the in-memory store, seeds a demo
//! showtime layout, starts the expiry reclaimer, and serves the HTTP
//! API until Ctrl+C or SIGTERM.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cinebook-web
//! ```

use cinebook_core::engine::BookingEngine;
use cinebook_core::environment::SystemClock;
use cinebook_core::gateway::LocalPaymentGateway;
use cinebook_core::store::MemoryStore;
use cinebook_core::types::{Money, Seat, SeatId, SeatKind, Showtime, ShowtimeId};
use cinebook_web::{Application, AppState, Config, build_router};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cinebook_core=debug,cinebook_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cinebook booking server");

    // Load configuration
    let config = Config::from_env();
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        hold_duration_secs = config.engine.hold_duration_secs,
        reclaim_interval_secs = config.engine.reclaim_interval_secs,
        "Configuration loaded"
    );

    // Wire the engine around one store, clock, and gateway
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(BookingEngine::new(
        store.clone(),
        Arc::new(SystemClock),
        LocalPaymentGateway::shared(),
        config.engine_config(),
    ));

    // Seed the demo showtime layout (read-only input to the engine)
    let showtime = demo_showtime();
    let showtime_id = showtime.id;
    let seat_count = showtime.seats.len();
    store.insert_showtime(showtime)?;
    tracing::info!(%showtime_id, seat_count, "Demo showtime seeded");

    // Start the background reclaimer
    let reclaimer = engine.reclaimer().spawn();
    tracing::info!("Expiry reclaimer started");

    // Serve
    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "Binding HTTP server");

    let router = build_router(AppState::new(engine));
    let app = Application::new(
        listener,
        router,
        reclaimer,
        Duration::from_secs(config.server.shutdown_timeout),
    );
    app.run().await
}

/// Builds the demo layout: rows A-E with eight seats each. Row A is
/// VIP, seats E7/E8 are accessible.
fn demo_showtime() -> Showtime {
    let mut seats = Vec::with_capacity(40);
    for (row_index, row) in ["A", "B", "C", "D", "E"].iter().enumerate() {
        for number in 1..=8u32 {
            let kind = match (row_index, number) {
                (0, _) => SeatKind::Vip,
                (4, 7 | 8) => SeatKind::Accessible,
                _ => SeatKind::Regular,
            };
            let price = match kind {
                SeatKind::Vip => Money::from_cents(2500),
                SeatKind::Regular | SeatKind::Accessible => Money::from_cents(1500),
            };
            seats.push(Seat::new(
                SeatId::new(),
                (*row).to_string(),
                number,
                kind,
                price,
            ));
        }
    }
    Showtime::new(
        ShowtimeId::new(),
        "The Passenger".to_string(),
        "Screen 1".to_string(),
        chrono::Utc::now() + chrono::Duration::hours(3),
        seats,
    )
}
