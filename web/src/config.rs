//! Configuration management for the booking server.
//!
//! Loads configuration from environment variables with sensible
//! defaults.

use cinebook_core::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Booking engine timing configuration
    pub engine: TimingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Booking engine timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Hold duration in seconds before a temporary booking expires
    pub hold_duration_secs: i64,
    /// Interval in seconds between reclaimer sweeps
    pub reclaim_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
                shutdown_timeout: env::var("SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            engine: TimingConfig {
                hold_duration_secs: env::var("HOLD_DURATION_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(EngineConfig::DEFAULT_HOLD_SECS),
                reclaim_interval_secs: env::var("RECLAIM_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(EngineConfig::DEFAULT_RECLAIM_SECS),
            },
        }
    }

    /// The engine configuration derived from the loaded timings
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_hold_duration(chrono::Duration::seconds(self.engine.hold_duration_secs))
            .with_reclaim_interval(std::time::Duration::from_secs(
                self.engine.reclaim_interval_secs,
            ))
    }
}
