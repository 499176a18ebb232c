//! Application lifecycle management and graceful shutdown.
//!
//! When a shutdown signal is received (Ctrl+C or SIGTERM):
//! 1. The HTTP server stops accepting new connections
//! 2. The expiry reclaimer is signalled to stop
//! 3. Both are awaited with a bounded timeout
//! 4. Clean exit

use cinebook_core::reclaimer::ReclaimerHandle;
use std::time::Duration;
use tracing::info;

/// Running application: HTTP server plus the background reclaimer.
pub struct Application {
    /// TCP listener for the HTTP server
    listener: tokio::net::TcpListener,
    /// Axum router with all HTTP routes
    router: axum::Router,
    /// Stop handle for the running reclaimer
    reclaimer: ReclaimerHandle,
    /// How long shutdown may take before giving up
    shutdown_timeout: Duration,
}

impl Application {
    /// Create a new application instance.
    #[must_use]
    pub const fn new(
        listener: tokio::net::TcpListener,
        router: axum::Router,
        reclaimer: ReclaimerHandle,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            listener,
            router,
            reclaimer,
            shutdown_timeout,
        }
    }

    /// Run the application until a shutdown signal is received.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP server fails.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("HTTP server listening for requests");
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server stopped, initiating graceful shutdown...");
        self.reclaimer.shutdown(self.shutdown_timeout).await;

        info!("Graceful shutdown complete");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        () = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
