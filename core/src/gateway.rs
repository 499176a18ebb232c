//! Payment gateway boundary.
//!
//! Payment capture is a replaceable external collaborator. The bundled
//! [`LocalPaymentGateway`] settles everything locally so the engine can
//! run without a processor; a real integration implements the same
//! trait. Gateway calls happen *between* units of work, never inside
//! one, so processor latency can never hold a seat-claim transaction
//! open.

use crate::types::{CardSummary, Money};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Gateway result
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures a payment gateway can report
#[derive(Debug, Clone)]
pub enum GatewayError {
    /// The processor declined the charge
    Declined {
        /// Decline reason
        reason: String,
    },
    /// The processor did not answer in time
    Timeout,
    /// Any other processor failure
    Other {
        /// Error message
        message: String,
    },
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Declined { reason } => write!(f, "charge declined: {reason}"),
            Self::Timeout => write!(f, "gateway timeout"),
            Self::Other { message } => write!(f, "gateway error: {message}"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// A settled charge
#[derive(Debug, Clone)]
pub struct Charge {
    /// Unique transaction identifier produced by the gateway
    pub transaction_id: String,
    /// Amount captured
    pub amount: Money,
}

/// Abstraction over payment processors.
pub trait PaymentGateway: Send + Sync {
    /// Capture a charge against the given instrument.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the charge is declined or the
    /// processor fails.
    fn charge(
        &self,
        amount: Money,
        card: &CardSummary,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<Charge>> + Send>>;
}

/// Local stand-in gateway that approves every charge.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalPaymentGateway;

impl LocalPaymentGateway {
    /// Creates a new local gateway
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn PaymentGateway> {
        Arc::new(Self::new())
    }
}

impl PaymentGateway for LocalPaymentGateway {
    fn charge(
        &self,
        amount: Money,
        card: &CardSummary,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<Charge>> + Send>> {
        let last_four = card.last_four.clone();
        Box::pin(async move {
            let transaction_id = format!("txn_{}", uuid::Uuid::new_v4().simple());

            tracing::info!(
                amount = amount.cents(),
                last_four = %last_four,
                transaction_id = %transaction_id,
                "local gateway captured charge"
            );

            Ok(Charge {
                transaction_id,
                amount,
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_gateway_approves_and_mints_transaction_ids() {
        let gateway = LocalPaymentGateway::new();
        let card = CardSummary {
            last_four: "4242".to_string(),
            expiry_month: 12,
            expiry_year: 25,
        };

        let first = gateway.charge(Money::from_cents(3000), &card).await.unwrap();
        let second = gateway.charge(Money::from_cents(3000), &card).await.unwrap();

        assert!(first.transaction_id.starts_with("txn_"));
        assert_ne!(first.transaction_id, second.transaction_id);
        assert_eq!(first.amount, Money::from_cents(3000));
    }
}
