//! Payment finalizer: converts a valid, unexpired hold into a
//! confirmed sale.
//!
//! The flow runs as a sequence of bounded units of work with the
//! instrument validation and the gateway charge between them, so
//! processor latency never holds a seat-claim transaction open:
//!
//! 1. readiness unit: load the booking, lazily cancel it if the hold
//!    deadline has passed (committing that cancellation), and reject
//!    non-temporary bookings;
//! 2. instrument validation and gateway charge, outside any unit;
//! 3. completing unit: re-verify the booking is still a live hold,
//!    mint a unique ticket number, create the payment record, and flip
//!    the booking to `Completed` in one commit.
//!
//! The re-verification in step 3 is what makes this path safe against
//! a reclaimer sweep that fires between the charge and the commit.

use crate::environment::Clock;
use crate::error::{Error, Result};
use crate::gateway::PaymentGateway;
use crate::state_machine;
use crate::store::{MemoryStore, StoreData};
use crate::types::{
    Booking, BookingId, BookingStatus, CardDetails, Money, Payment, PaymentId, PaymentProgress,
    PaymentStatus,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;

/// Prefix every ticket number carries
pub const TICKET_PREFIX: &str = "TKT";
/// Length of the random ticket-number suffix
pub const TICKET_SUFFIX_LEN: usize = 6;
/// Alphabet for ticket-number suffixes
const TICKET_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Collision-retry bound before giving up with an internal error
const MAX_TICKET_ATTEMPTS: usize = 8;

/// Outcome of a unit of work that may commit a lazy cancellation
enum Readiness {
    /// The hold had lapsed; its cancellation was committed
    Expired,
    /// The booking is a live hold for this amount
    Ready(Money),
}

/// Outcome of the completing unit of work
enum Completion {
    /// The hold lapsed between the charge and the commit
    Expired,
    /// Booking and payment after the irreversible commit
    Done(Box<(Booking, Payment)>),
}

/// Atomically finalizes holds into confirmed sales
pub struct PaymentFinalizer {
    store: Arc<MemoryStore>,
    clock: Arc<dyn Clock>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentFinalizer {
    /// Creates a new `PaymentFinalizer`
    #[must_use]
    pub fn new(
        store: Arc<MemoryStore>,
        clock: Arc<dyn Clock>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            store,
            clock,
            gateway,
        }
    }

    /// Completes a booking with the given payment instrument.
    ///
    /// # Errors
    ///
    /// - [`Error::BookingNotFound`] if the booking does not exist
    /// - [`Error::BookingExpired`] if the hold deadline has passed; the
    ///   booking is left `Cancelled` with its seats released
    /// - [`Error::InvalidState`] if the booking is already completed or
    ///   cancelled
    /// - [`Error::PaymentFailed`] if the instrument fails validation or
    ///   the gateway declines; the booking stays `Temporary` with
    ///   `payment_status = Failed` and remains retryable
    pub async fn complete_booking(
        &self,
        booking_id: BookingId,
        card: &CardDetails,
    ) -> Result<(Booking, Payment)> {
        let now = self.clock.now();
        let readiness = self.store.unit_of_work(|data| {
            if state_machine::expire_if_due(data, booking_id, now)? {
                return Ok(Readiness::Expired);
            }
            let booking = data.booking(booking_id)?;
            if booking.status != BookingStatus::Temporary {
                return Err(Error::InvalidState {
                    status: booking.status,
                    action: "pay for",
                });
            }
            Ok(Readiness::Ready(booking.total_amount))
        })?;
        let amount = match readiness {
            Readiness::Expired => {
                tracing::info!(booking_id = %booking_id, "payment refused: hold expired");
                return Err(Error::BookingExpired(booking_id));
            }
            Readiness::Ready(amount) => amount,
        };

        let summary = match card.validate() {
            Ok(summary) => summary,
            Err(reason) => return Err(self.record_failed_attempt(booking_id, reason)),
        };

        let charge = match self.gateway.charge(amount, &summary).await {
            Ok(charge) => charge,
            Err(err) => return Err(self.record_failed_attempt(booking_id, err.to_string())),
        };

        let settled_at = self.clock.now();
        let completion = self.store.unit_of_work(|data| {
            if state_machine::expire_if_due(data, booking_id, settled_at)? {
                return Ok(Completion::Expired);
            }
            let booking = data.booking(booking_id)?;
            // The reclaimer may have cancelled the hold while the charge
            // was in flight; that is an expiry from the caller's view.
            if booking.status == BookingStatus::Cancelled {
                return Ok(Completion::Expired);
            }
            if booking.status != BookingStatus::Temporary {
                return Err(Error::InvalidState {
                    status: booking.status,
                    action: "pay for",
                });
            }

            let ticket_number = mint_ticket_number(data, settled_at)?;
            let payment = Payment {
                id: PaymentId::new(),
                booking_id,
                amount,
                card: summary.clone(),
                status: PaymentStatus::Completed,
                transaction_id: charge.transaction_id.clone(),
                processed_at: settled_at,
            };
            data.payments.insert(payment.id, payment.clone());
            data.issued_tickets.insert(ticket_number.clone());

            let booking = data.booking_mut(booking_id)?;
            state_machine::transition(booking, BookingStatus::Completed, "complete")?;
            booking.payment_status = PaymentProgress::Completed;
            booking.ticket_number = Some(ticket_number);

            Ok(Completion::Done(Box::new((booking.clone(), payment))))
        })?;

        match completion {
            Completion::Expired => {
                tracing::warn!(
                    booking_id = %booking_id,
                    transaction_id = %charge.transaction_id,
                    "hold expired between charge and commit"
                );
                Err(Error::BookingExpired(booking_id))
            }
            Completion::Done(done) => {
                let (booking, payment) = *done;
                tracing::info!(
                    booking_id = %booking_id,
                    ticket_number = booking.ticket_number.as_deref().unwrap_or_default(),
                    transaction_id = %payment.transaction_id,
                    "booking completed"
                );
                Ok((booking, payment))
            }
        }
    }

    /// Marks a failed attempt on the booking and produces the error.
    ///
    /// The booking stays `Temporary`: still retryable with a valid
    /// instrument, still eligible for reclamation.
    fn record_failed_attempt(&self, booking_id: BookingId, reason: String) -> Error {
        let marked = self.store.unit_of_work(|data| {
            let booking = data.booking_mut(booking_id)?;
            if booking.status == BookingStatus::Temporary {
                booking.payment_status = PaymentProgress::Failed;
            }
            Ok(())
        });
        if let Err(err) = marked {
            tracing::warn!(booking_id = %booking_id, error = %err, "could not record failed attempt");
        }
        tracing::warn!(booking_id = %booking_id, reason = %reason, "payment attempt failed");
        Error::PaymentFailed { reason }
    }
}

/// Mints a ticket number unique across everything ever issued.
///
/// Format: `TKT-YYYYMMDD-XXXXXX` with an uppercase alphanumeric
/// suffix. Collisions against the issued set are detected and retried
/// a bounded number of times.
fn mint_ticket_number(data: &StoreData, now: DateTime<Utc>) -> Result<String> {
    let date = now.format("%Y%m%d");
    let mut rng = rand::thread_rng();
    for _ in 0..MAX_TICKET_ATTEMPTS {
        let suffix: String = (0..TICKET_SUFFIX_LEN)
            .map(|_| TICKET_CHARSET[rng.gen_range(0..TICKET_CHARSET.len())] as char)
            .collect();
        let candidate = format!("{TICKET_PREFIX}-{date}-{suffix}");
        if !data.issued_tickets.contains(&candidate) {
            return Ok(candidate);
        }
    }
    Err(Error::Internal(
        "could not mint a unique ticket number".to_string(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::environment::FixedClock;
    use crate::gateway::{Charge, GatewayError, GatewayResult, LocalPaymentGateway};
    use crate::reservation::{HoldRequest, ReservationManager};
    use crate::types::{
        BookingIdentity, CardSummary, GuestContact, Seat, SeatId, SeatKind, Showtime, ShowtimeId,
    };
    use chrono::{Duration, TimeZone};
    use std::future::Future;
    use std::pin::Pin;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 20, 30, 0).single().unwrap()
    }

    fn card(number: &str, expiry: &str, cvv: &str) -> CardDetails {
        CardDetails {
            number: number.to_string(),
            expiry: expiry.to_string(),
            cvv: cvv.to_string(),
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        finalizer: PaymentFinalizer,
        booking_id: BookingId,
        showtime_id: ShowtimeId,
        seat_id: SeatId,
    }

    fn fixture_with_gateway(gateway: Arc<dyn PaymentGateway>) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(fixed_now()));
        let seat_id = SeatId::new();
        let showtime = Showtime::new(
            ShowtimeId::new(),
            "Playtime".to_string(),
            "Screen 5".to_string(),
            fixed_now() + Duration::hours(2),
            vec![Seat::new(
                seat_id,
                "C".to_string(),
                7,
                SeatKind::Regular,
                Money::from_cents(1400),
            )],
        );
        let showtime_id = showtime.id;
        store.insert_showtime(showtime).unwrap();

        let manager =
            ReservationManager::new(store.clone(), clock.clone(), &EngineConfig::default());
        let hold = manager
            .create_booking(HoldRequest {
                showtime_id,
                seat_ids: vec![seat_id],
                total_amount: Money::from_cents(1400),
                identity: BookingIdentity::Guest(GuestContact {
                    name: "Jacques Tati".to_string(),
                    email: "tati@example.com".to_string(),
                    phone: "555-0102".to_string(),
                }),
            })
            .unwrap();

        let finalizer = PaymentFinalizer::new(store.clone(), clock, gateway);
        Fixture {
            store,
            finalizer,
            booking_id: hold.booking_id,
            showtime_id,
            seat_id,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_gateway(LocalPaymentGateway::shared())
    }

    fn backdate(fixture: &Fixture) {
        fixture
            .store
            .unit_of_work(|data| {
                let booking = data.booking_mut(fixture.booking_id)?;
                booking.expires_at = Some(fixed_now() - Duration::seconds(1));
                Ok(())
            })
            .unwrap();
    }

    #[tokio::test]
    async fn valid_card_completes_the_booking() {
        let fx = fixture();
        let (booking, payment) = fx
            .finalizer
            .complete_booking(fx.booking_id, &card("4242424242424242", "12/25", "123"))
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Completed);
        assert_eq!(booking.payment_status, PaymentProgress::Completed);
        assert!(booking.expires_at.is_none());
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.amount, Money::from_cents(1400));
        assert_eq!(payment.card.last_four, "4242");
        assert_eq!(payment.booking_id, fx.booking_id);

        let ticket = booking.ticket_number.unwrap();
        assert_eq!(ticket, format!("TKT-20260806-{}", &ticket[13..]));
        assert_eq!(ticket.len(), "TKT-20260806-".len() + TICKET_SUFFIX_LEN);
        assert!(ticket[13..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        // The seat claim is untouched by completion.
        fx.store.read(|data| {
            assert_eq!(data.claims[&fx.showtime_id][&fx.seat_id], fx.booking_id);
            assert!(data.issued_tickets.contains(&ticket));
        });
    }

    #[tokio::test]
    async fn expired_hold_is_cancelled_and_never_completes() {
        let fx = fixture();
        backdate(&fx);

        let err = fx
            .finalizer
            .complete_booking(fx.booking_id, &card("4242424242424242", "12/25", "123"))
            .await
            .unwrap_err();
        assert_eq!(err, Error::BookingExpired(fx.booking_id));

        fx.store.read(|data| {
            let booking = data.booking(fx.booking_id).unwrap();
            assert_eq!(booking.status, BookingStatus::Cancelled);
            assert_eq!(booking.payment_status, PaymentProgress::Failed);
            assert!(data.claims[&fx.showtime_id].get(&fx.seat_id).is_none());
            assert!(data.payments.is_empty());
        });
    }

    #[tokio::test]
    async fn completed_booking_rejects_a_second_payment() {
        let fx = fixture();
        let good = card("4242424242424242", "12/25", "123");
        fx.finalizer
            .complete_booking(fx.booking_id, &good)
            .await
            .unwrap();

        let err = fx
            .finalizer
            .complete_booking(fx.booking_id, &good)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                status: BookingStatus::Completed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let fx = fixture();
        let err = fx
            .finalizer
            .complete_booking(BookingId::new(), &card("4242424242424242", "12/25", "123"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BookingNotFound(_)));
    }

    #[tokio::test]
    async fn fifteen_digit_card_fails_but_booking_stays_retryable() {
        let fx = fixture();
        let err = fx
            .finalizer
            .complete_booking(fx.booking_id, &card("424242424242424", "12/25", "123"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PaymentFailed { .. }));

        fx.store.read(|data| {
            let booking = data.booking(fx.booking_id).unwrap();
            assert_eq!(booking.status, BookingStatus::Temporary);
            assert_eq!(booking.payment_status, PaymentProgress::Failed);
            assert!(booking.expires_at.is_some());
            assert!(data.payments.is_empty());
        });

        // Retry with a valid instrument succeeds.
        let (booking, _) = fx
            .finalizer
            .complete_booking(fx.booking_id, &card("4242424242424242", "12/25", "123"))
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn declined_charge_marks_the_attempt_failed() {
        struct DecliningGateway;
        impl PaymentGateway for DecliningGateway {
            fn charge(
                &self,
                _amount: Money,
                _card: &CardSummary,
            ) -> Pin<Box<dyn Future<Output = GatewayResult<Charge>> + Send>> {
                Box::pin(async {
                    Err(GatewayError::Declined {
                        reason: "insufficient funds".to_string(),
                    })
                })
            }
        }

        let fx = fixture_with_gateway(Arc::new(DecliningGateway));
        let err = fx
            .finalizer
            .complete_booking(fx.booking_id, &card("4242424242424242", "12/25", "123"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PaymentFailed { .. }));

        fx.store.read(|data| {
            let booking = data.booking(fx.booking_id).unwrap();
            assert_eq!(booking.status, BookingStatus::Temporary);
            assert_eq!(booking.payment_status, PaymentProgress::Failed);
        });
    }

    #[test]
    fn minted_ticket_matches_documented_format() {
        let data = StoreData::default();
        let ticket = mint_ticket_number(&data, fixed_now()).unwrap();
        assert!(ticket.starts_with("TKT-20260806-"));
        assert_eq!(ticket.len(), "TKT-20260806-".len() + TICKET_SUFFIX_LEN);
    }

    #[test]
    fn minted_tickets_are_unique_across_the_issued_set() {
        let mut data = StoreData::default();
        for _ in 0..256 {
            let ticket = mint_ticket_number(&data, fixed_now()).unwrap();
            assert!(data.issued_tickets.insert(ticket));
        }
    }
}
