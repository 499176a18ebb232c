//! The booking engine facade.
//!
//! Bundles the reservation manager, payment finalizer, and the read /
//! cancel paths behind one handle that the HTTP layer (or any other
//! driver) shares. Reads and finalize attempts run lazy expiry before
//! any further logic, so callers never observe a hold past its
//! deadline as live.

use crate::config::EngineConfig;
use crate::environment::Clock;
use crate::error::{Error, Result};
use crate::gateway::PaymentGateway;
use crate::payment::PaymentFinalizer;
use crate::reclaimer::ExpiryReclaimer;
use crate::reservation::{HoldConfirmation, HoldRequest, ReservationManager};
use crate::store::MemoryStore;
use crate::types::{
    Account, AccountId, Booking, BookingId, BookingStatus, CardDetails, Payment, PaymentProgress,
    Seat, Showtime, ShowtimeId,
};
use crate::{ledger, state_machine};
use std::sync::Arc;

/// A booking with its showtime and owning account resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingView {
    /// The booking itself
    pub booking: Booking,
    /// The showtime the seats belong to
    pub showtime: Showtime,
    /// The account that owns the booking
    pub account: Account,
}

/// Who is asking for an explicit cancellation
#[derive(Clone, Copy, Debug)]
pub struct CancelRequester {
    /// The requesting account
    pub account_id: AccountId,
    /// Elevated privilege (operators) may cancel any booking
    pub elevated: bool,
}

/// Availability of one layout seat, derived from the ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeatAvailability {
    /// The layout seat
    pub seat: Seat,
    /// Whether no active claim holds it right now
    pub available: bool,
}

/// Shared entry point into the booking lifecycle
pub struct BookingEngine {
    store: Arc<MemoryStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    reservations: ReservationManager,
    payments: PaymentFinalizer,
}

impl BookingEngine {
    /// Wires the engine's components around one store and clock
    #[must_use]
    pub fn new(
        store: Arc<MemoryStore>,
        clock: Arc<dyn Clock>,
        gateway: Arc<dyn PaymentGateway>,
        config: EngineConfig,
    ) -> Self {
        let reservations = ReservationManager::new(store.clone(), clock.clone(), &config);
        let payments = PaymentFinalizer::new(store.clone(), clock.clone(), gateway);
        Self {
            store,
            clock,
            config,
            reservations,
            payments,
        }
    }

    /// The backing store, for seeding showtime layouts
    #[must_use]
    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }

    /// Builds the background reclaimer for this engine's store
    #[must_use]
    pub fn reclaimer(&self) -> ExpiryReclaimer {
        ExpiryReclaimer::new(self.store.clone(), self.clock.clone(), &self.config)
    }

    /// Creates a time-bounded hold. See [`ReservationManager::create_booking`].
    ///
    /// # Errors
    ///
    /// Propagates the reservation manager's errors.
    pub fn create_booking(&self, request: HoldRequest) -> Result<HoldConfirmation> {
        self.reservations.create_booking(request)
    }

    /// Finalizes a hold into a confirmed sale. See
    /// [`PaymentFinalizer::complete_booking`].
    ///
    /// # Errors
    ///
    /// Propagates the payment finalizer's errors.
    pub async fn complete_booking(
        &self,
        booking_id: BookingId,
        card: &CardDetails,
    ) -> Result<(Booking, Payment)> {
        self.payments.complete_booking(booking_id, card).await
    }

    /// Reads a booking with its showtime and identity resolved.
    ///
    /// Reading is an access: a lapsed hold is lazily cancelled (and its
    /// seats released) before the view is built, and that cancellation
    /// commits even though this is a read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BookingNotFound`] if the booking does not exist.
    pub fn get_booking(&self, booking_id: BookingId) -> Result<BookingView> {
        let now = self.clock.now();
        self.store.unit_of_work(|data| {
            state_machine::expire_if_due(data, booking_id, now)?;

            let booking = data.booking(booking_id)?.clone();
            let showtime = data.showtime(booking.showtime_id).map_err(|_| {
                Error::Internal(format!("booking {booking_id} references a missing showtime"))
            })?;
            let account = data.accounts.get(&booking.account_id).ok_or_else(|| {
                Error::Internal(format!("booking {booking_id} references a missing account"))
            })?;

            Ok(BookingView {
                showtime: showtime.clone(),
                account: account.clone(),
                booking,
            })
        })
    }

    /// Explicitly cancels a temporary booking and releases its seats.
    ///
    /// # Errors
    ///
    /// - [`Error::BookingNotFound`] if the booking does not exist
    /// - [`Error::Forbidden`] if the requester neither owns the booking
    ///   nor holds elevated privilege
    /// - [`Error::InvalidState`] if the booking is not a live hold
    pub fn cancel_booking(&self, booking_id: BookingId, requester: CancelRequester) -> Result<()> {
        self.store.unit_of_work(|data| {
            let booking = data.booking(booking_id)?;
            if booking.account_id != requester.account_id && !requester.elevated {
                return Err(Error::Forbidden(booking_id));
            }

            // An expired-but-unswept hold is still `Temporary` and may
            // be cancelled like any other; only terminal states refuse.
            if booking.status != BookingStatus::Temporary {
                return Err(Error::InvalidState {
                    status: booking.status,
                    action: "cancel",
                });
            }

            ledger::release_booking(data, booking_id);
            let booking = data.booking_mut(booking_id)?;
            state_machine::transition(booking, BookingStatus::Cancelled, "cancel")?;
            booking.payment_status = PaymentProgress::Failed;
            Ok(())
        })?;

        tracing::info!(booking_id = %booking_id, "booking cancelled by request");
        Ok(())
    }

    /// Per-seat availability for a showtime, derived from the ledger
    /// with the active-claim predicate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShowtimeNotFound`] if the showtime does not
    /// exist.
    pub fn seat_availability(&self, showtime_id: ShowtimeId) -> Result<Vec<SeatAvailability>> {
        let now = self.clock.now();
        self.store.read(|data| {
            let showtime = data.showtime(showtime_id)?;
            Ok(showtime
                .seats
                .iter()
                .map(|seat| SeatAvailability {
                    seat: seat.clone(),
                    available: ledger::active_claim(data, showtime_id, seat.id, now).is_none(),
                })
                .collect())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::environment::FixedClock;
    use crate::gateway::LocalPaymentGateway;
    use crate::types::{
        BookingIdentity, GuestContact, Money, PaymentProgress, SeatId, SeatKind,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 19, 15, 0).single().unwrap()
    }

    fn engine() -> (BookingEngine, ShowtimeId, Vec<SeatId>) {
        let store = Arc::new(MemoryStore::new());
        let seat_ids: Vec<SeatId> = (0..3).map(|_| SeatId::new()).collect();
        let seats = seat_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                #[allow(clippy::cast_possible_truncation)]
                let number = i as u32 + 1;
                Seat::new(
                    *id,
                    "E".to_string(),
                    number,
                    SeatKind::Accessible,
                    Money::from_cents(900),
                )
            })
            .collect();
        let showtime = Showtime::new(
            ShowtimeId::new(),
            "Ikiru".to_string(),
            "Screen 6".to_string(),
            fixed_now() + Duration::hours(4),
            seats,
        );
        let showtime_id = showtime.id;
        store.insert_showtime(showtime).unwrap();

        let engine = BookingEngine::new(
            store,
            Arc::new(FixedClock::new(fixed_now())),
            LocalPaymentGateway::shared(),
            EngineConfig::default(),
        );
        (engine, showtime_id, seat_ids)
    }

    fn hold(engine: &BookingEngine, showtime_id: ShowtimeId, seat_id: SeatId) -> BookingId {
        engine
            .create_booking(HoldRequest {
                showtime_id,
                seat_ids: vec![seat_id],
                total_amount: Money::from_cents(900),
                identity: BookingIdentity::Guest(GuestContact {
                    name: "Kanji Watanabe".to_string(),
                    email: "watanabe@example.com".to_string(),
                    phone: "555-0104".to_string(),
                }),
            })
            .unwrap()
            .booking_id
    }

    fn backdate(engine: &BookingEngine, booking_id: BookingId) {
        engine
            .store()
            .unit_of_work(|data| {
                let booking = data.booking_mut(booking_id)?;
                booking.expires_at = Some(fixed_now() - Duration::seconds(1));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn get_booking_resolves_showtime_and_identity() {
        let (engine, showtime_id, seat_ids) = engine();
        let booking_id = hold(&engine, showtime_id, seat_ids[0]);

        let view = engine.get_booking(booking_id).unwrap();
        assert_eq!(view.booking.id, booking_id);
        assert_eq!(view.showtime.id, showtime_id);
        assert_eq!(view.account.email, "watanabe@example.com");
        assert_eq!(view.booking.status, BookingStatus::Temporary);
    }

    #[test]
    fn get_booking_lazily_cancels_a_lapsed_hold() {
        let (engine, showtime_id, seat_ids) = engine();
        let booking_id = hold(&engine, showtime_id, seat_ids[0]);
        backdate(&engine, booking_id);

        let view = engine.get_booking(booking_id).unwrap();
        assert_eq!(view.booking.status, BookingStatus::Cancelled);
        assert_eq!(view.booking.payment_status, PaymentProgress::Failed);

        // The lazy cancellation committed: the seat is free again.
        let availability = engine.seat_availability(showtime_id).unwrap();
        assert!(availability.iter().all(|seat| seat.available));
    }

    #[test]
    fn owner_can_cancel_a_live_hold() {
        let (engine, showtime_id, seat_ids) = engine();
        let booking_id = hold(&engine, showtime_id, seat_ids[0]);
        let owner = engine.get_booking(booking_id).unwrap().account.id;

        engine
            .cancel_booking(
                booking_id,
                CancelRequester {
                    account_id: owner,
                    elevated: false,
                },
            )
            .unwrap();

        let view = engine.get_booking(booking_id).unwrap();
        assert_eq!(view.booking.status, BookingStatus::Cancelled);
        assert!(engine.seat_availability(showtime_id).unwrap()[0].available);
    }

    #[test]
    fn stranger_cannot_cancel_but_elevated_can() {
        let (engine, showtime_id, seat_ids) = engine();
        let booking_id = hold(&engine, showtime_id, seat_ids[0]);

        let stranger = CancelRequester {
            account_id: AccountId::new(),
            elevated: false,
        };
        assert!(matches!(
            engine.cancel_booking(booking_id, stranger),
            Err(Error::Forbidden(_))
        ));

        let operator = CancelRequester {
            account_id: AccountId::new(),
            elevated: true,
        };
        engine.cancel_booking(booking_id, operator).unwrap();
    }

    #[tokio::test]
    async fn cancelling_a_completed_booking_changes_nothing() {
        let (engine, showtime_id, seat_ids) = engine();
        let booking_id = hold(&engine, showtime_id, seat_ids[0]);
        let card = CardDetails {
            number: "4242424242424242".to_string(),
            expiry: "12/25".to_string(),
            cvv: "123".to_string(),
        };
        engine.complete_booking(booking_id, &card).await.unwrap();
        let owner = engine.get_booking(booking_id).unwrap().account.id;

        let err = engine
            .cancel_booking(
                booking_id,
                CancelRequester {
                    account_id: owner,
                    elevated: false,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                status: BookingStatus::Completed,
                ..
            }
        ));

        // Payment and seat state are untouched.
        let view = engine.get_booking(booking_id).unwrap();
        assert_eq!(view.booking.payment_status, PaymentProgress::Completed);
        assert!(!engine.seat_availability(showtime_id).unwrap()[0].available);
        engine.store().read(|data| assert_eq!(data.payments.len(), 1));
    }

    #[test]
    fn availability_reflects_active_claims_only() {
        let (engine, showtime_id, seat_ids) = engine();
        let booking_id = hold(&engine, showtime_id, seat_ids[1]);

        let availability = engine.seat_availability(showtime_id).unwrap();
        let by_id = |id: SeatId| {
            availability
                .iter()
                .find(|entry| entry.seat.id == id)
                .unwrap()
                .available
        };
        assert!(by_id(seat_ids[0]));
        assert!(!by_id(seat_ids[1]));
        assert!(by_id(seat_ids[2]));

        backdate(&engine, booking_id);
        // The stale claim no longer counts, even before any sweep.
        assert!(engine.seat_availability(showtime_id).unwrap()[1].available);
    }
}
