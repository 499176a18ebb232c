//! End-to-end booking lifecycle against the engine facade.

#![allow(clippy::unwrap_used)]

use cinebook_core::config::EngineConfig;
use cinebook_core::engine::{BookingEngine, CancelRequester};
use cinebook_core::environment::FixedClock;
use cinebook_core::error::Error;
use cinebook_core::gateway::LocalPaymentGateway;
use cinebook_core::reservation::HoldRequest;
use cinebook_core::store::MemoryStore;
use cinebook_core::types::{
    BookingIdentity, BookingStatus, CardDetails, GuestContact, Money, PaymentProgress,
    PaymentStatus, Seat, SeatId, SeatKind, Showtime, ShowtimeId,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 6, 17, 45, 0).single().unwrap()
}

fn seeded_engine() -> (BookingEngine, ShowtimeId, Vec<SeatId>) {
    let store = Arc::new(MemoryStore::new());
    let seat_ids: Vec<SeatId> = (0..5).map(|_| SeatId::new()).collect();
    let seats = seat_ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            #[allow(clippy::cast_possible_truncation)]
            let number = i as u32 + 1;
            let kind = match i {
                0 => SeatKind::Vip,
                4 => SeatKind::Accessible,
                _ => SeatKind::Regular,
            };
            Seat::new(*id, "B".to_string(), number, kind, Money::from_cents(1600))
        })
        .collect();
    let showtime = Showtime::new(
        ShowtimeId::new(),
        "Late Spring".to_string(),
        "Screen 2".to_string(),
        fixed_now() + Duration::hours(2),
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

fn guest(email: &str) -> BookingIdentity {
    BookingIdentity::Guest(GuestContact {
        name: "Setsuko Hara".to_string(),
        email: email.to_string(),
        phone: "555-0110".to_string(),
    })
}

fn good_card() -> CardDetails {
    CardDetails {
        number: "4242424242424242".to_string(),
        expiry: "12/25".to_string(),
        cvv: "123".to_string(),
    }
}

#[tokio::test]
async fn hold_pay_and_read_back_a_confirmed_sale() {
    let (engine, showtime_id, seat_ids) = seeded_engine();

    let hold = engine
        .create_booking(HoldRequest {
            showtime_id,
            seat_ids: vec![seat_ids[0], seat_ids[1]],
            total_amount: Money::from_cents(3200),
            identity: guest("hara@example.com"),
        })
        .unwrap();
    assert_eq!(hold.expires_at, fixed_now() + Duration::seconds(600));

    // The two seats are off the market, the rest are not.
    let availability = engine.seat_availability(showtime_id).unwrap();
    let taken = availability.iter().filter(|s| !s.available).count();
    assert_eq!(taken, 2);

    let (booking, payment) = engine
        .complete_booking(hold.booking_id, &good_card())
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Completed);
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.amount, Money::from_cents(3200));

    let view = engine.get_booking(hold.booking_id).unwrap();
    assert_eq!(view.booking.status, BookingStatus::Completed);
    assert_eq!(view.booking.ticket_number, booking.ticket_number);
    assert_eq!(view.showtime.film, "Late Spring");
    assert_eq!(view.account.email, "hara@example.com");
    assert!(view.account.is_guest);

    // Completed seats stay claimed.
    let availability = engine.seat_availability(showtime_id).unwrap();
    assert_eq!(availability.iter().filter(|s| !s.available).count(), 2);
}

#[tokio::test]
async fn two_completions_issue_distinct_ticket_numbers() {
    let (engine, showtime_id, seat_ids) = seeded_engine();

    let mut tickets = Vec::new();
    for (i, seat) in seat_ids.iter().take(2).enumerate() {
        let hold = engine
            .create_booking(HoldRequest {
                showtime_id,
                seat_ids: vec![*seat],
                total_amount: Money::from_cents(1600),
                identity: guest(&format!("guest{i}@example.com")),
            })
            .unwrap();
        let (booking, _) = engine
            .complete_booking(hold.booking_id, &good_card())
            .await
            .unwrap();
        tickets.push(booking.ticket_number.unwrap());
    }

    assert_ne!(tickets[0], tickets[1]);
    assert!(tickets.iter().all(|t| t.starts_with("TKT-20260806-")));
}

#[tokio::test]
async fn abandoned_hold_is_reclaimed_and_the_seat_resold() {
    let (engine, showtime_id, seat_ids) = seeded_engine();

    let hold = engine
        .create_booking(HoldRequest {
            showtime_id,
            seat_ids: vec![seat_ids[2]],
            total_amount: Money::from_cents(1600),
            identity: guest("walkaway@example.com"),
        })
        .unwrap();

    engine
        .store()
        .unit_of_work(|data| {
            let booking = data.booking_mut(hold.booking_id)?;
            booking.expires_at = Some(fixed_now() - Duration::seconds(1));
            Ok(())
        })
        .unwrap();

    let report = engine.reclaimer().sweep_once();
    assert_eq!(report.cancelled, 1);

    // Paying for the reclaimed hold is refused.
    let err = engine
        .complete_booking(hold.booking_id, &good_card())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidState {
            status: BookingStatus::Cancelled,
            ..
        }
    ));

    // Another customer takes the same seat and completes.
    let resale = engine
        .create_booking(HoldRequest {
            showtime_id,
            seat_ids: vec![seat_ids[2]],
            total_amount: Money::from_cents(1600),
            identity: guest("newcomer@example.com"),
        })
        .unwrap();
    let (booking, _) = engine
        .complete_booking(resale.booking_id, &good_card())
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Completed);
}

#[test]
fn explicit_cancel_frees_seats_for_the_next_guest() {
    let (engine, showtime_id, seat_ids) = seeded_engine();

    let hold = engine
        .create_booking(HoldRequest {
            showtime_id,
            seat_ids: vec![seat_ids[3]],
            total_amount: Money::from_cents(1600),
            identity: guest("undecided@example.com"),
        })
        .unwrap();
    let owner = engine.get_booking(hold.booking_id).unwrap().account.id;

    engine
        .cancel_booking(
            hold.booking_id,
            CancelRequester {
                account_id: owner,
                elevated: false,
            },
        )
        .unwrap();

    let view = engine.get_booking(hold.booking_id).unwrap();
    assert_eq!(view.booking.status, BookingStatus::Cancelled);
    assert_eq!(view.booking.payment_status, PaymentProgress::Failed);

    assert!(
        engine
            .create_booking(HoldRequest {
                showtime_id,
                seat_ids: vec![seat_ids[3]],
                total_amount: Money::from_cents(1600),
                identity: guest("decisive@example.com"),
            })
            .is_ok()
    );
}

#[tokio::test]
async fn returning_guest_keeps_one_account_across_bookings() {
    let (engine, showtime_id, seat_ids) = seeded_engine();

    let first = engine
        .create_booking(HoldRequest {
            showtime_id,
            seat_ids: vec![seat_ids[0]],
            total_amount: Money::from_cents(1600),
            identity: guest("regular@example.com"),
        })
        .unwrap();
    engine
        .complete_booking(first.booking_id, &good_card())
        .await
        .unwrap();

    let second = engine
        .create_booking(HoldRequest {
            showtime_id,
            seat_ids: vec![seat_ids[1]],
            total_amount: Money::from_cents(1600),
            identity: guest("regular@example.com"),
        })
        .unwrap();

    let a = engine.get_booking(first.booking_id).unwrap().account;
    let b = engine.get_booking(second.booking_id).unwrap().account;
    assert_eq!(a.id, b.id);
    engine.store().read(|data| assert_eq!(data.accounts.len(), 1));
}
