//! End-to-end booking and cancellation through the public ledger API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use hotel_events::{EventBus, Subscription};
use hotel_ledger::{
    Amount, BookerAddress, BookingError, CatalogBuilder, EscrowProjection, InMemoryReservationBus,
    ManualClock, Receipt, RefundSchedule, RefundTier, ReservationEnvelope, ReservationEvent,
    ReservationLedger, RoomId,
};

type TestLedger = ReservationLedger<Arc<ManualClock>, Arc<InMemoryReservationBus>>;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn addr(s: &str) -> BookerAddress {
    BookerAddress::parse(s).unwrap()
}

fn setup() -> (TestLedger, Arc<ManualClock>) {
    hotel_observability::tracing::init(hotel_observability::LogFormat::Pretty);

    let mut catalog = CatalogBuilder::new();
    catalog.add_room("Deluxe", Amount::new(500)).unwrap();
    catalog.add_room("Standard", Amount::new(300)).unwrap();

    let clock = Arc::new(ManualClock::new(t0()));
    let bus = Arc::new(InMemoryReservationBus::new());
    let ledger = ReservationLedger::new(catalog, RefundSchedule::standard(), clock.clone(), bus);
    (ledger, clock)
}

fn deluxe() -> RoomId {
    RoomId::new(1)
}

fn book(ledger: &TestLedger, room: RoomId, payment: u128, who: &str) -> Result<Receipt, BookingError> {
    ledger.book_room(room, t0(), t0() + Duration::days(1), Amount::new(payment), addr(who))
}

/// `is_booked` must mirror the presence of an active booking for every room.
fn assert_invariant(ledger: &TestLedger) {
    for room in ledger.get_rooms() {
        let booking = ledger.active_booking(room.id_typed()).unwrap();
        assert_eq!(room.is_booked(), booking.is_some(), "room {}", room.id_typed());
    }
}

#[test]
fn example_scenario_refunds_ninety_percent_after_75_seconds() {
    let (ledger, clock) = setup();

    let receipt = book(&ledger, deluxe(), 500, "0xA").unwrap();
    assert_eq!(receipt.room_id, deluxe());
    assert_eq!(receipt.booking_time, t0());
    assert_eq!(receipt.amount_paid, Amount::new(500));
    assert!(ledger.get_room(deluxe()).unwrap().is_booked());
    assert_invariant(&ledger);

    clock.advance_secs(75);
    let refund = ledger.cancel_booking(deluxe(), &addr("0xA")).unwrap();
    assert_eq!(refund.percentage, 90);
    assert_eq!(refund.refund_amount, Amount::new(450));
    assert_eq!(refund.forfeited, Amount::new(50));
    assert!(!ledger.get_room(deluxe()).unwrap().is_booked());
    assert_invariant(&ledger);
}

#[test]
fn immediate_cancel_refunds_everything() {
    let (ledger, _clock) = setup();
    book(&ledger, RoomId::new(2), 300, "0xB").unwrap();

    let refund = ledger.cancel_booking(RoomId::new(2), &addr("0xB")).unwrap();
    assert_eq!(refund.refund_amount, Amount::new(300));
    assert_eq!(refund.percentage, 100);
    assert_eq!(refund.forfeited, Amount::ZERO);
}

#[test]
fn late_cancel_refunds_nothing() {
    let (ledger, clock) = setup();
    book(&ledger, deluxe(), 500, "0xA").unwrap();

    clock.advance_secs(300);
    let refund = ledger.cancel_booking(deluxe(), &addr("0xA")).unwrap();
    assert_eq!(refund.refund_amount, Amount::ZERO);
    assert_eq!(refund.forfeited, Amount::new(500));
}

#[test]
fn get_rooms_lists_catalog_in_order() {
    let (ledger, _clock) = setup();
    let rooms = ledger.get_rooms();
    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[0].name(), "Deluxe");
    assert_eq!(rooms[0].price(), Amount::new(500));
    assert_eq!(rooms[1].name(), "Standard");
    assert!(rooms.iter().all(|r| !r.is_booked()));
}

#[test]
fn unknown_room_is_not_found() {
    let (ledger, _clock) = setup();
    let missing = RoomId::new(9);

    assert_eq!(ledger.get_room(missing).unwrap_err(), BookingError::NotFound { room_id: missing });
    assert_eq!(
        book(&ledger, missing, 500, "0xA").unwrap_err(),
        BookingError::NotFound { room_id: missing }
    );
}

#[test]
fn double_booking_is_rejected() {
    let (ledger, _clock) = setup();
    book(&ledger, deluxe(), 500, "0xA").unwrap();

    let err = book(&ledger, deluxe(), 500, "0xB").unwrap_err();
    assert_eq!(err, BookingError::AlreadyBooked { room_id: deluxe() });

    let booking = ledger.active_booking(deluxe()).unwrap().unwrap();
    assert_eq!(booking.booker, addr("0xA"));
}

#[test]
fn check_in_must_precede_check_out() {
    let (ledger, _clock) = setup();
    for check_out in [t0(), t0() - Duration::hours(1)] {
        let err = ledger
            .book_room(deluxe(), t0(), check_out, Amount::new(500), addr("0xA"))
            .unwrap_err();
        assert_eq!(err, BookingError::InvalidDateRange { room_id: deluxe() });
    }
    assert_invariant(&ledger);
}

#[test]
fn payment_must_match_price_exactly() {
    let (ledger, _clock) = setup();

    let under = book(&ledger, deluxe(), 499, "0xA").unwrap_err();
    assert!(matches!(under, BookingError::InsufficientPayment { .. }));

    let over = book(&ledger, deluxe(), 501, "0xA").unwrap_err();
    assert!(matches!(over, BookingError::OverPayment { .. }));

    let zero = book(&ledger, deluxe(), 0, "0xA").unwrap_err();
    assert!(matches!(zero, BookingError::InsufficientPayment { .. }));

    assert!(ledger.active_booking(deluxe()).unwrap().is_none());
    assert_invariant(&ledger);
}

#[test]
fn first_failing_check_wins() {
    let (ledger, _clock) = setup();

    // Bad dates and bad payment: dates are checked first.
    let err = ledger
        .book_room(deluxe(), t0(), t0(), Amount::new(1), addr("0xA"))
        .unwrap_err();
    assert_eq!(err, BookingError::InvalidDateRange { room_id: deluxe() });

    // Booked room with bad dates and bad payment: occupancy is checked first.
    book(&ledger, deluxe(), 500, "0xA").unwrap();
    let err = ledger
        .book_room(deluxe(), t0(), t0(), Amount::new(1), addr("0xB"))
        .unwrap_err();
    assert_eq!(err, BookingError::AlreadyBooked { room_id: deluxe() });
}

#[test]
fn cancelling_without_booking_changes_nothing() {
    let (ledger, _clock) = setup();
    let before = ledger.get_rooms();

    let err = ledger.cancel_booking(deluxe(), &addr("0xA")).unwrap_err();
    assert_eq!(err, BookingError::NoActiveBooking { room_id: deluxe() });

    let unknown = ledger.cancel_booking(RoomId::new(42), &addr("0xA")).unwrap_err();
    assert_eq!(unknown, BookingError::NoActiveBooking { room_id: RoomId::new(42) });

    assert_eq!(ledger.get_rooms(), before);
}

#[test]
fn only_the_booker_may_cancel() {
    let (ledger, _clock) = setup();
    book(&ledger, deluxe(), 500, "0xA").unwrap();

    let err = ledger.cancel_booking(deluxe(), &addr("0xB")).unwrap_err();
    assert_eq!(err, BookingError::Unauthorized { room_id: deluxe() });
    assert!(ledger.get_room(deluxe()).unwrap().is_booked());

    // Address comparison ignores hex case.
    ledger.cancel_booking(deluxe(), &addr("0xa")).unwrap();
}

#[test]
fn named_bookers_are_matched_case_sensitively() {
    let (ledger, _clock) = setup();
    book(&ledger, deluxe(), 500, "Alice").unwrap();

    let err = ledger.cancel_booking(deluxe(), &addr("ALICE")).unwrap_err();
    assert_eq!(err, BookingError::Unauthorized { room_id: deluxe() });
    assert!(ledger.get_room(deluxe()).unwrap().is_booked());

    ledger.cancel_booking(deluxe(), &addr("Alice")).unwrap();
}

#[test]
fn second_cancel_fails() {
    let (ledger, _clock) = setup();
    book(&ledger, deluxe(), 500, "0xA").unwrap();
    ledger.cancel_booking(deluxe(), &addr("0xA")).unwrap();

    let err = ledger.cancel_booking(deluxe(), &addr("0xA")).unwrap_err();
    assert_eq!(err, BookingError::NoActiveBooking { room_id: deluxe() });
}

#[test]
fn cancelled_room_is_rebookable_with_fresh_booking_time() {
    let (ledger, clock) = setup();
    let first = book(&ledger, deluxe(), 500, "0xA").unwrap();

    clock.advance_secs(200);
    ledger.cancel_booking(deluxe(), &addr("0xA")).unwrap();

    clock.advance_secs(10);
    let second = book(&ledger, deluxe(), 500, "0xB").unwrap();
    assert_eq!(second.booking_time, first.booking_time + Duration::seconds(210));

    // Refund decay restarts from the new booking.
    let quote = ledger.quote_refund(deluxe()).unwrap();
    assert_eq!(quote.elapsed_secs, 0);
    assert_eq!(quote.percentage, 100);
}

#[test]
fn quote_refund_previews_without_mutating() {
    let (ledger, clock) = setup();
    assert_eq!(
        ledger.quote_refund(deluxe()).unwrap_err(),
        BookingError::NoActiveBooking { room_id: deluxe() }
    );

    book(&ledger, deluxe(), 500, "0xA").unwrap();
    clock.advance_secs(130);

    let quote = ledger.quote_refund(deluxe()).unwrap();
    assert_eq!(quote.percentage, 80);
    assert_eq!(quote.refund_amount, Amount::new(400));
    assert!(ledger.get_room(deluxe()).unwrap().is_booked());

    let actual = ledger.cancel_booking(deluxe(), &addr("0xA")).unwrap();
    assert_eq!(actual, quote);
}

#[test]
fn committed_transitions_are_published_in_order() {
    let (ledger, clock) = setup();
    let subscription = ledger.bus().subscribe();

    book(&ledger, deluxe(), 500, "0xA").unwrap();
    book(&ledger, deluxe(), 500, "0xB").unwrap_err();
    clock.advance_secs(61);
    ledger.cancel_booking(deluxe(), &addr("0xA")).unwrap();

    let envelopes = subscription.drain();
    assert_eq!(envelopes.len(), 2, "rejections publish nothing");

    assert_eq!(envelopes[0].event_type(), "reservation.room.booked");
    assert_eq!(envelopes[0].sequence_number(), 1);
    assert_eq!(envelopes[1].event_type(), "reservation.booking.cancelled");
    assert_eq!(envelopes[1].sequence_number(), 2);

    match envelopes[1].payload() {
        ReservationEvent::BookingCancelled(e) => {
            assert_eq!(e.refund_amount, Amount::new(450));
            assert_eq!(e.elapsed_secs, 61);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn escrow_projection_follows_the_bus() {
    let (ledger, clock) = setup();
    let subscription = ledger.bus().subscribe();
    let projection = EscrowProjection::new();

    book(&ledger, deluxe(), 500, "0xA").unwrap();
    book(&ledger, RoomId::new(2), 300, "0xB").unwrap();
    clock.advance_secs(75);
    ledger.cancel_booking(deluxe(), &addr("0xA")).unwrap();

    for env in subscription.drain() {
        projection.apply_envelope(&env).unwrap();
    }

    let totals = projection.totals();
    assert_eq!(totals.held, Amount::new(300));
    assert_eq!(totals.refunded, Amount::new(450));
    assert_eq!(totals.forfeited, Amount::new(50));
    assert_eq!(projection.room(deluxe()).cancellations, 1);
}

#[test]
fn custom_schedule_applies_to_amount_paid() {
    // Custom schedule: 50% for the first hour, nothing after.
    let mut catalog = CatalogBuilder::new();
    catalog.add_room("Suite", Amount::new(999)).unwrap();
    let schedule = RefundSchedule::new(
        vec![RefundTier { below_secs: 3600, percent: 50 }],
        0,
    )
    .unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let ledger = ReservationLedger::new(
        catalog,
        schedule,
        clock.clone(),
        Arc::new(InMemoryReservationBus::new()),
    );

    ledger
        .book_room(RoomId::new(1), t0(), t0() + Duration::days(2), Amount::new(999), addr("0xC"))
        .unwrap();
    clock.advance_secs(1800);
    let refund = ledger.cancel_booking(RoomId::new(1), &addr("0xC")).unwrap();
    assert_eq!(refund.refund_amount, Amount::new(499));
    assert_eq!(refund.forfeited, Amount::new(500));
}

/// Bus whose transport is always down; counts publish attempts.
#[derive(Debug, Default)]
struct UnreachableBus {
    attempts: AtomicUsize,
}

impl EventBus<ReservationEnvelope> for UnreachableBus {
    type Error = &'static str;

    fn publish(&self, _message: ReservationEnvelope) -> Result<(), Self::Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err("transport closed")
    }

    fn subscribe(&self) -> Subscription<ReservationEnvelope> {
        let (_tx, rx) = mpsc::channel();
        Subscription::new(rx)
    }
}

#[test]
fn failed_publication_does_not_fail_committed_calls() {
    let mut catalog = CatalogBuilder::new();
    catalog.add_room("Deluxe", Amount::new(500)).unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let bus = Arc::new(UnreachableBus::default());
    let ledger = ReservationLedger::new(catalog, RefundSchedule::standard(), clock, bus.clone());

    let receipt = ledger
        .book_room(deluxe(), t0(), t0() + Duration::days(1), Amount::new(500), addr("0xA"))
        .unwrap();
    assert_eq!(receipt.amount_paid, Amount::new(500));
    assert!(ledger.get_room(deluxe()).unwrap().is_booked());
    assert!(ledger.active_booking(deluxe()).unwrap().is_some());

    let refund = ledger.cancel_booking(deluxe(), &addr("0xA")).unwrap();
    assert_eq!(refund.refund_amount, Amount::new(500));
    assert_eq!(refund.percentage, 100);
    assert!(!ledger.get_room(deluxe()).unwrap().is_booked());
    assert!(ledger.active_booking(deluxe()).unwrap().is_none());

    assert_eq!(bus.attempts.load(Ordering::SeqCst), 2);
}
