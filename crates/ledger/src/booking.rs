use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hotel_core::{Aggregate, AggregateRoot, Amount, BookerAddress, BookingError, RoomId, ValueObject};
use hotel_events::Event;
use hotel_inventory::RoomSlot;

use crate::clock::elapsed_secs;
use crate::refund::RefundSchedule;

/// Requested stay: check-in and check-out instants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayPeriod {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

impl StayPeriod {
    pub fn new(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Self {
        Self { check_in, check_out }
    }

    pub fn is_valid(&self) -> bool {
        self.check_in < self.check_out
    }
}

impl ValueObject for StayPeriod {}

/// Active booking held by the ledger for one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub room_id: RoomId,
    pub booker: BookerAddress,
    pub stay: StayPeriod,
    /// Ledger acceptance time; the refund clock starts here.
    pub booking_time: DateTime<Utc>,
    /// Escrowed payment, equal to the room price at booking time.
    pub amount_paid: Amount,
}

impl Booking {
    pub fn receipt(&self) -> Receipt {
        Receipt {
            room_id: self.room_id,
            booking_time: self.booking_time,
            amount_paid: self.amount_paid,
        }
    }
}

/// Proof of a successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub room_id: RoomId,
    pub booking_time: DateTime<Utc>,
    pub amount_paid: Amount,
}

/// Outcome of a cancellation (or a quote for one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundResult {
    pub refund_amount: Amount,
    pub percentage: u8,
    /// Part of the escrow the ledger keeps.
    pub forfeited: Amount,
    pub elapsed_secs: u64,
}

/// Command: BookRoom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRoom {
    pub room_id: RoomId,
    pub stay: StayPeriod,
    pub payment: Amount,
    pub booker: BookerAddress,
    pub requested_at: DateTime<Utc>,
}

/// Command: CancelBooking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBooking {
    pub room_id: RoomId,
    pub requester: BookerAddress,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationCommand {
    BookRoom(BookRoom),
    CancelBooking(CancelBooking),
}

/// Event: RoomBooked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBooked {
    pub room_id: RoomId,
    pub booker: BookerAddress,
    pub stay: StayPeriod,
    pub amount_paid: Amount,
    pub booking_time: DateTime<Utc>,
}

impl RoomBooked {
    pub fn receipt(&self) -> Receipt {
        Receipt {
            room_id: self.room_id,
            booking_time: self.booking_time,
            amount_paid: self.amount_paid,
        }
    }
}

/// Event: BookingCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCancelled {
    pub room_id: RoomId,
    pub booker: BookerAddress,
    pub amount_paid: Amount,
    pub refund_amount: Amount,
    pub forfeited: Amount,
    pub percentage: u8,
    pub elapsed_secs: u64,
    pub cancelled_at: DateTime<Utc>,
}

impl BookingCancelled {
    pub fn refund_result(&self) -> RefundResult {
        RefundResult {
            refund_amount: self.refund_amount,
            percentage: self.percentage,
            forfeited: self.forfeited,
            elapsed_secs: self.elapsed_secs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationEvent {
    RoomBooked(RoomBooked),
    BookingCancelled(BookingCancelled),
}

impl ReservationEvent {
    pub fn room_id(&self) -> RoomId {
        match self {
            ReservationEvent::RoomBooked(e) => e.room_id,
            ReservationEvent::BookingCancelled(e) => e.room_id,
        }
    }

    pub fn refund_result(&self) -> Option<RefundResult> {
        match self {
            ReservationEvent::BookingCancelled(e) => Some(e.refund_result()),
            ReservationEvent::RoomBooked(_) => None,
        }
    }
}

impl Event for ReservationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReservationEvent::RoomBooked(_) => "reservation.room.booked",
            ReservationEvent::BookingCancelled(_) => "reservation.booking.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ReservationEvent::RoomBooked(e) => e.booking_time,
            ReservationEvent::BookingCancelled(e) => e.cancelled_at,
        }
    }
}

/// Aggregate view over one locked room slot.
///
/// Borrowing the slot mutably means the caller already holds the room's lock,
/// so a decision and the apply that follows it cannot interleave with another
/// call on the same room.
#[derive(Debug)]
pub struct RoomReservation<'a> {
    slot: &'a mut RoomSlot<Booking>,
    schedule: &'a RefundSchedule,
}

impl<'a> RoomReservation<'a> {
    pub fn new(slot: &'a mut RoomSlot<Booking>, schedule: &'a RefundSchedule) -> Self {
        Self { slot, schedule }
    }

    pub fn booking(&self) -> Option<&Booking> {
        self.slot.booking()
    }

    fn room_id(&self) -> RoomId {
        self.slot.room().id_typed()
    }

    /// Checks run in a fixed order and the first failure wins.
    pub fn decide_booking(&self, cmd: &BookRoom) -> Result<RoomBooked, BookingError> {
        let room_id = self.room_id();
        let room = self.slot.room();

        if room.is_booked() {
            return Err(BookingError::AlreadyBooked { room_id });
        }
        if !cmd.stay.is_valid() {
            return Err(BookingError::InvalidDateRange { room_id });
        }

        let expected = room.price();
        if cmd.payment < expected {
            return Err(BookingError::InsufficientPayment {
                room_id,
                expected,
                provided: cmd.payment,
            });
        }
        if cmd.payment > expected {
            return Err(BookingError::OverPayment {
                room_id,
                expected,
                provided: cmd.payment,
            });
        }

        Ok(RoomBooked {
            room_id,
            booker: cmd.booker.clone(),
            stay: cmd.stay,
            amount_paid: cmd.payment,
            booking_time: cmd.requested_at,
        })
    }

    pub fn decide_cancellation(&self, cmd: &CancelBooking) -> Result<BookingCancelled, BookingError> {
        let room_id = self.room_id();
        let booking = self
            .slot
            .booking()
            .ok_or(BookingError::NoActiveBooking { room_id })?;

        if booking.booker != cmd.requester {
            return Err(BookingError::Unauthorized { room_id });
        }

        let refund = quote(self.schedule, booking, cmd.requested_at);
        Ok(BookingCancelled {
            room_id,
            booker: booking.booker.clone(),
            amount_paid: booking.amount_paid,
            refund_amount: refund.refund_amount,
            forfeited: refund.forfeited,
            percentage: refund.percentage,
            elapsed_secs: refund.elapsed_secs,
            cancelled_at: cmd.requested_at,
        })
    }
}

/// Refund the booking would get if cancelled at `now`.
///
/// Always computed from `amount_paid`, never from the room's current price.
pub fn quote(schedule: &RefundSchedule, booking: &Booking, now: DateTime<Utc>) -> RefundResult {
    let elapsed = elapsed_secs(booking.booking_time, now);
    let (percentage, refund_amount) = schedule.refund(booking.amount_paid, elapsed);
    RefundResult {
        refund_amount,
        percentage,
        forfeited: booking.amount_paid.saturating_sub(refund_amount),
        elapsed_secs: elapsed,
    }
}

impl AggregateRoot for RoomReservation<'_> {
    type Id = RoomId;

    fn id(&self) -> &Self::Id {
        self.slot.id()
    }

    fn version(&self) -> u64 {
        self.slot.version()
    }
}

impl Aggregate for RoomReservation<'_> {
    type Command = ReservationCommand;
    type Event = ReservationEvent;
    type Error = BookingError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ReservationEvent::RoomBooked(e) => {
                self.slot.occupy(Booking {
                    room_id: e.room_id,
                    booker: e.booker.clone(),
                    stay: e.stay,
                    booking_time: e.booking_time,
                    amount_paid: e.amount_paid,
                });
            }
            ReservationEvent::BookingCancelled(_) => {
                // Dropping the record is the escrow release; nothing else holds it.
                let _ = self.slot.vacate();
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ReservationCommand::BookRoom(cmd) => {
                self.decide_booking(cmd).map(|e| vec![ReservationEvent::RoomBooked(e)])
            }
            ReservationCommand::CancelBooking(cmd) => self
                .decide_cancellation(cmd)
                .map(|e| vec![ReservationEvent::BookingCancelled(e)]),
        }
    }
}
