//! Reservation ledger: the two transactional entry points over the inventory.
//!
//! Every booking or cancellation runs as:
//!
//! ```text
//! lock room slot
//!   ↓
//! execute: handle (all precondition checks, no mutation)
//!          then apply (infallible: sets flag + booking record together)
//!   ↓
//! publish event (room still locked, so per-room bus order = commit order)
//!   ↓
//! unlock
//! ```
//!
//! A failed decision leaves the slot untouched. Rooms are locked independently,
//! so calls against different rooms never wait on each other.

use chrono::{DateTime, Utc};

use hotel_core::{AggregateRoot, Amount, BookerAddress, BookingError, BookingResult, EventId, RoomId};
use hotel_events::{Event, EventBus, EventEnvelope, InMemoryEventBus, execute};
use hotel_inventory::{CatalogBuilder, InventoryStore, Room, RoomSlot};

use crate::booking::{
    BookRoom, Booking, CancelBooking, Receipt, RefundResult, ReservationCommand, ReservationEvent,
    RoomReservation, StayPeriod, quote,
};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, LedgerConfig};
use crate::refund::RefundSchedule;

/// Envelope type the ledger publishes.
pub type ReservationEnvelope = EventEnvelope<ReservationEvent>;

/// Default bus: in-process fan-out.
pub type InMemoryReservationBus = InMemoryEventBus<ReservationEnvelope>;

/// Owns the room inventory, the refund schedule and the escrowed bookings.
///
/// Callers never see the inventory directly; every state change goes through
/// [`ReservationLedger::book_room`] or [`ReservationLedger::cancel_booking`].
#[derive(Debug)]
pub struct ReservationLedger<C = SystemClock, B = InMemoryReservationBus> {
    inventory: InventoryStore<Booking>,
    schedule: RefundSchedule,
    clock: C,
    bus: B,
}

impl ReservationLedger {
    /// Wall-clock ledger with an in-memory bus, built from config.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, ConfigError> {
        Self::from_config_with(config, SystemClock, InMemoryEventBus::new())
    }
}

impl<C, B> ReservationLedger<C, B> {
    pub fn new(catalog: CatalogBuilder, schedule: RefundSchedule, clock: C, bus: B) -> Self {
        Self {
            inventory: catalog.build(),
            schedule,
            clock,
            bus,
        }
    }

    pub fn from_config_with(config: &LedgerConfig, clock: C, bus: B) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut catalog = CatalogBuilder::new();
        catalog.extend_from_specs(&config.rooms)?;
        tracing::info!(rooms = catalog.len(), "reservation ledger initialized");
        Ok(Self::new(catalog, config.refund_schedule.clone(), clock, bus))
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn refund_schedule(&self) -> &RefundSchedule {
        &self.schedule
    }

    /// All rooms in creation order.
    pub fn get_rooms(&self) -> Vec<Room> {
        self.inventory.get_rooms()
    }

    /// One room, typically to resolve its price before booking.
    pub fn get_room(&self, room_id: RoomId) -> BookingResult<Room> {
        self.inventory.get_room(room_id)
    }

    /// The room's active booking, if any.
    pub fn active_booking(&self, room_id: RoomId) -> BookingResult<Option<Booking>> {
        Ok(self.inventory.lock(room_id)?.booking().cloned())
    }
}

impl<C, B> ReservationLedger<C, B>
where
    C: Clock,
    B: EventBus<ReservationEnvelope>,
{
    /// Reserve a room, escrowing `payment`.
    ///
    /// Checks, first failure wins: room exists, room is free, check-in precedes
    /// check-out, payment equals the price exactly.
    pub fn book_room(
        &self,
        room_id: RoomId,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        payment: Amount,
        booker: BookerAddress,
    ) -> BookingResult<Receipt> {
        let mut slot = self.inventory.lock(room_id).inspect_err(log_rejection)?;
        let booking_time = self.clock.now();
        let cmd = ReservationCommand::BookRoom(BookRoom {
            room_id,
            stay: StayPeriod::new(check_in, check_out),
            payment,
            booker: booker.clone(),
            requested_at: booking_time,
        });

        let mut reservation = RoomReservation::new(&mut slot, &self.schedule);
        let events = execute(&mut reservation, &cmd).inspect_err(log_rejection)?;
        self.publish(&reservation, events);

        // A decided booking records exactly the requested payment and time.
        let receipt = Receipt {
            room_id,
            booking_time,
            amount_paid: payment,
        };
        tracing::info!(
            room_id = %room_id,
            booker = %booker,
            amount_paid = %receipt.amount_paid,
            booking_time = %receipt.booking_time,
            "room booked"
        );
        Ok(receipt)
    }

    /// Cancel the room's booking on behalf of its booker and release the escrow.
    ///
    /// An unknown room has no booking, so it fails with `NoActiveBooking` too.
    pub fn cancel_booking(&self, room_id: RoomId, requester: &BookerAddress) -> BookingResult<RefundResult> {
        let mut slot = self
            .inventory
            .lock(room_id)
            .map_err(|_| BookingError::NoActiveBooking { room_id })
            .inspect_err(log_rejection)?;
        let cmd = ReservationCommand::CancelBooking(CancelBooking {
            room_id,
            requester: requester.clone(),
            requested_at: self.clock.now(),
        });

        let mut reservation = RoomReservation::new(&mut slot, &self.schedule);
        let events = execute(&mut reservation, &cmd).inspect_err(log_rejection)?;
        let result = events.iter().find_map(ReservationEvent::refund_result);
        self.publish(&reservation, events);
        let result = result.ok_or(BookingError::NoActiveBooking { room_id })?;

        tracing::info!(
            room_id = %room_id,
            refund_amount = %result.refund_amount,
            forfeited = %result.forfeited,
            percentage = result.percentage,
            elapsed_secs = result.elapsed_secs,
            "booking cancelled"
        );
        Ok(result)
    }

    /// What cancelling right now would refund. Changes nothing.
    pub fn quote_refund(&self, room_id: RoomId) -> BookingResult<RefundResult> {
        let slot = self
            .inventory
            .lock(room_id)
            .map_err(|_| BookingError::NoActiveBooking { room_id })?;
        let booking = active(&slot, room_id)?;
        Ok(quote(&self.schedule, booking, self.clock.now()))
    }

    /// Publish events that `execute` already applied, numbered so the last one
    /// carries the reservation's current version.
    fn publish(&self, reservation: &RoomReservation<'_>, events: Vec<ReservationEvent>) {
        let first = reservation.version() + 1 - events.len() as u64;
        for (sequence, event) in (first..).zip(events) {
            let envelope = EventEnvelope::new(
                EventId::new(),
                event.room_id(),
                event.event_type(),
                sequence,
                event,
            );
            if let Err(err) = self.bus.publish(envelope) {
                // The transition is committed; subscribers can rebuild from ledger state.
                tracing::warn!(room_id = %reservation.id(), sequence, error = ?err, "event publication failed");
            }
        }
    }
}

fn active(slot: &RoomSlot<Booking>, room_id: RoomId) -> BookingResult<&Booking> {
    slot.booking().ok_or(BookingError::NoActiveBooking { room_id })
}

fn log_rejection(err: &BookingError) {
    tracing::debug!(room_id = %err.room_id(), kind = err.kind(), "request rejected: {err}");
}
