use std::sync::{Mutex, MutexGuard, PoisonError};

use hotel_core::{AggregateRoot, BookingError, BookingResult, RoomId};

use crate::room::Room;

/// One room plus its active booking record, guarded together.
///
/// `B` is the booking record type chosen by the ledger. The slot only knows
/// whether one is present; `room.is_booked()` mirrors that presence at all times.
#[derive(Debug)]
pub struct RoomSlot<B> {
    room: Room,
    booking: Option<B>,
    version: u64,
}

impl<B> RoomSlot<B> {
    fn new(room: Room) -> Self {
        Self {
            room,
            booking: None,
            version: 0,
        }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn booking(&self) -> Option<&B> {
        self.booking.as_ref()
    }

    /// Mark the room booked and store its booking record in one step.
    ///
    /// Callers must have checked that the room is free; an existing record would
    /// be replaced.
    pub fn occupy(&mut self, booking: B) {
        debug_assert!(self.booking.is_none(), "occupy on a booked room");
        self.booking = Some(booking);
        self.room.set_booked(true);
        self.version += 1;
    }

    /// Clear the booked flag and hand back the removed booking record.
    ///
    /// Returns `None` (and changes nothing) when the room was not booked.
    pub fn vacate(&mut self) -> Option<B> {
        let booking = self.booking.take()?;
        self.room.set_booked(false);
        self.version += 1;
        Some(booking)
    }
}

impl<B> AggregateRoot for RoomSlot<B> {
    type Id = RoomId;

    fn id(&self) -> &Self::Id {
        hotel_core::Entity::id(&self.room)
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Room catalog with one lock per room.
///
/// Operations on different rooms never contend. The catalog is fixed at build
/// time, so slot lookup needs no lock of its own.
#[derive(Debug)]
pub struct InventoryStore<B> {
    slots: Vec<Mutex<RoomSlot<B>>>,
}

impl<B> InventoryStore<B> {
    pub(crate) fn from_rooms(rooms: Vec<Room>) -> Self {
        tracing::debug!(rooms = rooms.len(), "room catalog built");
        Self {
            slots: rooms.into_iter().map(|r| Mutex::new(RoomSlot::new(r))).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All rooms in creation order.
    ///
    /// Each room is read under its own lock, so every entry is internally
    /// consistent; the list as a whole is not a single point-in-time snapshot.
    pub fn get_rooms(&self) -> Vec<Room> {
        self.slots
            .iter()
            .map(|slot| Self::guard(slot).room.clone())
            .collect()
    }

    pub fn get_room(&self, room_id: RoomId) -> BookingResult<Room> {
        Ok(self.lock(room_id)?.room.clone())
    }

    /// Lock one room's slot for a read-check-write.
    ///
    /// Only the reservation ledger holds the store, so this is its private
    /// entry point for changing occupancy.
    pub fn lock(&self, room_id: RoomId) -> BookingResult<MutexGuard<'_, RoomSlot<B>>> {
        let slot = self.slot(room_id)?;
        Ok(Self::guard(slot))
    }

    fn slot(&self, room_id: RoomId) -> BookingResult<&Mutex<RoomSlot<B>>> {
        usize::try_from(room_id.value())
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|idx| self.slots.get(idx))
            .ok_or(BookingError::NotFound { room_id })
    }

    // Slot mutations are single infallible calls, so a holder that panicked
    // cannot have left a slot half-updated.
    fn guard(slot: &Mutex<RoomSlot<B>>) -> MutexGuard<'_, RoomSlot<B>> {
        slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
