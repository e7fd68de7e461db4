use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hotel_core::{Amount, RoomId};

use crate::booking::ReservationEvent;
use crate::ledger::ReservationEnvelope;

/// Escrow position of one room (or of the whole ledger, for totals).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowBalance {
    /// Currently escrowed for an active booking.
    pub held: Amount,
    /// Paid back to bookers over all cancellations.
    pub refunded: Amount,
    /// Retained by the ledger over all cancellations.
    pub forfeited: Amount,
    pub bookings: u64,
    pub cancellations: u64,
}

impl EscrowBalance {
    fn apply(&mut self, event: &ReservationEvent) {
        match event {
            ReservationEvent::RoomBooked(e) => {
                self.held = self.held.saturating_add(e.amount_paid);
                self.bookings += 1;
            }
            ReservationEvent::BookingCancelled(e) => {
                self.held = self.held.saturating_sub(e.amount_paid);
                self.refunded = self.refunded.saturating_add(e.refund_amount);
                self.forfeited = self.forfeited.saturating_add(e.forfeited);
                self.cancellations += 1;
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("event room {event} does not match envelope room {envelope}")]
    RoomMismatch { envelope: RoomId, event: RoomId },

    #[error("non-monotonic sequence number for room {room_id} (last={last}, found={found})")]
    NonMonotonicSequence { room_id: RoomId, last: u64, found: u64 },
}

#[derive(Debug, Default)]
struct EscrowState {
    rooms: HashMap<RoomId, EscrowBalance>,
    cursors: HashMap<RoomId, u64>,
    totals: EscrowBalance,
}

/// Escrow read model fed from published reservation envelopes.
///
/// Disposable and rebuildable from the event stream. Redelivered envelopes
/// (sequence at or below the room's cursor) are ignored.
#[derive(Debug, Default)]
pub struct EscrowProjection {
    state: RwLock<EscrowState>,
}

impl EscrowProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(&self, room_id: RoomId) -> EscrowBalance {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.rooms.get(&room_id).copied().unwrap_or_default()
    }

    pub fn totals(&self) -> EscrowBalance {
        self.state.read().unwrap_or_else(PoisonError::into_inner).totals
    }

    /// Apply one envelope.
    ///
    /// - The event must belong to the envelope's room
    /// - Sequence numbers per room must advance by exactly one
    /// - Replays at or below the cursor are no-ops
    pub fn apply_envelope(&self, envelope: &ReservationEnvelope) -> Result<(), ProjectionError> {
        let room_id = envelope.room_id();
        let seq = envelope.sequence_number();
        let event = envelope.payload();

        if event.room_id() != room_id {
            return Err(ProjectionError::RoomMismatch {
                envelope: room_id,
                event: event.room_id(),
            });
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let last = state.cursors.get(&room_id).copied().unwrap_or(0);

        if seq == 0 {
            return Err(ProjectionError::NonMonotonicSequence { room_id, last, found: seq });
        }
        if seq <= last {
            // Duplicate or replay; safe to ignore.
            return Ok(());
        }
        if seq != last + 1 {
            return Err(ProjectionError::NonMonotonicSequence { room_id, last, found: seq });
        }

        state.rooms.entry(room_id).or_default().apply(event);
        state.totals.apply(event);
        state.cursors.insert(room_id, seq);
        Ok(())
    }

    /// Reset and replay, ordered by room then sequence.
    pub fn rebuild_from_scratch(
        &self,
        envelopes: impl IntoIterator<Item = ReservationEnvelope>,
    ) -> Result<(), ProjectionError> {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = EscrowState::default();

        let mut envs: Vec<_> = envelopes.into_iter().collect();
        envs.sort_by_key(|e| (e.room_id(), e.sequence_number()));

        for env in &envs {
            self.apply_envelope(env)?;
        }
        Ok(())
    }
}
