//! Domain error model.

use thiserror::Error;

use crate::amount::Amount;
use crate::id::RoomId;

/// Result type for ledger and inventory operations.
pub type BookingResult<T> = Result<T, BookingError>;

/// Result type for construction-time validation.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failure of a booking, cancellation or room lookup.
///
/// Every variant is terminal: the call that produced it changed nothing, and
/// retrying is a caller decision.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// The room id is not part of the catalog.
    #[error("room {room_id} not found")]
    NotFound { room_id: RoomId },

    /// The room already has an active booking.
    #[error("room {room_id} is already booked")]
    AlreadyBooked { room_id: RoomId },

    /// Check-in is not strictly before check-out.
    #[error("invalid date range for room {room_id}: check-in must be before check-out")]
    InvalidDateRange { room_id: RoomId },

    /// Payment is below the room price.
    #[error("insufficient payment for room {room_id}: expected {expected}, got {provided}")]
    InsufficientPayment {
        room_id: RoomId,
        expected: Amount,
        provided: Amount,
    },

    /// Payment is above the room price.
    #[error("overpayment for room {room_id}: expected {expected}, got {provided}")]
    OverPayment {
        room_id: RoomId,
        expected: Amount,
        provided: Amount,
    },

    /// There is no active booking to cancel.
    #[error("no active booking for room {room_id}")]
    NoActiveBooking { room_id: RoomId },

    /// The requester is not the party that made the booking.
    #[error("requester is not the booker of room {room_id}")]
    Unauthorized { room_id: RoomId },
}

impl BookingError {
    /// Room the failed call targeted.
    pub fn room_id(&self) -> RoomId {
        match self {
            BookingError::NotFound { room_id }
            | BookingError::AlreadyBooked { room_id }
            | BookingError::InvalidDateRange { room_id }
            | BookingError::InsufficientPayment { room_id, .. }
            | BookingError::OverPayment { room_id, .. }
            | BookingError::NoActiveBooking { room_id }
            | BookingError::Unauthorized { room_id } => *room_id,
        }
    }

    /// Stable machine-readable kind, for logs and callers that map errors to codes.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::NotFound { .. } => "not_found",
            BookingError::AlreadyBooked { .. } => "already_booked",
            BookingError::InvalidDateRange { .. } => "invalid_date_range",
            BookingError::InsufficientPayment { .. } => "insufficient_payment",
            BookingError::OverPayment { .. } => "over_payment",
            BookingError::NoActiveBooking { .. } => "no_active_booking",
            BookingError::Unauthorized { .. } => "unauthorized",
        }
    }
}

/// Domain-level validation error.
///
/// Raised while building catalogs, schedules and identifiers, never by the
/// booking operations themselves.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
