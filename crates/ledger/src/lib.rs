//! Reservation ledger (booking, cancellation, refund decay).
//!
//! Domain logic over the inventory store: no IO beyond optional config loading,
//! no async. Every state change is a decide-then-apply step under the room's lock.

pub mod booking;
pub mod clock;
pub mod config;
pub mod ledger;
pub mod projection;
pub mod refund;

pub use booking::{
    BookRoom, Booking, BookingCancelled, CancelBooking, Receipt, RefundResult, ReservationCommand,
    ReservationEvent, RoomBooked, RoomReservation, StayPeriod,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CONFIG_PATH_ENV, ConfigError, LedgerConfig};
pub use ledger::{InMemoryReservationBus, ReservationEnvelope, ReservationLedger};
pub use projection::{EscrowBalance, EscrowProjection, ProjectionError};
pub use refund::{RefundSchedule, RefundTier};

pub use hotel_core::{Amount, BookerAddress, BookingError, BookingResult, RoomId};
pub use hotel_inventory::{CatalogBuilder, Room, RoomSpec};
