//! `hotel-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, amounts, the aggregate/entity traits and the error taxonomy
//! shared by the inventory store and the reservation ledger.

pub mod aggregate;
pub mod amount;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use amount::Amount;
pub use entity::Entity;
pub use error::{BookingError, BookingResult, DomainError, DomainResult};
pub use id::{BookerAddress, EventId, RoomId};
pub use value_object::ValueObject;
