//! Inventory Store: the fixed room catalog and per-room occupancy.
//!
//! Each room lives in its own locked slot together with whatever booking record
//! the ledger keeps for it, so the booked flag and the record can only change
//! together.

pub mod catalog;
pub mod room;
pub mod store;

pub use catalog::{CatalogBuilder, RoomSpec};
pub use room::Room;
pub use store::{InventoryStore, RoomSlot};
