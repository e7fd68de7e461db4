use serde::{Deserialize, Serialize};

use hotel_core::{Amount, DomainError, DomainResult, RoomId};

use crate::room::Room;
use crate::store::InventoryStore;

/// Seed entry for one catalog room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSpec {
    pub name: String,
    pub price: Amount,
}

impl RoomSpec {
    pub fn new(name: impl Into<String>, price: Amount) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("room name cannot be empty"));
        }
        Ok(())
    }
}

/// Builds the fixed room catalog.
///
/// Rooms get sequential ids starting at 1 in the order they are added. Once
/// `build` runs the catalog is frozen: the store has no way to add or remove rooms.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    rooms: Vec<Room>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a room and return the id it was assigned.
    pub fn add_room(&mut self, name: impl Into<String>, price: Amount) -> DomainResult<RoomId> {
        let spec = RoomSpec::new(name, price);
        spec.validate()?;

        let id = RoomId::new(self.rooms.len() as u64 + 1);
        self.rooms.push(Room::new(id, spec.name, spec.price));
        Ok(id)
    }

    /// Add every spec in order, stopping at the first invalid one.
    pub fn extend_from_specs<'a>(
        &mut self,
        specs: impl IntoIterator<Item = &'a RoomSpec>,
    ) -> DomainResult<()> {
        for spec in specs {
            self.add_room(spec.name.clone(), spec.price)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn build<B>(self) -> InventoryStore<B> {
        InventoryStore::from_rooms(self.rooms)
    }
}
