use serde::{Deserialize, Serialize};

use hotel_core::{Amount, Entity, RoomId};

/// A catalog room.
///
/// `name` and `price` are fixed at catalog creation. `is_booked` is owned by the
/// room's slot and flips only together with the slot's booking record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    id: RoomId,
    name: String,
    price: Amount,
    is_booked: bool,
}

impl Room {
    pub(crate) fn new(id: RoomId, name: String, price: Amount) -> Self {
        Self {
            id,
            name,
            price,
            is_booked: false,
        }
    }

    pub fn id_typed(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Amount {
        self.price
    }

    pub fn is_booked(&self) -> bool {
        self.is_booked
    }

    pub(crate) fn set_booked(&mut self, booked: bool) {
        self.is_booked = booked;
    }
}

impl Entity for Room {
    type Id = RoomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
