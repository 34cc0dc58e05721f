use serde::{Deserialize, Serialize};

use crate::domain::types::{Description, FloorLabel, RoomId, RoomName};

/// A room of the household. Top-level locations hang off rooms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    pub floor: Option<FloorLabel>,
    pub description: Option<Description>,
}

/// Data required to insert or overwrite a [`Room`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRoom {
    pub name: RoomName,
    pub floor: Option<FloorLabel>,
    pub description: Option<Description>,
}

impl NewRoom {
    /// A room carrying only a name.
    pub fn named(name: RoomName) -> Self {
        Self {
            name,
            floor: None,
            description: None,
        }
    }

    pub(crate) fn into_room(self, id: RoomId) -> Room {
        Room {
            id,
            name: self.name,
            floor: self.floor,
            description: self.description,
        }
    }
}
