use serde::{Deserialize, Serialize};

use crate::domain::types::{Description, LocationId, LocationName, RoomId};

/// A place inside the household where items are kept.
///
/// A top-level location carries a direct `room_id` and no parent; a
/// sublocation carries a `parent_id` and inherits its room from its
/// ancestors. The storage layer accepts any combination, the hierarchy
/// validator decides which ones are committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub name: LocationName,
    pub description: Option<Description>,
    pub room_id: Option<RoomId>,
    pub parent_id: Option<LocationId>,
}

impl Location {
    /// Whether the location sits directly in a room.
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns the location as it would look after `update` is applied.
    pub fn updated(&self, update: &LocationUpdate) -> Location {
        Location {
            id: self.id,
            name: update.name.clone(),
            description: update.description.clone(),
            room_id: update.room_id,
            parent_id: update.parent_id,
        }
    }
}

/// Data required to insert a new [`Location`].
///
/// `id` is normally left empty so the store assigns one; restoring an
/// exported hierarchy may supply it explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewLocation {
    pub id: Option<LocationId>,
    pub name: LocationName,
    pub description: Option<Description>,
    pub room_id: Option<RoomId>,
    pub parent_id: Option<LocationId>,
}

impl NewLocation {
    /// A top-level location placed directly in `room_id`.
    pub fn in_room(name: LocationName, room_id: RoomId) -> Self {
        Self {
            name,
            room_id: Some(room_id),
            ..Self::default()
        }
    }

    /// A sublocation nested under `parent_id`.
    pub fn under(name: LocationName, parent_id: LocationId) -> Self {
        Self {
            name,
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    pub(crate) fn into_location(self, id: LocationId) -> Location {
        Location {
            id,
            name: self.name,
            description: self.description,
            room_id: self.room_id,
            parent_id: self.parent_id,
        }
    }
}

/// Full replacement state for an existing [`Location`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationUpdate {
    pub name: LocationName,
    pub description: Option<Description>,
    pub room_id: Option<RoomId>,
    pub parent_id: Option<LocationId>,
}

impl From<&Location> for LocationUpdate {
    fn from(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            description: location.description.clone(),
            room_id: location.room_id,
            parent_id: location.parent_id,
        }
    }
}
