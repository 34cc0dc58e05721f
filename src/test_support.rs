//! Fixture builders shared by unit tests.

use chrono::DateTime;

use crate::domain::category::Category;
use crate::domain::location::Location;
use crate::domain::room::Room;
use crate::domain::types::{CategoryId, CategoryName, LocationId, LocationName, RoomId, RoomName};

pub fn room(id: i32, name: &str) -> Room {
    Room {
        id: RoomId::new(id).unwrap(),
        name: RoomName::new(name).unwrap(),
        floor: None,
        description: None,
    }
}

pub fn location(id: i32, name: &str, room_id: Option<i32>, parent_id: Option<i32>) -> Location {
    Location {
        id: LocationId::new(id).unwrap(),
        name: LocationName::new(name).unwrap(),
        description: None,
        room_id: room_id.map(|id| RoomId::new(id).unwrap()),
        parent_id: parent_id.map(|id| LocationId::new(id).unwrap()),
    }
}

pub fn category(id: i32, name: &str, parent_id: Option<i32>) -> Category {
    let epoch = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
    Category {
        id: CategoryId::new(id).unwrap(),
        name: CategoryName::new(name).unwrap(),
        description: None,
        parent_id: parent_id.map(|id| CategoryId::new(id).unwrap()),
        created_at: epoch,
        updated_at: epoch,
    }
}
