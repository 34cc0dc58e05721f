use diesel::prelude::*;

use crate::domain::room::{NewRoom as DomainNewRoom, Room as DomainRoom};
use crate::domain::types::{RoomName, TypeConstraintError, optional_text};

/// Diesel model representing the `rooms` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::rooms)]
pub struct Room {
    pub id: i32,
    pub name: String,
    pub floor: Option<String>,
    pub description: Option<String>,
}

/// Insertable/patchable form of [`Room`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::rooms, treat_none_as_null = true)]
pub struct NewRoom {
    pub name: String,
    pub floor: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<Room> for DomainRoom {
    type Error = TypeConstraintError;

    fn try_from(room: Room) -> Result<Self, Self::Error> {
        Ok(Self {
            id: room.id.try_into()?,
            name: RoomName::new(room.name)?,
            floor: optional_text(room.floor)?,
            description: optional_text(room.description)?,
        })
    }
}

impl From<&DomainNewRoom> for NewRoom {
    fn from(room: &DomainNewRoom) -> Self {
        Self {
            name: room.name.as_str().to_string(),
            floor: room.floor.clone().map(String::from),
            description: room.description.clone().map(String::from),
        }
    }
}
