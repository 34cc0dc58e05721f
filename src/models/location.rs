use diesel::prelude::*;

use crate::domain::location::{
    Location as DomainLocation, LocationUpdate, NewLocation as DomainNewLocation,
};
use crate::domain::types::{LocationName, TypeConstraintError, optional_text};

/// Diesel model representing the `locations` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::locations)]
pub struct Location {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub room_id: Option<i32>,
    pub parent_id: Option<i32>,
}

/// Insertable form of [`Location`]. `id` is left to SQLite when absent.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::locations)]
pub struct NewLocation {
    pub id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub room_id: Option<i32>,
    pub parent_id: Option<i32>,
}

/// Full-row update of [`Location`].
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::locations, treat_none_as_null = true)]
pub struct LocationChangeset {
    pub name: String,
    pub description: Option<String>,
    pub room_id: Option<i32>,
    pub parent_id: Option<i32>,
}

impl TryFrom<Location> for DomainLocation {
    type Error = TypeConstraintError;

    fn try_from(location: Location) -> Result<Self, Self::Error> {
        Ok(Self {
            id: location.id.try_into()?,
            name: LocationName::new(location.name)?,
            description: optional_text(location.description)?,
            room_id: location.room_id.map(TryInto::try_into).transpose()?,
            parent_id: location.parent_id.map(TryInto::try_into).transpose()?,
        })
    }
}

impl From<&DomainNewLocation> for NewLocation {
    fn from(location: &DomainNewLocation) -> Self {
        Self {
            id: location.id.map(|id| id.get()),
            name: location.name.as_str().to_string(),
            description: location.description.clone().map(String::from),
            room_id: location.room_id.map(|id| id.get()),
            parent_id: location.parent_id.map(|id| id.get()),
        }
    }
}

impl From<&LocationUpdate> for LocationChangeset {
    fn from(update: &LocationUpdate) -> Self {
        Self {
            name: update.name.as_str().to_string(),
            description: update.description.clone().map(String::from),
            room_id: update.room_id.map(|id| id.get()),
            parent_id: update.parent_id.map(|id| id.get()),
        }
    }
}
