use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::location::{LocationUpdate, NewLocation};
use crate::domain::types::{
    LocationId, LocationName, RoomId, TypeConstraintError, optional_text,
};

/// Blank or missing names fall back to the placeholder.
fn location_name(value: Option<String>) -> Result<LocationName, TypeConstraintError> {
    Ok(optional_text(value)?.unwrap_or_default())
}

#[derive(Deserialize, Validate)]
pub struct AddLocationForm {
    /// Only set when restoring a location under a known identity.
    #[validate(range(min = 1))]
    pub id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub room_id: Option<i32>,
    #[validate(range(min = 1))]
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddLocationFormPayload {
    pub location: NewLocation,
}

#[derive(Debug, Error)]
pub enum AddLocationFormError {
    #[error("Add location form validation failed: {0}")]
    Validation(String),
    #[error("Add location form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for AddLocationFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for AddLocationFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<AddLocationForm> for AddLocationFormPayload {
    type Error = AddLocationFormError;

    fn try_from(value: AddLocationForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            location: NewLocation {
                id: value.id.map(LocationId::new).transpose()?,
                name: location_name(value.name)?,
                description: optional_text(value.description)?,
                room_id: value.room_id.map(RoomId::new).transpose()?,
                parent_id: value.parent_id.map(LocationId::new).transpose()?,
            },
        })
    }
}

#[derive(Deserialize, Validate)]
pub struct UpdateLocationForm {
    #[validate(range(min = 1))]
    pub location_id: i32,
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub room_id: Option<i32>,
    #[validate(range(min = 1))]
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateLocationFormPayload {
    pub location_id: LocationId,
    pub update: LocationUpdate,
}

#[derive(Debug, Error)]
pub enum UpdateLocationFormError {
    #[error("Update location form validation failed: {0}")]
    Validation(String),
    #[error("Update location form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for UpdateLocationFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for UpdateLocationFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<UpdateLocationForm> for UpdateLocationFormPayload {
    type Error = UpdateLocationFormError;

    fn try_from(value: UpdateLocationForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            location_id: LocationId::new(value.location_id)?,
            update: LocationUpdate {
                name: location_name(value.name)?,
                description: optional_text(value.description)?,
                room_id: value.room_id.map(RoomId::new).transpose()?,
                parent_id: value.parent_id.map(LocationId::new).transpose()?,
            },
        })
    }
}
