use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::room::NewRoom;
use crate::domain::types::{RoomId, RoomName, TypeConstraintError, optional_text};

#[derive(Deserialize, Validate)]
pub struct AddRoomForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(max = 50))]
    pub floor: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddRoomFormPayload {
    pub room: NewRoom,
}

#[derive(Deserialize, Validate)]
pub struct UpdateRoomForm {
    #[validate(range(min = 1))]
    pub room_id: i32,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(max = 50))]
    pub floor: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRoomFormPayload {
    pub room_id: RoomId,
    pub room: NewRoom,
}

/// Shared by both room forms.
#[derive(Debug, Error)]
pub enum RoomFormError {
    #[error("Room form validation failed: {0}")]
    Validation(String),
    #[error("Room form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for RoomFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for RoomFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

fn new_room(
    name: String,
    floor: Option<String>,
    description: Option<String>,
) -> Result<NewRoom, TypeConstraintError> {
    Ok(NewRoom {
        name: RoomName::new(name)?,
        floor: optional_text(floor)?,
        description: optional_text(description)?,
    })
}

impl TryFrom<AddRoomForm> for AddRoomFormPayload {
    type Error = RoomFormError;

    fn try_from(value: AddRoomForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            room: new_room(value.name, value.floor, value.description)?,
        })
    }
}

impl TryFrom<UpdateRoomForm> for UpdateRoomFormPayload {
    type Error = RoomFormError;

    fn try_from(value: UpdateRoomForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            room_id: RoomId::new(value.room_id)?,
            room: new_room(value.name, value.floor, value.description)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_room_trims_and_drops_blank_optionals() {
        let form = AddRoomForm {
            name: " Kitchen ".to_string(),
            floor: Some("  ".to_string()),
            description: Some("Ground floor, north side".to_string()),
        };

        let payload: AddRoomFormPayload = form.try_into().unwrap();
        assert_eq!(payload.room.name.as_str(), "Kitchen");
        assert!(payload.room.floor.is_none());
        assert_eq!(
            payload.room.description.unwrap().as_str(),
            "Ground floor, north side"
        );
    }

    #[test]
    fn update_room_rejects_bad_id() {
        let form = UpdateRoomForm {
            room_id: 0,
            name: "Garage".to_string(),
            floor: None,
            description: None,
        };

        let payload: Result<UpdateRoomFormPayload, _> = form.try_into();
        assert!(matches!(payload, Err(RoomFormError::Validation(_))));
    }

    #[test]
    fn whitespace_name_is_a_type_constraint() {
        let form = AddRoomForm {
            name: "   ".to_string(),
            floor: None,
            description: None,
        };

        let payload: Result<AddRoomFormPayload, _> = form.try_into();
        assert!(matches!(payload, Err(RoomFormError::TypeConstraint(_))));
    }
}
