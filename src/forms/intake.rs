//! Tuples handed over by the external item extraction step.
//!
//! The extractor emits `{item_name, quantity, room_name, location_name}`
//! records; CSV files use the shorter `name,quantity,room,location` header,
//! which the aliases below accept as well.

use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{
    ItemName, ItemQuantity, LocationName, RoomName, TypeConstraintError, optional_text,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExtractedItemForm {
    #[serde(alias = "name")]
    #[validate(length(min = 1, max = 200))]
    pub item_name: String,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[serde(default, alias = "room")]
    pub room_name: Option<String>,
    #[serde(default, alias = "location")]
    pub location_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedItem {
    pub item_name: ItemName,
    pub quantity: ItemQuantity,
    pub room_name: Option<RoomName>,
    pub location_name: Option<LocationName>,
}

#[derive(Debug, Error)]
pub enum ExtractedItemFormError {
    #[error("Extracted item validation failed: {0}")]
    Validation(String),
    #[error("Extracted item contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for ExtractedItemFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ExtractedItemFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<ExtractedItemForm> for ExtractedItem {
    type Error = ExtractedItemFormError;

    fn try_from(value: ExtractedItemForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            item_name: ItemName::new(value.item_name)?,
            quantity: value
                .quantity
                .map(ItemQuantity::new)
                .transpose()?
                .unwrap_or_default(),
            room_name: optional_text(value.room_name)?,
            location_name: optional_text(value.location_name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_extractor_json_with_nulls() {
        let form: ExtractedItemForm = serde_json::from_str(
            r#"{"item_name": "Batteries", "quantity": 4, "room_name": null, "location_name": null}"#,
        )
        .unwrap();

        let item = ExtractedItem::try_from(form).unwrap();
        assert_eq!(item.item_name.as_str(), "Batteries");
        assert_eq!(item.quantity.get(), 4);
        assert!(item.room_name.is_none());
        assert!(item.location_name.is_none());
    }

    #[test]
    fn accepts_short_field_names() {
        let form: ExtractedItemForm = serde_json::from_str(
            r#"{"name": "Flour", "room": "Kitchen", "location": "  "}"#,
        )
        .unwrap();

        let item = ExtractedItem::try_from(form).unwrap();
        assert_eq!(item.quantity.get(), 1);
        assert_eq!(item.room_name.unwrap().as_str(), "Kitchen");
        assert!(item.location_name.is_none());
    }

    #[test]
    fn rejects_blank_item_name() {
        let form = ExtractedItemForm {
            item_name: "   ".to_string(),
            quantity: Some(1),
            room_name: None,
            location_name: None,
        };

        assert!(matches!(
            ExtractedItem::try_from(form),
            Err(ExtractedItemFormError::TypeConstraint(_))
        ));
    }
}
