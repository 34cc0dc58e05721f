use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::item::NewItem;
use crate::domain::types::{
    CategoryId, ItemId, ItemName, ItemQuantity, LocationId, MoneyAmount, TypeConstraintError,
    optional_text,
};

#[derive(Deserialize, Validate)]
pub struct ItemForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    #[validate(range(min = 0.0))]
    pub purchase_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub current_value: Option<f64>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 1))]
    pub category_id: Option<i32>,
    #[validate(range(min = 1))]
    pub location_id: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct UpdateItemForm {
    #[validate(range(min = 1))]
    pub item_id: i32,
    #[serde(flatten)]
    #[validate(nested)]
    pub item: ItemForm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemFormPayload {
    pub item: NewItem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateItemFormPayload {
    pub item_id: ItemId,
    pub item: NewItem,
}

#[derive(Debug, Error)]
pub enum ItemFormError {
    #[error("Item form validation failed: {0}")]
    Validation(String),
    #[error("Item form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for ItemFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ItemFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

fn new_item(value: ItemForm) -> Result<NewItem, TypeConstraintError> {
    Ok(NewItem {
        name: ItemName::new(value.name)?,
        description: optional_text(value.description)?,
        serial_number: optional_text(value.serial_number)?,
        purchase_date: value.purchase_date,
        purchase_price: value.purchase_price.map(MoneyAmount::new).transpose()?,
        current_value: value.current_value.map(MoneyAmount::new).transpose()?,
        quantity: value
            .quantity
            .map(ItemQuantity::new)
            .transpose()?
            .unwrap_or_default(),
        category_id: value.category_id.map(CategoryId::new).transpose()?,
        location_id: value.location_id.map(LocationId::new).transpose()?,
        notes: optional_text(value.notes)?,
    })
}

impl TryFrom<ItemForm> for ItemFormPayload {
    type Error = ItemFormError;

    fn try_from(value: ItemForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            item: new_item(value)?,
        })
    }
}

impl TryFrom<UpdateItemForm> for UpdateItemFormPayload {
    type Error = ItemFormError;

    fn try_from(value: UpdateItemForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            item_id: ItemId::new(value.item_id)?,
            item: new_item(value.item)?,
        })
    }
}
