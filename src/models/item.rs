use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::item::{Item as DomainItem, NewItem as DomainNewItem};
use crate::domain::types::{
    ItemName, ItemQuantity, MoneyAmount, TypeConstraintError, optional_text,
};

/// Diesel model representing the `items` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::items)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<f64>,
    pub current_value: Option<f64>,
    pub quantity: i32,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    pub notes: Option<String>,
}

/// Insertable/patchable form of [`Item`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::items, treat_none_as_null = true)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<f64>,
    pub current_value: Option<f64>,
    pub quantity: i32,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    pub notes: Option<String>,
}

impl TryFrom<Item> for DomainItem {
    type Error = TypeConstraintError;

    fn try_from(item: Item) -> Result<Self, Self::Error> {
        Ok(Self {
            id: item.id.try_into()?,
            name: ItemName::new(item.name)?,
            description: optional_text(item.description)?,
            serial_number: optional_text(item.serial_number)?,
            purchase_date: item.purchase_date,
            purchase_price: item.purchase_price.map(MoneyAmount::new).transpose()?,
            current_value: item.current_value.map(MoneyAmount::new).transpose()?,
            quantity: ItemQuantity::new(item.quantity)?,
            category_id: item.category_id.map(TryInto::try_into).transpose()?,
            location_id: item.location_id.map(TryInto::try_into).transpose()?,
            notes: optional_text(item.notes)?,
        })
    }
}

impl From<&DomainNewItem> for NewItem {
    fn from(item: &DomainNewItem) -> Self {
        Self {
            name: item.name.as_str().to_string(),
            description: item.description.clone().map(String::from),
            serial_number: item.serial_number.clone().map(String::from),
            purchase_date: item.purchase_date,
            purchase_price: item.purchase_price.map(f64::from),
            current_value: item.current_value.map(f64::from),
            quantity: item.quantity.get(),
            category_id: item.category_id.map(|id| id.get()),
            location_id: item.location_id.map(|id| id.get()),
            notes: item.notes.clone().map(String::from),
        }
    }
}
