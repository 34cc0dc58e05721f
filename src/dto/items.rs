use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::item::Item;

/// Item as listed to users, with its placement spelled out by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDto {
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
    pub location_name: Option<String>,
    pub room_name: Option<String>,
    pub notes: Option<String>,
}

impl ItemDto {
    pub fn placed(mut self, location_name: Option<String>, room_name: Option<String>) -> Self {
        self.location_name = location_name;
        self.room_name = room_name;
        self
    }
}

impl From<Item> for ItemDto {
    fn from(value: Item) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.into_inner(),
            description: value.description.map(|d| d.into_inner()),
            serial_number: value.serial_number.map(|s| s.into_inner()),
            purchase_date: value.purchase_date,
            purchase_price: value.purchase_price.map(f64::from),
            current_value: value.current_value.map(f64::from),
            quantity: value.quantity.get(),
            category_id: value.category_id.map(|id| id.get()),
            location_id: value.location_id.map(|id| id.get()),
            location_name: None,
            room_name: None,
            notes: value.notes.map(|n| n.into_inner()),
        }
    }
}
