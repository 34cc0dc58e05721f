use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CategoryId, Description, ItemId, ItemName, ItemQuantity, LocationId, MoneyAmount,
    SerialNumber,
};

/// A tracked household item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: ItemName,
    pub description: Option<Description>,
    pub serial_number: Option<SerialNumber>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<MoneyAmount>,
    pub current_value: Option<MoneyAmount>,
    pub quantity: ItemQuantity,
    pub category_id: Option<CategoryId>,
    pub location_id: Option<LocationId>,
    pub notes: Option<Description>,
}

/// Data required to insert or overwrite an [`Item`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewItem {
    pub name: ItemName,
    pub description: Option<Description>,
    pub serial_number: Option<SerialNumber>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<MoneyAmount>,
    pub current_value: Option<MoneyAmount>,
    pub quantity: ItemQuantity,
    pub category_id: Option<CategoryId>,
    pub location_id: Option<LocationId>,
    pub notes: Option<Description>,
}

impl NewItem {
    /// An item with only a name and quantity, optionally placed.
    pub fn simple(name: ItemName, quantity: ItemQuantity, location_id: Option<LocationId>) -> Self {
        Self {
            name,
            description: None,
            serial_number: None,
            purchase_date: None,
            purchase_price: None,
            current_value: None,
            quantity,
            category_id: None,
            location_id,
            notes: None,
        }
    }

    pub(crate) fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            name: self.name,
            description: self.description,
            serial_number: self.serial_number,
            purchase_date: self.purchase_date,
            purchase_price: self.purchase_price,
            current_value: self.current_value,
            quantity: self.quantity,
            category_id: self.category_id,
            location_id: self.location_id,
            notes: self.notes,
        }
    }
}
