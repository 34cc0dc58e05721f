use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, CategoryName, Description};

/// Item category. Categories nest through `parent_id`; a name is unique
/// among the children of one parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub description: Option<Description>,
    pub parent_id: Option<CategoryId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub id: Option<CategoryId>,
    pub name: CategoryName,
    pub description: Option<Description>,
    pub parent_id: Option<CategoryId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewCategory {
    /// A category with store-assigned identity, stamped with `now`.
    pub fn new(name: CategoryName, parent_id: Option<CategoryId>, now: NaiveDateTime) -> Self {
        Self {
            id: None,
            name,
            description: None,
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            name: self.name,
            description: self.description,
            parent_id: self.parent_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Replacement state for an existing [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryUpdate {
    pub name: CategoryName,
    pub description: Option<Description>,
    pub parent_id: Option<CategoryId>,
}
