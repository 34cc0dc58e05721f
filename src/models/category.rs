use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::category::{
    Category as DomainCategory, CategoryUpdate, NewCategory as DomainNewCategory,
};
use crate::domain::types::{CategoryName, TypeConstraintError, optional_text};

/// Diesel model representing the `categories` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::categories)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Category`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory {
    pub id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Update of the mutable columns of [`Category`].
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::categories, treat_none_as_null = true)]
pub struct CategoryChangeset {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: category.id.try_into()?,
            name: CategoryName::new(category.name)?,
            description: optional_text(category.description)?,
            parent_id: category.parent_id.map(TryInto::try_into).transpose()?,
            created_at: category.created_at,
            updated_at: category.updated_at,
        })
    }
}

impl From<&DomainNewCategory> for NewCategory {
    fn from(category: &DomainNewCategory) -> Self {
        Self {
            id: category.id.map(|id| id.get()),
            name: category.name.as_str().to_string(),
            description: category.description.clone().map(String::from),
            parent_id: category.parent_id.map(|id| id.get()),
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

impl CategoryChangeset {
    pub fn new(update: &CategoryUpdate, updated_at: NaiveDateTime) -> Self {
        Self {
            name: update.name.as_str().to_string(),
            description: update.description.clone().map(String::from),
            parent_id: update.parent_id.map(|id| id.get()),
            updated_at,
        }
    }
}
