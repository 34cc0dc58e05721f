use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::{CategoryUpdate, NewCategory};
use crate::domain::types::{
    CategoryId, CategoryName, Description, TypeConstraintError, optional_text,
};

#[derive(Deserialize, Validate)]
pub struct AddCategoryForm {
    /// Only set when restoring a category under a known identity.
    #[validate(range(min = 1))]
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddCategoryFormPayload {
    pub id: Option<CategoryId>,
    pub name: CategoryName,
    pub description: Option<Description>,
    pub parent_id: Option<CategoryId>,
}

impl AddCategoryFormPayload {
    pub fn into_new_category(self) -> NewCategory {
        NewCategory {
            id: self.id,
            description: self.description,
            ..NewCategory::new(self.name, self.parent_id, Utc::now().naive_utc())
        }
    }
}

#[derive(Debug, Error)]
pub enum AddCategoryFormError {
    #[error("Add category form validation failed: {0}")]
    Validation(String),
    #[error("Add category form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for AddCategoryFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for AddCategoryFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<AddCategoryForm> for AddCategoryFormPayload {
    type Error = AddCategoryFormError;

    fn try_from(value: AddCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            id: value.id.map(CategoryId::new).transpose()?,
            name: CategoryName::new(value.name)?,
            description: optional_text(value.description)?,
            parent_id: value.parent_id.map(CategoryId::new).transpose()?,
        })
    }
}

#[derive(Deserialize, Validate)]
pub struct UpdateCategoryForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCategoryFormPayload {
    pub category_id: CategoryId,
    pub update: CategoryUpdate,
}

#[derive(Debug, Error)]
pub enum UpdateCategoryFormError {
    #[error("Update category form validation failed: {0}")]
    Validation(String),
    #[error("Update category form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for UpdateCategoryFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for UpdateCategoryFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<UpdateCategoryForm> for UpdateCategoryFormPayload {
    type Error = UpdateCategoryFormError;

    fn try_from(value: UpdateCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            category_id: CategoryId::new(value.category_id)?,
            update: CategoryUpdate {
                name: CategoryName::new(value.name)?,
                description: optional_text(value.description)?,
                parent_id: value.parent_id.map(CategoryId::new).transpose()?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_category_keeps_parent_and_stamps_times() {
        let form = AddCategoryForm {
            id: None,
            name: " Electronics ".to_string(),
            description: None,
            parent_id: Some(4),
        };

        let payload: AddCategoryFormPayload = form.try_into().unwrap();
        let category = payload.into_new_category();
        assert_eq!(category.name.as_str(), "Electronics");
        assert_eq!(category.parent_id.map(CategoryId::get), Some(4));
        assert_eq!(category.created_at, category.updated_at);
        assert!(category.id.is_none());
    }

    #[test]
    fn add_category_rejects_empty_name() {
        let form = AddCategoryForm {
            id: None,
            name: String::new(),
            description: None,
            parent_id: None,
        };

        let payload: Result<AddCategoryFormPayload, _> = form.try_into();
        assert!(matches!(payload, Err(AddCategoryFormError::Validation(_))));
    }

    #[test]
    fn update_category_moves_to_top_level_without_parent() {
        let form = UpdateCategoryForm {
            category_id: 2,
            name: "Tools".to_string(),
            description: Some("  ".to_string()),
            parent_id: None,
        };

        let payload: UpdateCategoryFormPayload = form.try_into().unwrap();
        assert_eq!(payload.category_id.get(), 2);
        assert!(payload.update.parent_id.is_none());
        assert!(payload.update.description.is_none());
    }
}
