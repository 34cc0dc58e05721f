use crate::domain::category::Category;
use crate::domain::types::CategoryId;
use crate::dto::categories::CategoryDto;
use crate::forms::categories::{AddCategoryFormPayload, UpdateCategoryFormPayload};
use crate::hierarchy::{CategoryTreeNode, build_category_forest};
use crate::repository::{CategoryReader, CategoryWriter};

use super::{ServiceError, ServiceResult, store_failure};

pub fn list_categories<R>(repo: &R) -> ServiceResult<Vec<CategoryDto>>
where
    R: CategoryReader,
{
    match repo.list_categories() {
        Ok(categories) => Ok(categories.into_iter().map(CategoryDto::from).collect()),
        Err(e) => Err(store_failure("list categories", e)),
    }
}

/// Categories arranged as a forest of top-level categories.
pub fn category_forest<R>(repo: &R) -> ServiceResult<Vec<CategoryTreeNode>>
where
    R: CategoryReader,
{
    let categories = repo
        .list_categories()
        .map_err(|e| store_failure("list categories", e))?;

    build_category_forest(&categories).map_err(|e| {
        log::error!("Failed to build category forest: {e}");
        ServiceError::from(e)
    })
}

pub fn add_category<R>(payload: AddCategoryFormPayload, repo: &R) -> ServiceResult<Category>
where
    R: CategoryWriter,
{
    let category = repo
        .create_category(&payload.into_new_category())
        .map_err(|e| store_failure("create category", e))?;
    log::info!("Created category {} '{}'", category.id, category.name);
    Ok(category)
}

pub fn update_category<R>(payload: UpdateCategoryFormPayload, repo: &R) -> ServiceResult<Category>
where
    R: CategoryWriter,
{
    repo.update_category(payload.category_id, &payload.update)
        .map_err(|e| store_failure("update category", e))
}

/// Deletes a category. Its children move to the top level and its items
/// become uncategorized. Refused when a child would duplicate a top-level
/// name.
pub fn delete_category<R>(category_id: i32, repo: &R) -> ServiceResult<()>
where
    R: CategoryWriter,
{
    let category_id = CategoryId::new(category_id).map_err(|_| ServiceError::NotFound)?;

    match repo.delete_category(category_id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => Err(store_failure("delete category", e)),
    }
}
