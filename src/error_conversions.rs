//! Error conversion glue between layers.
//!
//! Stores and the domain layer know nothing about service errors; the
//! conversions live here so that services can use `?` throughout.

use crate::domain::types::TypeConstraintError;
use crate::forms::categories::{AddCategoryFormError, UpdateCategoryFormError};
use crate::forms::intake::ExtractedItemFormError;
use crate::forms::items::ItemFormError;
use crate::forms::locations::{AddLocationFormError, UpdateLocationFormError};
use crate::forms::rooms::RoomFormError;
use crate::hierarchy::HierarchyError;
use crate::repository::RepositoryError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<HierarchyError> for ServiceError {
    fn from(val: HierarchyError) -> Self {
        ServiceError::Hierarchy(val)
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(val: RepositoryError) -> Self {
        match val {
            RepositoryError::Hierarchy(err) => ServiceError::Hierarchy(err),
            RepositoryError::NotFound { .. } => ServiceError::NotFound,
            RepositoryError::Conflict { .. } => ServiceError::Form(val.to_string()),
            RepositoryError::Database(_)
            | RepositoryError::Pool(_)
            | RepositoryError::Validation(_)
            | RepositoryError::LockPoisoned => ServiceError::Internal,
        }
    }
}

macro_rules! form_error_into_service_error {
    ($($form_error:ty),+ $(,)?) => {
        $(
            impl From<$form_error> for ServiceError {
                fn from(val: $form_error) -> Self {
                    ServiceError::Form(val.to_string())
                }
            }
        )+
    };
}

form_error_into_service_error!(
    RoomFormError,
    AddLocationFormError,
    UpdateLocationFormError,
    AddCategoryFormError,
    UpdateCategoryFormError,
    ItemFormError,
    ExtractedItemFormError,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{ConstraintViolation, EntityKind};

    #[test]
    fn hierarchy_rejections_keep_their_rule() {
        let err = RepositoryError::from(HierarchyError::from(
            ConstraintViolation::SublocationHasRoom,
        ));
        assert_eq!(
            ServiceError::from(err),
            ServiceError::Hierarchy(ConstraintViolation::SublocationHasRoom.into())
        );
    }

    #[test]
    fn missing_rows_become_not_found() {
        let err = RepositoryError::not_found(EntityKind::Location, 4);
        assert_eq!(ServiceError::from(err), ServiceError::NotFound);
    }

    #[test]
    fn storage_failures_are_internal() {
        assert_eq!(
            ServiceError::from(RepositoryError::LockPoisoned),
            ServiceError::Internal
        );
    }
}
