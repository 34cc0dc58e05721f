use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::hierarchy::{EntityKind, HierarchyError};

/// Failures surfaced by entity stores.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    /// A stored row could not be turned into a domain value.
    #[error("invalid stored value: {0}")]
    Validation(#[from] TypeConstraintError),
    /// A mutation was rejected by the hierarchy rules.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    /// The entity addressed by an update does not exist.
    #[error("{entity} {id} does not exist")]
    NotFound { entity: EntityKind, id: i32 },
    /// A caller-supplied identity is already taken.
    #[error("{entity} {id} already exists")]
    Conflict { entity: EntityKind, id: i32 },
    #[error("store lock poisoned")]
    LockPoisoned,
}

impl RepositoryError {
    pub fn not_found(entity: EntityKind, id: impl Into<i32>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// The hierarchy rule behind this error, if it is a rejection.
    pub fn as_hierarchy(&self) -> Option<&HierarchyError> {
        match self {
            Self::Hierarchy(err) => Some(err),
            _ => None,
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
