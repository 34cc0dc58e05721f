use thiserror::Error;

use crate::hierarchy::HierarchyError;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// The mutation breaks a hierarchy rule; the rule is carried unchanged.
    #[error("{0}")]
    Hierarchy(HierarchyError),
    /// Submitted input failed validation.
    #[error("invalid input: {0}")]
    Form(String),
    /// Input could not be turned into domain values.
    #[error("invalid value: {0}")]
    TypeConstraint(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
