//! Application operations composing the entity stores with the hierarchy
//! engine. Every function is generic over the store traits it needs, so the
//! same code runs against SQLite and the in-memory store.

use crate::repository::RepositoryError;

pub mod categories;
pub mod errors;
pub mod intake;
pub mod items;
pub mod locations;
pub mod rooms;

pub use errors::{ServiceError, ServiceResult};

/// Converts a failed store call, logging it on the way out.
///
/// Rule violations are expected outcomes of user input and are logged at
/// `warn`; anything else is a malfunction.
fn store_failure(action: &str, err: RepositoryError) -> ServiceError {
    match &err {
        RepositoryError::Hierarchy(_)
        | RepositoryError::NotFound { .. }
        | RepositoryError::Conflict { .. } => {
            log::warn!("Rejected attempt to {action}: {err}");
        }
        _ => log::error!("Failed to {action}: {err}"),
    }
    ServiceError::from(err)
}
