use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, services::reassign::ReassignError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Group reassignment reported a hard failure.
    #[error("group reassignment failed")]
    Reassign(#[source] ReassignError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {}", err))
    }
}

impl From<ReassignError> for ServiceError {
    fn from(err: ReassignError) -> Self {
        ServiceError::Reassign(err)
    }
}
