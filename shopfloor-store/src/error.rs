use thiserror::Error;
use uuid::Uuid;

use crate::types::JobStatus;

/// Errors reported by [`JobStore`](crate::JobStore) operations.
///
/// `ProgramNotFound`/`JobNotFound` and `InvalidTransition` leave the store
/// unmutated; `Validation` is rejected before any query runs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("program not found: {0}")]
    ProgramNotFound(Uuid),

    #[error("job not found: {0}")]
    JobNotFound(Uuid),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
