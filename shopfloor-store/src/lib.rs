//! Program and job repository for the shopfloor backend.
//!
//! [`JobStore`] is the single source of truth for job status and queue
//! ordering. Operator-facing collaborators and the queue worker never talk to
//! each other directly: control requests (pause/resume/cancel/reorder) are
//! store writes, and the worker observes them by polling. Status transitions
//! go through [`JobStore::set_status`], which enforces the job state machine
//! inside a transaction.

mod error;
mod jobs;
mod programs;
mod reports;
mod types;

pub use error::StoreError;
pub use reports::QueueSummary;
pub use types::{
    Job, JobAttributes, JobStatus, JobWithProgram, Program, QueuedJob, StatusFields,
};

use shopfloor_db::DbPool;

/// Repository handle over the shared connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct JobStore {
    pool: DbPool,
}

impl JobStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Current UTC time as RFC 3339 with fixed microsecond width, so the stored
/// text sorts chronologically.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
