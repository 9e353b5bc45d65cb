//! Row types and the job state machine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a job.
///
/// `queued` and `running` are the active states, `paused` is the operator
/// hold state, and the remaining three are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Paused,
    Completed,
    Failed,
    Canceled,
}

impl JobStatus {
    /// Returns true if this status accepts no further transitions.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }

    /// The job state machine. Claims come from the worker, pause/resume/cancel
    /// from operator requests, completed/failed from the adapter outcome.
    /// Everything not listed here is rejected.
    pub const fn can_transition(self, to: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, to),
            (Queued, Running)
                | (Running, Paused)
                | (Paused, Queued)
                | (Queued, Canceled)
                | (Running, Canceled)
                | (Running, Completed)
                | (Running, Failed)
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered machine program.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Program {
    pub id: Uuid,
    pub name: String,
    pub code_text: String,
    pub estimated_duration_seconds: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// One queued execution request against a program.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub program_id: Uuid,
    pub status: JobStatus,
    pub priority: i64,
    pub queued_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub machine_name: Option<String>,
    pub error_message: Option<String>,
    pub operator_name: Option<String>,
    pub heat_number: Option<String>,
    pub cut_type: Option<String>,
    pub thickness: Option<String>,
    pub material: Option<String>,
}

/// A job joined with its program name, for list and report read paths.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobWithProgram {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: Job,
    pub program_name: String,
}

/// The head of the queue as seen by the worker: the job plus everything the
/// adapter needs (program payload and nominal duration).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QueuedJob {
    pub id: Uuid,
    pub program_id: Uuid,
    pub program_name: String,
    pub code_text: String,
    pub estimated_duration_seconds: Option<i64>,
    pub priority: i64,
}

/// Operator-supplied traceability attributes, independent of execution state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobAttributes {
    pub operator_name: Option<String>,
    pub heat_number: Option<String>,
    pub cut_type: Option<String>,
    pub thickness: Option<String>,
    pub material: Option<String>,
}

/// Target-status side-channel fields for [`JobStore::set_status`](crate::JobStore::set_status).
#[derive(Debug, Clone, Default)]
pub struct StatusFields {
    pub machine_name: Option<String>,
    pub error_message: Option<String>,
}

impl StatusFields {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn machine(name: impl Into<String>) -> Self {
        Self {
            machine_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::default()
        }
    }
}
