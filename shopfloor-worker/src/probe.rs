//! Store-backed control probe.

use async_trait::async_trait;
use shopfloor_machine::{ControlProbe, ControlSignal};
use shopfloor_store::{JobStatus, JobStore, StatusFields, StoreError};
use uuid::Uuid;

/// Translates the persisted status of one job into control signals for the
/// adapter. This is the read half of status-as-control: operators write
/// pause/resume/cancel into the store, the probe surfaces them mid-run.
pub(crate) struct StoreProbe {
    store: JobStore,
    job_id: Uuid,
    machine_name: String,
}

impl StoreProbe {
    pub(crate) fn new(store: JobStore, job_id: Uuid, machine_name: impl Into<String>) -> Self {
        Self {
            store,
            job_id,
            machine_name: machine_name.into(),
        }
    }

    /// A `queued` status mid-run means the operator resumed a paused job; the
    /// worker re-claims it so the eventual completion is a legal
    /// running -> terminal transition.
    async fn reclaim(&self) -> ControlSignal {
        match self
            .store
            .set_status(
                self.job_id,
                JobStatus::Running,
                StatusFields::machine(&self.machine_name),
            )
            .await
        {
            Ok(_) => ControlSignal::Continue,
            // Someone else moved the row first; the next poll sees the truth.
            Err(StoreError::InvalidTransition { .. }) => ControlSignal::Continue,
            Err(err) => {
                tracing::warn!(job_id = %self.job_id, %err, "re-claim after resume failed");
                ControlSignal::Continue
            }
        }
    }
}

#[async_trait]
impl ControlProbe for StoreProbe {
    async fn poll(&self) -> ControlSignal {
        match self.store.status_of(self.job_id).await {
            Ok(Some(JobStatus::Canceled)) => ControlSignal::Cancel,
            Ok(Some(JobStatus::Paused)) => ControlSignal::Pause,
            Ok(Some(JobStatus::Queued)) => self.reclaim().await,
            Ok(Some(_)) => ControlSignal::Continue,
            Ok(None) => {
                tracing::warn!(job_id = %self.job_id, "job row vanished mid-run");
                ControlSignal::Continue
            }
            Err(err) => {
                // A transient read failure must not abort the cut.
                tracing::warn!(job_id = %self.job_id, %err, "control poll failed");
                ControlSignal::Continue
            }
        }
    }
}
