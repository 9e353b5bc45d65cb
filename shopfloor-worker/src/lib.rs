//! The queue worker.
//!
//! A single background task polls the store for the head of the queue, claims
//! it, and drives it through the machine adapter. All coordination with
//! operator actions happens through job status in the store; the worker holds
//! no queue state of its own. Errors inside one cycle are logged and the loop
//! keeps polling.

use std::sync::Arc;
use std::time::Duration;

use shopfloor_machine::{MachineAdapter, MachineError};
use shopfloor_store::{JobStatus, JobStore, QueuedJob, StatusFields, StoreError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

mod probe;

use probe::StoreProbe;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct QueueWorker {
    store: JobStore,
    adapter: Arc<dyn MachineAdapter>,
    poll_interval: Duration,
}

/// Handle to a spawned worker. Dropping it does not stop the worker; call
/// [`WorkerHandle::shutdown`] for an orderly stop.
pub struct WorkerHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Signal the worker to stop and wait for the current cycle to finish.
    /// A job mid-execution runs to its natural outcome first.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        if let Err(err) = self.join.await {
            tracing::error!(%err, "worker task panicked");
        }
    }
}

impl QueueWorker {
    pub fn new(store: JobStore, adapter: Arc<dyn MachineAdapter>) -> Self {
        Self {
            store,
            adapter,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the queue poll cadence. Tests shrink this to keep wall time
    /// down.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Start the polling loop on the runtime. The worker only ever runs one
    /// job at a time.
    pub fn spawn(self) -> WorkerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            tracing::info!(
                machine = %self.adapter.machine_name(),
                poll_interval_ms = self.poll_interval.as_millis() as u64,
                "queue worker started"
            );
            loop {
                if *stop_rx.borrow() {
                    break;
                }
                match self.process_once().await {
                    Ok(true) => {
                        // Ran a job; check the queue again immediately.
                        continue;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        // Transient store failures must not kill the loop.
                        tracing::error!(%err, "worker cycle failed");
                    }
                }
                tokio::select! {
                    _ = stop_rx.changed() => {}
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
            }
            tracing::info!("queue worker stopped");
        });
        WorkerHandle { stop_tx, join }
    }

    /// One poll cycle: claim the head of the queue and run it to a terminal
    /// outcome. Returns `Ok(true)` if a job was executed.
    pub async fn process_once(&self) -> Result<bool, StoreError> {
        let Some(job) = self.store.next_queued().await? else {
            return Ok(false);
        };
        if !self.claim(&job).await? {
            return Ok(false);
        }

        let duration = self
            .adapter
            .estimate_duration(job.estimated_duration_seconds, &job.code_text);
        tracing::info!(
            job_id = %job.id,
            program = %job.program_name,
            duration_secs = duration.as_secs_f64(),
            "job started"
        );

        let probe = StoreProbe::new(self.store.clone(), job.id, self.adapter.machine_name());
        match self.adapter.execute(duration, &probe).await {
            Ok(()) => self.finalize(&job, JobStatus::Completed, StatusFields::none()).await?,
            Err(MachineError::Canceled) => {
                // The operator's cancel already wrote the terminal row.
                tracing::info!(job_id = %job.id, "job canceled");
            }
            Err(MachineError::Fault(message)) => {
                tracing::warn!(job_id = %job.id, error = %message, "job faulted");
                self.finalize(&job, JobStatus::Failed, StatusFields::error(message))
                    .await?;
            }
        }
        Ok(true)
    }

    /// Claim the job for this worker's machine. The transition guard inside
    /// `set_status` makes the claim transactional: if an operator canceled the
    /// job between the queue read and the claim, the claim loses cleanly.
    async fn claim(&self, job: &QueuedJob) -> Result<bool, StoreError> {
        match self
            .store
            .set_status(
                job.id,
                JobStatus::Running,
                StatusFields::machine(self.adapter.machine_name()),
            )
            .await
        {
            Ok(_) => Ok(true),
            Err(StoreError::InvalidTransition { from, .. }) => {
                tracing::debug!(job_id = %job.id, %from, "claim lost, job no longer queued");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Record the adapter outcome, unless a cancel landed in the meantime.
    async fn finalize(
        &self,
        job: &QueuedJob,
        outcome: JobStatus,
        fields: StatusFields,
    ) -> Result<(), StoreError> {
        match self.store.set_status(job.id, outcome, fields).await {
            Ok(_) => {
                tracing::info!(job_id = %job.id, status = %outcome, "job finished");
                Ok(())
            }
            Err(StoreError::InvalidTransition { from, .. }) => {
                // Cancel raced the outcome write; the operator's word stands.
                tracing::info!(job_id = %job.id, %from, "outcome superseded by concurrent transition");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
