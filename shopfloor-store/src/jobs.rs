//! Job queue operations: enqueue, queue ordering, the status state machine,
//! control requests, and traceability setters.

use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{Job, JobAttributes, JobStatus, JobWithProgram, QueuedJob, StatusFields};
use crate::{now_rfc3339, JobStore};

pub(crate) const DEFAULT_PRIORITY: i64 = 100;

const JOB_COLUMNS: &str = "id, program_id, status, priority, queued_at, started_at, finished_at, \
     machine_name, error_message, operator_name, heat_number, cut_type, thickness, material";

impl JobStore {
    /// Enqueue a new job against an existing program. Priority defaults to
    /// 100; lower values are more urgent.
    pub async fn enqueue(
        &self,
        program_id: Uuid,
        priority: Option<i64>,
        attributes: JobAttributes,
    ) -> Result<Job, StoreError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM programs WHERE id = ?")
            .bind(program_id)
            .fetch_optional(self.pool())
            .await?;
        if exists.is_none() {
            return Err(StoreError::ProgramNotFound(program_id));
        }

        let id = Uuid::new_v4();
        let priority = priority.unwrap_or(DEFAULT_PRIORITY);
        sqlx::query(
            "INSERT INTO jobs (id, program_id, status, priority, queued_at, \
             operator_name, heat_number, cut_type, thickness, material) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(program_id)
        .bind(JobStatus::Queued)
        .bind(priority)
        .bind(now_rfc3339())
        .bind(&attributes.operator_name)
        .bind(&attributes.heat_number)
        .bind(&attributes.cut_type)
        .bind(&attributes.thickness)
        .bind(&attributes.material)
        .execute(self.pool())
        .await?;

        tracing::info!(job_id = %id, program_id = %program_id, priority, "job enqueued");
        self.get_job(id).await
    }

    /// Re-enqueue a copy of an existing job, carrying its priority and
    /// traceability attributes.
    pub async fn duplicate(&self, job_id: Uuid) -> Result<Job, StoreError> {
        let source = self.get_job(job_id).await?;
        let attributes = JobAttributes {
            operator_name: source.operator_name,
            heat_number: source.heat_number,
            cut_type: source.cut_type,
            thickness: source.thickness,
            material: source.material,
        };
        self.enqueue(source.program_id, Some(source.priority), attributes)
            .await
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job, StoreError> {
        sqlx::query_as::<_, Job>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(StoreError::JobNotFound(id))
    }

    /// All jobs joined with their program names, grouped by status and then
    /// queue order.
    pub async fn list_jobs(&self) -> Result<Vec<JobWithProgram>, StoreError> {
        let jobs = sqlx::query_as::<_, JobWithProgram>(
            "SELECT j.*, p.name AS program_name \
             FROM jobs j JOIN programs p ON p.id = j.program_id \
             ORDER BY j.status, j.priority, j.queued_at",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(jobs)
    }

    /// Terminal jobs, most recently finished first, optionally filtered by a
    /// program-name substring.
    pub async fn list_archive(&self, search: Option<&str>) -> Result<Vec<JobWithProgram>, StoreError> {
        let base = "SELECT j.*, p.name AS program_name \
             FROM jobs j JOIN programs p ON p.id = j.program_id \
             WHERE j.status IN ('completed', 'failed', 'canceled')";
        let jobs = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                sqlx::query_as::<_, JobWithProgram>(&format!(
                    "{base} AND p.name LIKE ? ORDER BY j.finished_at DESC"
                ))
                .bind(format!("%{needle}%"))
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, JobWithProgram>(&format!(
                    "{base} ORDER BY j.finished_at DESC"
                ))
                .fetch_all(self.pool())
                .await?
            }
        };
        Ok(jobs)
    }

    /// The queued job with the smallest priority; ties broken by earliest
    /// `queued_at`, then smallest id. Computed fresh on every call, since
    /// priorities change between polls.
    pub async fn next_queued(&self) -> Result<Option<QueuedJob>, StoreError> {
        let next = sqlx::query_as::<_, QueuedJob>(
            "SELECT j.id, j.program_id, p.name AS program_name, p.code_text, \
                    p.estimated_duration_seconds, j.priority \
             FROM jobs j JOIN programs p ON p.id = j.program_id \
             WHERE j.status = 'queued' \
             ORDER BY j.priority ASC, j.queued_at ASC, j.id ASC \
             LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await?;
        Ok(next)
    }

    /// Uncached single-column status read; the worker's control probe calls
    /// this every signal poll.
    pub async fn status_of(&self, id: Uuid) -> Result<Option<JobStatus>, StoreError> {
        let status = sqlx::query_scalar::<_, JobStatus>("SELECT status FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(status)
    }

    /// Commit a status transition, enforcing the state machine.
    ///
    /// Runs in a transaction with the `UPDATE` guarded by the expected current
    /// status, so a concurrent transition (e.g. an operator cancel racing the
    /// worker claim) can never be overwritten. Side effects by target:
    /// `running` stamps `started_at` and the machine name and clears any prior
    /// error; terminal states stamp `finished_at` and keep an existing error
    /// message unless a new one is supplied.
    pub async fn set_status(
        &self,
        id: Uuid,
        target: JobStatus,
        fields: StatusFields,
    ) -> Result<Job, StoreError> {
        let mut tx = self.pool().begin().await?;

        let current = sqlx::query_scalar::<_, JobStatus>("SELECT status FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::JobNotFound(id))?;

        if !current.can_transition(target) {
            return Err(StoreError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        let now = now_rfc3339();
        let rows = match target {
            JobStatus::Running => {
                sqlx::query(
                    "UPDATE jobs SET status = ?, started_at = ?, machine_name = ?, error_message = NULL \
                     WHERE id = ? AND status = ?",
                )
                .bind(target)
                .bind(&now)
                .bind(&fields.machine_name)
                .bind(id)
                .bind(current)
                .execute(&mut *tx)
                .await?
                .rows_affected()
            }
            JobStatus::Completed | JobStatus::Failed | JobStatus::Canceled => {
                sqlx::query(
                    "UPDATE jobs SET status = ?, finished_at = ?, \
                     error_message = COALESCE(?, error_message) \
                     WHERE id = ? AND status = ?",
                )
                .bind(target)
                .bind(&now)
                .bind(&fields.error_message)
                .bind(id)
                .bind(current)
                .execute(&mut *tx)
                .await?
                .rows_affected()
            }
            JobStatus::Queued | JobStatus::Paused => {
                sqlx::query("UPDATE jobs SET status = ? WHERE id = ? AND status = ?")
                    .bind(target)
                    .bind(id)
                    .bind(current)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected()
            }
        };

        if rows != 1 {
            // The row changed under us inside the transaction window.
            return Err(StoreError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        tx.commit().await?;
        tracing::debug!(job_id = %id, from = %current, to = %target, "job status transition");
        self.get_job(id).await
    }

    /// Operator pause request. Only a running job can be paused.
    pub async fn pause(&self, id: Uuid) -> Result<Job, StoreError> {
        self.set_status(id, JobStatus::Paused, StatusFields::none())
            .await
    }

    /// Operator resume request. The job re-enters the queue at its existing
    /// priority; the worker claims it again, it does not jump to `running`.
    pub async fn resume(&self, id: Uuid) -> Result<Job, StoreError> {
        self.set_status(id, JobStatus::Queued, StatusFields::none())
            .await
    }

    /// Operator cancel request. Terminal: stamps `finished_at` and a non-null
    /// error message recording operator intent.
    pub async fn cancel(&self, id: Uuid) -> Result<Job, StoreError> {
        self.set_status(
            id,
            JobStatus::Canceled,
            StatusFields::error("canceled by operator"),
        )
        .await
    }

    /// Assign priorities 1..N in the given order, as a single atomic unit: a
    /// reader never observes a partially-applied reorder, and an unknown id
    /// rolls the whole batch back.
    pub async fn reorder(&self, ordered_ids: &[Uuid]) -> Result<(), StoreError> {
        if ordered_ids.is_empty() {
            return Err(StoreError::validation("job id list must not be empty"));
        }
        let mut seen = std::collections::HashSet::with_capacity(ordered_ids.len());
        for id in ordered_ids {
            if !seen.insert(id) {
                return Err(StoreError::validation(format!(
                    "duplicate job id in reorder request: {id}"
                )));
            }
        }

        let mut tx = self.pool().begin().await?;
        for (index, id) in ordered_ids.iter().enumerate() {
            let rows = sqlx::query("UPDATE jobs SET priority = ? WHERE id = ?")
                .bind((index + 1) as i64)
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            if rows == 0 {
                // Dropping the transaction rolls back the priorities already
                // assigned in this batch.
                return Err(StoreError::JobNotFound(*id));
            }
        }
        tx.commit().await?;

        tracing::info!(count = ordered_ids.len(), "queue reordered");
        Ok(())
    }

    /// Overwrite the heat/batch traceability code. No transition check.
    pub async fn set_heat_number(&self, id: Uuid, value: Option<&str>) -> Result<Job, StoreError> {
        let rows = sqlx::query("UPDATE jobs SET heat_number = ? WHERE id = ?")
            .bind(value)
            .bind(id)
            .execute(self.pool())
            .await?
            .rows_affected();
        if rows == 0 {
            return Err(StoreError::JobNotFound(id));
        }
        self.get_job(id).await
    }

    /// Overwrite the operator name. No transition check.
    pub async fn set_operator(&self, id: Uuid, value: Option<&str>) -> Result<Job, StoreError> {
        let rows = sqlx::query("UPDATE jobs SET operator_name = ? WHERE id = ?")
            .bind(value)
            .bind(id)
            .execute(self.pool())
            .await?
            .rows_affected();
        if rows == 0 {
            return Err(StoreError::JobNotFound(id));
        }
        self.get_job(id).await
    }
}
