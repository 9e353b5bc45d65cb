//! Aggregate read paths for the reports page.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::StoreError;
use crate::types::JobWithProgram;
use crate::JobStore;

/// Job counts by status plus the average run duration over finished jobs.
#[derive(Debug, Clone, Serialize)]
pub struct QueueSummary {
    pub by_status: BTreeMap<String, i64>,
    pub avg_duration_seconds: Option<f64>,
}

impl JobStore {
    pub async fn summary(&self) -> Result<QueueSummary, StoreError> {
        let counts = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(id) FROM jobs GROUP BY status",
        )
        .fetch_all(self.pool())
        .await?;

        let avg_duration_seconds = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(strftime('%s', finished_at) - strftime('%s', started_at)) \
             FROM jobs WHERE finished_at IS NOT NULL AND started_at IS NOT NULL",
        )
        .fetch_one(self.pool())
        .await?;

        Ok(QueueSummary {
            by_status: counts.into_iter().collect(),
            avg_duration_seconds,
        })
    }

    /// Most recently queued jobs, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<JobWithProgram>, StoreError> {
        let jobs = sqlx::query_as::<_, JobWithProgram>(
            "SELECT j.*, p.name AS program_name \
             FROM jobs j JOIN programs p ON p.id = j.program_id \
             ORDER BY j.queued_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(jobs)
    }
}
