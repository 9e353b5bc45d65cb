use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shopfloor_store::{Job, JobAttributes};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub program_id: Uuid,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(flatten)]
    pub attributes: JobAttributes,
}

/// POST /jobs
pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    let job = state
        .store
        .enqueue(body.program_id, body.priority, body.attributes)
        .await?;
    Ok((StatusCode::CREATED, Json(job)))
}
