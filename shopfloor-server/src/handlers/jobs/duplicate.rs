use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use shopfloor_store::Job;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// POST /jobs/{id}/duplicate
///
/// Re-enqueues a copy of the job, typically from the archive.
pub async fn duplicate(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    let job = state.store.duplicate(id).await?;
    Ok((StatusCode::CREATED, Json(job)))
}
