use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use shopfloor_store::Job;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// POST /jobs/{id}/resume
///
/// Puts a paused job back in the queue at its existing priority.
pub async fn resume(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, ApiError> {
    Ok(Json(state.store.resume(id).await?))
}
