use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use shopfloor_store::Job;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// POST /jobs/{id}/pause
///
/// Writes the hold request into the store; the worker's control probe picks
/// it up within one signal poll.
pub async fn pause(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, ApiError> {
    Ok(Json(state.store.pause(id).await?))
}
