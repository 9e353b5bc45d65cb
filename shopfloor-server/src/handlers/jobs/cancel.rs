use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use shopfloor_store::Job;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// POST /jobs/{id}/cancel
///
/// Terminal for the job. Allowed from queued and running only; a paused job
/// must be resumed first.
pub async fn cancel(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, ApiError> {
    Ok(Json(state.store.cancel(id).await?))
}
