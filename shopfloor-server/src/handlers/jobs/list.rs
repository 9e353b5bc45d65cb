use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use shopfloor_store::JobWithProgram;

use crate::{error::ApiError, state::AppState};

/// GET /jobs
pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<JobWithProgram>>, ApiError> {
    Ok(Json(state.store.list_jobs().await?))
}
