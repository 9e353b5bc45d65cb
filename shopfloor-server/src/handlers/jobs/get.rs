use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use shopfloor_store::Job;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// GET /jobs/{id}
pub async fn get(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, ApiError> {
    Ok(Json(state.store.get_job(id).await?))
}
