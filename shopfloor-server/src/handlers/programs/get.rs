use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use shopfloor_store::Program;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// GET /programs/{id}
pub async fn get(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Program>, ApiError> {
    Ok(Json(state.store.get_program(id).await?))
}
