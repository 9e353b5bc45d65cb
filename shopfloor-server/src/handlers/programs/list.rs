use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use shopfloor_store::Program;

use crate::{error::ApiError, state::AppState};

/// GET /programs
pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Program>>, ApiError> {
    Ok(Json(state.store.list_programs().await?))
}
