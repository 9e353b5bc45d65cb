use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use shopfloor_store::QueueSummary;

use crate::{error::ApiError, state::AppState};

/// GET /reports/summary
///
/// Job counts per status and the average run duration over finished jobs.
pub async fn summary(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<QueueSummary>, ApiError> {
    Ok(Json(state.store.summary().await?))
}
