use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub job_ids: Vec<Uuid>,
}

/// POST /jobs/reorder
///
/// Applies the given order as priorities 1..N in one atomic batch.
pub async fn reorder(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<ReorderRequest>,
) -> Result<Json<Value>, ApiError> {
    state.store.reorder(&body.job_ids).await?;
    Ok(Json(json!({ "reordered": body.job_ids.len() })))
}
