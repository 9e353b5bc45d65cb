use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query};
use axum::Json;
use shopfloor_store::JobWithProgram;

use crate::{error::ApiError, state::AppState};

/// GET /archive?q=<program-name-substring>
///
/// Finished jobs (completed, failed, canceled), newest first.
pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<Vec<JobWithProgram>>, ApiError> {
    let params = query.map(|value| value.0).unwrap_or_default();
    let search = params.get("q").map(|s| s.as_str());
    Ok(Json(state.store.list_archive(search).await?))
}
