use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query};
use axum::Json;
use shopfloor_store::JobWithProgram;

use crate::{error::ApiError, state::AppState};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 200;

/// GET /reports/recent?limit=N
pub async fn recent(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<Vec<JobWithProgram>>, ApiError> {
    let params = query.map(|value| value.0).unwrap_or_default();
    let limit = match params.get("limit") {
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|n| (1..=MAX_LIMIT).contains(n))
            .ok_or_else(|| {
                ApiError::bad_request(format!("limit must be an integer in 1..={MAX_LIMIT}"))
            })?,
        None => DEFAULT_LIMIT,
    };
    Ok(Json(state.store.recent(limit).await?))
}
