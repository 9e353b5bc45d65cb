use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use serde::Deserialize;
use shopfloor_store::Job;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct OperatorRequest {
    #[serde(default)]
    pub operator_name: Option<String>,
}

/// PUT /jobs/{id}/operator
pub async fn set(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<OperatorRequest>,
) -> Result<Json<Job>, ApiError> {
    let job = state
        .store
        .set_operator(id, body.operator_name.as_deref())
        .await?;
    Ok(Json(job))
}
