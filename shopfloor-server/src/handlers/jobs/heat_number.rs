use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use serde::Deserialize;
use shopfloor_store::Job;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct HeatNumberRequest {
    #[serde(default)]
    pub heat_number: Option<String>,
}

/// PUT /jobs/{id}/heat-number
pub async fn set(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<HeatNumberRequest>,
) -> Result<Json<Job>, ApiError> {
    let job = state
        .store
        .set_heat_number(id, body.heat_number.as_deref())
        .await?;
    Ok(Json(job))
}
