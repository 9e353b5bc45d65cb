use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use serde::Deserialize;
use shopfloor_store::Program;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct UpdateProgramRequest {
    pub name: String,
    pub code_text: String,
    #[serde(default)]
    pub estimated_duration_seconds: Option<i64>,
}

/// PUT /programs/{id}
pub async fn update(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProgramRequest>,
) -> Result<Json<Program>, ApiError> {
    let program = state
        .store
        .update_program(id, &body.name, &body.code_text, body.estimated_duration_seconds)
        .await?;
    Ok(Json(program))
}
