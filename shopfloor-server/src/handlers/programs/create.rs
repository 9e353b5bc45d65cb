use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shopfloor_store::Program;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateProgramRequest {
    pub name: String,
    pub code_text: String,
    #[serde(default)]
    pub estimated_duration_seconds: Option<i64>,
}

/// POST /programs
pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<CreateProgramRequest>,
) -> Result<(StatusCode, Json<Program>), ApiError> {
    let program = state
        .store
        .register_program(&body.name, &body.code_text, body.estimated_duration_seconds)
        .await?;
    Ok((StatusCode::CREATED, Json(program)))
}
