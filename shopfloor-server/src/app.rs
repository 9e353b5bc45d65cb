use std::sync::Arc;

use axum::{
    extract::Extension,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use sqlx::Connection;

use crate::{handlers, state::AppState};

/// Build the primary axum router with the provided shared application state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/programs",
            post(handlers::programs::create::create).get(handlers::programs::list::list),
        )
        .route(
            "/programs/{id}",
            get(handlers::programs::get::get).put(handlers::programs::update::update),
        )
        .route(
            "/jobs",
            post(handlers::jobs::create::create).get(handlers::jobs::list::list),
        )
        .route("/jobs/reorder", post(handlers::jobs::reorder::reorder))
        .route("/jobs/{id}", get(handlers::jobs::get::get))
        .route("/jobs/{id}/duplicate", post(handlers::jobs::duplicate::duplicate))
        .route("/jobs/{id}/pause", post(handlers::jobs::pause::pause))
        .route("/jobs/{id}/resume", post(handlers::jobs::resume::resume))
        .route("/jobs/{id}/cancel", post(handlers::jobs::cancel::cancel))
        .route("/jobs/{id}/heat-number", put(handlers::jobs::heat_number::set))
        .route("/jobs/{id}/operator", put(handlers::jobs::operator::set))
        .route("/archive", get(handlers::jobs::archive::list))
        .route("/reports/summary", get(handlers::reports::summary::summary))
        .route("/reports/recent", get(handlers::reports::recent::recent))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .layer(Extension(state))
}

async fn health_handler() -> impl IntoResponse {
    // Liveness: always 200 while the process is up.
    (axum::http::StatusCode::OK, "OK")
}

async fn ready_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    // Readiness checks that the database answers.
    match state.store.pool().acquire().await {
        Ok(mut conn) => match conn.ping().await {
            Ok(()) => (axum::http::StatusCode::OK, "OK"),
            Err(_) => (axum::http::StatusCode::SERVICE_UNAVAILABLE, "database unreachable"),
        },
        Err(_) => (axum::http::StatusCode::SERVICE_UNAVAILABLE, "database unreachable"),
    }
}
