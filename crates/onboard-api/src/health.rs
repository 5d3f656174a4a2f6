use axum::{Json, extract::State, response::IntoResponse};

use onboard_types::api::HealthResponse;

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// GET /api/health — checks the store answers.
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    run_blocking(&state, |service| service.health()).await?;
    Ok(Json(HealthResponse {
        status: "ok".into(),
        timestamp: chrono::Utc::now(),
    }))
}
