use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use onboard_types::api::SaveConfigRequest;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::{AppState, run_blocking};

/// GET /api/config — the active configuration, created with defaults on first read.
pub async fn get_config(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let config = run_blocking(&state, |service| service.get_config()).await?;
    Ok(Json(config))
}

/// POST /api/config — append a new configuration and make it active.
///
/// No access control: admin endpoints are open.
pub async fn save_config(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SaveConfigRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let config = run_blocking(&state, move |service| {
        service.save_config(&req.page_2_components, &req.page_3_components)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(config)))
}
