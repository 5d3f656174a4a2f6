use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use uuid::Uuid;

use onboard_core::OnboardingError;
use onboard_types::api::{CreateUserRequest, DeleteUserResponse, UpdateUserRequest};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::{AppState, run_blocking};

/// Ids that are not UUIDs cannot name a record.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| {
        debug!("Malformed user id '{}'", raw);
        ApiError(OnboardingError::NotFound)
    })
}

/// POST /api/users — step 1: create the record from email + password.
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(&state, move |service| service.create_user(&req)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users — every record, newest first.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = run_blocking(&state, |service| service.list_users()).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let user = run_blocking(&state, move |service| service.get_user(id)).await?;
    Ok(Json(user))
}

/// PUT /api/users/{id} — steps 2 and 3.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let user = run_blocking(&state, move |service| service.update_user(id, &req)).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    run_blocking(&state, move |service| service.delete_user(id)).await?;
    Ok(Json(DeleteUserResponse { deleted: id }))
}
