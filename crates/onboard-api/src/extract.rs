use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use tracing::debug;

use onboard_core::OnboardingError;
use onboard_types::models::FieldErrors;

use crate::error::ApiError;

/// `Json<T>` whose rejections use the API error body instead of axum's
/// plain-text responses.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                Err(ApiError(OnboardingError::Validation(rejection_fields(
                    &rejection,
                ))))
            }
        }
    }
}

/// Keys the rejection by the offending field when serde names one.
fn rejection_fields(rejection: &JsonRejection) -> FieldErrors {
    let text = rejection.body_text();
    match rejection {
        JsonRejection::JsonDataError(_) => {
            if let Some(field) = quoted_after(&text, "missing field `") {
                FieldErrors::single(field, format!("{} is required", field))
            } else if let Some(field) = quoted_after(&text, "unknown field `") {
                FieldErrors::single(field, format!("{} is not a known field", field))
            } else {
                FieldErrors::single("request", text)
            }
        }
        JsonRejection::MissingJsonContentType(_) => {
            FieldErrors::single("request", "Expected a JSON request body")
        }
        _ => FieldErrors::single("request", "Request body is not valid JSON"),
    }
}

fn quoted_after<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let (_, rest) = text.split_once(prefix)?;
    rest.split_once('`').map(|(field, _)| field)
}
