use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use onboard_core::OnboardingError;
use onboard_core::error::DUPLICATE_EMAIL_MESSAGE;
use onboard_types::api::ErrorResponse;

/// HTTP face of [`OnboardingError`]. Every error body carries the same
/// field-keyed shape the wizard renders locally.
#[derive(Debug)]
pub struct ApiError(pub OnboardingError);

impl From<OnboardingError> for ApiError {
    fn from(e: OnboardingError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            OnboardingError::Validation(errors) => {
                warn!("Validation failed: {}", errors);
                (StatusCode::BAD_REQUEST, "Validation failed")
            }
            OnboardingError::DuplicateEmail => (StatusCode::CONFLICT, DUPLICATE_EMAIL_MESSAGE),
            OnboardingError::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            OnboardingError::StoreUnavailable(e) => {
                // Detail stays in the logs
                error!("Store unavailable: {:#}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable, please try again",
                )
            }
        };

        let body = ErrorResponse {
            error: message.to_string(),
            code: self.0.code().to_string(),
            fields: self.0.field_errors(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(error: OnboardingError) -> (StatusCode, String) {
        let response = ApiError(error).into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn store_failure_hides_detail() {
        let (status, body) = body_of(OnboardingError::StoreUnavailable(anyhow::anyhow!(
            "disk I/O error at /var/lib/onboard.db"
        )))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["code"], "store_unavailable");
        assert_eq!(body["error"], "Service temporarily unavailable, please try again");
        assert!(body.get("fields").is_none());
        assert!(!body.to_string().contains("disk"));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_field_error() {
        let (status, body) = body_of(OnboardingError::DuplicateEmail).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["fields"]["email"], DUPLICATE_EMAIL_MESSAGE);
    }
}
