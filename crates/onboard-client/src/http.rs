use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use onboard_core::{Backend, OnboardingError};
use onboard_types::api::{
    CreateUserRequest, DeleteUserResponse, ErrorResponse, SaveConfigRequest, UpdateUserRequest,
};
use onboard_types::models::{FieldErrors, OnboardingConfig, UserRecord};

/// [`Backend`] over the server's JSON API.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, OnboardingError> {
        let response = request.send().await.map_err(unavailable)?;
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(unavailable);
        }

        let body = response.json::<ErrorResponse>().await.ok();
        debug!("Server answered {}: {:?}", status, body);
        Err(error_from_response(status, body))
    }
}

fn unavailable(e: reqwest::Error) -> OnboardingError {
    OnboardingError::StoreUnavailable(e.into())
}

/// Rebuilds the server's error from its status and body.
pub fn error_from_response(status: StatusCode, body: Option<ErrorResponse>) -> OnboardingError {
    match status {
        StatusCode::CONFLICT => OnboardingError::DuplicateEmail,
        StatusCode::NOT_FOUND => OnboardingError::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let fields = match body {
                Some(body) if !body.fields.is_empty() => body.fields,
                Some(body) => FieldErrors::single("request", body.error),
                None => FieldErrors::single("request", "Request was rejected"),
            };
            OnboardingError::Validation(fields)
        }
        other => {
            let message = body.map(|b| b.error).unwrap_or_default();
            OnboardingError::StoreUnavailable(anyhow::anyhow!(
                "server answered {}: {}",
                other,
                message
            ))
        }
    }
}

impl Backend for HttpBackend {
    async fn get_config(&self) -> Result<OnboardingConfig, OnboardingError> {
        self.send(self.client.get(self.url("/api/config"))).await
    }

    async fn save_config(
        &self,
        request: SaveConfigRequest,
    ) -> Result<OnboardingConfig, OnboardingError> {
        self.send(self.client.post(self.url("/api/config")).json(&request))
            .await
    }

    async fn create_user(&self, request: CreateUserRequest) -> Result<UserRecord, OnboardingError> {
        self.send(self.client.post(self.url("/api/users")).json(&request))
            .await
    }

    async fn get_user(&self, id: Uuid) -> Result<UserRecord, OnboardingError> {
        self.send(self.client.get(self.url(&format!("/api/users/{}", id))))
            .await
    }

    async fn update_user(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<UserRecord, OnboardingError> {
        self.send(
            self.client
                .put(self.url(&format!("/api/users/{}", id)))
                .json(&request),
        )
        .await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, OnboardingError> {
        self.send(self.client.get(self.url("/api/users"))).await
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), OnboardingError> {
        let _: DeleteUserResponse = self
            .send(self.client.delete(self.url(&format!("/api/users/{}", id))))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(error: &str, fields: FieldErrors) -> Option<ErrorResponse> {
        Some(ErrorResponse {
            error: error.into(),
            code: "x".into(),
            fields,
        })
    }

    #[test]
    fn maps_statuses_back_to_errors() {
        assert!(matches!(
            error_from_response(StatusCode::CONFLICT, None),
            OnboardingError::DuplicateEmail
        ));
        assert!(matches!(
            error_from_response(StatusCode::NOT_FOUND, None),
            OnboardingError::NotFound
        ));
        assert!(matches!(
            error_from_response(StatusCode::SERVICE_UNAVAILABLE, body("down", FieldErrors::new())),
            OnboardingError::StoreUnavailable(_)
        ));
    }

    #[test]
    fn validation_keeps_field_errors() {
        let fields = FieldErrors::single("about_me", "About Me is required");
        let response = body("Validation failed", fields.clone());
        match error_from_response(StatusCode::BAD_REQUEST, response) {
            OnboardingError::Validation(got) => assert_eq!(got, fields),
            other => panic!("unexpected {:?}", other),
        }

        // Body-less rejections (e.g. malformed JSON) still render somewhere
        match error_from_response(StatusCode::UNPROCESSABLE_ENTITY, None) {
            OnboardingError::Validation(got) => assert!(got.contains("request")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn trims_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:3000/");
        assert_eq!(backend.url("/api/config"), "http://localhost:3000/api/config");
    }
}
