use std::future::Future;

use uuid::Uuid;

use onboard_db::Store;
use onboard_types::api::{CreateUserRequest, SaveConfigRequest, UpdateUserRequest};
use onboard_types::models::{OnboardingConfig, UserRecord};

use crate::error::OnboardingError;
use crate::service::OnboardingService;

/// The logical onboarding operations, as seen by the wizard and the admin
/// editor. Implemented in-process by [`OnboardingService`] and over HTTP by
/// the client crate.
pub trait Backend {
    fn get_config(&self) -> impl Future<Output = Result<OnboardingConfig, OnboardingError>> + Send;

    fn save_config(
        &self,
        request: SaveConfigRequest,
    ) -> impl Future<Output = Result<OnboardingConfig, OnboardingError>> + Send;

    fn create_user(
        &self,
        request: CreateUserRequest,
    ) -> impl Future<Output = Result<UserRecord, OnboardingError>> + Send;

    fn get_user(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<UserRecord, OnboardingError>> + Send;

    fn update_user(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> impl Future<Output = Result<UserRecord, OnboardingError>> + Send;

    fn list_users(&self) -> impl Future<Output = Result<Vec<UserRecord>, OnboardingError>> + Send;

    fn delete_user(&self, id: Uuid) -> impl Future<Output = Result<(), OnboardingError>> + Send;
}

impl<B: Backend + Sync> Backend for &B {
    fn get_config(&self) -> impl Future<Output = Result<OnboardingConfig, OnboardingError>> + Send {
        (**self).get_config()
    }

    fn save_config(
        &self,
        request: SaveConfigRequest,
    ) -> impl Future<Output = Result<OnboardingConfig, OnboardingError>> + Send {
        (**self).save_config(request)
    }

    fn create_user(
        &self,
        request: CreateUserRequest,
    ) -> impl Future<Output = Result<UserRecord, OnboardingError>> + Send {
        (**self).create_user(request)
    }

    fn get_user(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<UserRecord, OnboardingError>> + Send {
        (**self).get_user(id)
    }

    fn update_user(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> impl Future<Output = Result<UserRecord, OnboardingError>> + Send {
        (**self).update_user(id, request)
    }

    fn list_users(&self) -> impl Future<Output = Result<Vec<UserRecord>, OnboardingError>> + Send {
        (**self).list_users()
    }

    fn delete_user(&self, id: Uuid) -> impl Future<Output = Result<(), OnboardingError>> + Send {
        (**self).delete_user(id)
    }
}

// The service is synchronous; these calls block the current task. Async
// servers go through spawn_blocking in the API crate instead.
impl<S: Store> Backend for OnboardingService<S> {
    async fn get_config(&self) -> Result<OnboardingConfig, OnboardingError> {
        OnboardingService::get_config(self)
    }

    async fn save_config(
        &self,
        request: SaveConfigRequest,
    ) -> Result<OnboardingConfig, OnboardingError> {
        OnboardingService::save_config(self, &request.page_2_components, &request.page_3_components)
    }

    async fn create_user(&self, request: CreateUserRequest) -> Result<UserRecord, OnboardingError> {
        OnboardingService::create_user(self, &request)
    }

    async fn get_user(&self, id: Uuid) -> Result<UserRecord, OnboardingError> {
        OnboardingService::get_user(self, id)
    }

    async fn update_user(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<UserRecord, OnboardingError> {
        OnboardingService::update_user(self, id, &request)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, OnboardingError> {
        OnboardingService::list_users(self)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), OnboardingError> {
        OnboardingService::delete_user(self, id)
    }
}
