use std::sync::Arc;

use tracing::error;

use onboard_core::{OnboardingError, OnboardingService};
use onboard_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub service: OnboardingService<Database>,
}

impl AppStateInner {
    pub fn new(service: OnboardingService<Database>) -> AppState {
        Arc::new(Self { service })
    }
}

/// Runs a blocking service call off the async runtime.
pub async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&OnboardingService<Database>) -> Result<T, OnboardingError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.service))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            OnboardingError::StoreUnavailable(anyhow::anyhow!("blocking task failed: {}", e))
        })?
        .map_err(ApiError::from)
}
