use axum::{
    Router,
    routing::get,
};

use crate::state::AppState;
use crate::{config, health, users};

/// All API routes. Transport layers (CORS, tracing) are added by the server.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/config", get(config::get_config).post(config::save_config))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .with_state(state)
}
