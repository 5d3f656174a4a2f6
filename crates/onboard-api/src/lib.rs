pub mod config;
pub mod error;
pub mod extract;
pub mod health;
pub mod routes;
pub mod state;
pub mod users;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};
