mod config;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use onboard_api::AppStateInner;
use onboard_core::OnboardingService;
use onboard_core::credentials::PasswordHashing;
use onboard_db::Database;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "onboard_server=debug,onboard_api=debug,onboard_core=debug,onboard_db=info,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;

    let passwords = match config.argon2_cost {
        Some((memory_kib, iterations)) => PasswordHashing::with_cost(memory_kib, iterations)?,
        None => PasswordHashing::default(),
    };
    let state = AppStateInner::new(OnboardingService::with_password_hashing(db, passwords));

    // The admin and data pages are open to any origin
    let app = onboard_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("Onboarding server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
