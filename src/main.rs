use std::sync::Arc;

use anyhow::Context;
use blogspace::logging::init_tracing;
use blogspace::router::init_router;
use blogspace::seed::seed_default_user;
use blogspace::state::{UserStore, init_app_state};
use blogspace_auth::SystemClock;
use blogspace_config::{CorsConfig, JwtConfig, ServerConfig};
use blogspace_core::BcryptPasswordHasher;
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing().context("Failed to initialize logging")?;

    let server_config = ServerConfig::from_env()?;
    let jwt_config = JwtConfig::from_env()?;
    let cors_config = CorsConfig::from_env();

    let hasher = Arc::new(BcryptPasswordHasher::default());
    let store = UserStore::connect(&server_config).await?;

    if server_config.seed_default_user {
        seed_default_user(&store, hasher.as_ref()).await?;
    }

    let state = init_app_state(
        store.directory(),
        hasher,
        &jwt_config,
        cors_config,
        Arc::new(SystemClock),
    );
    let app = init_router(state);

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
