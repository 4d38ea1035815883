use std::sync::Arc;

use blogspace_auth::{AuthService, Clock, InMemoryUserDirectory, UserDirectory};
use blogspace_config::{CorsConfig, JwtConfig, ServerConfig};
use blogspace_core::PasswordHasher;
use blogspace_db::{PgUserDirectory, init_db_pool, run_migrations};
use tracing::{info, warn};

/// Shared, read-only application state.
///
/// Cloned into every request. Holds no per-request or per-user data.
#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub cors_config: CorsConfig,
}

pub fn init_app_state(
    directory: Arc<dyn UserDirectory>,
    hasher: Arc<dyn PasswordHasher>,
    jwt_config: &JwtConfig,
    cors_config: CorsConfig,
    clock: Arc<dyn Clock>,
) -> AppState {
    AppState {
        auth: Arc::new(AuthService::new(directory, hasher, jwt_config, clock)),
        cors_config,
    }
}

/// Where user accounts live for this process.
#[derive(Clone, Debug)]
pub enum UserStore {
    Memory(Arc<InMemoryUserDirectory>),
    Postgres(PgUserDirectory),
}

impl UserStore {
    /// Connects to Postgres when `DATABASE_URL` is configured, otherwise
    /// falls back to an empty in-memory directory.
    pub async fn connect(server_config: &ServerConfig) -> anyhow::Result<Self> {
        match &server_config.database_url {
            Some(url) => {
                let pool = init_db_pool(url).await?;
                run_migrations(&pool).await?;
                info!("Connected to PostgreSQL user directory");
                Ok(Self::Postgres(PgUserDirectory::new(pool)))
            }
            None => {
                warn!("DATABASE_URL not set, using in-memory user directory");
                Ok(Self::Memory(Arc::new(InMemoryUserDirectory::new())))
            }
        }
    }

    pub fn directory(&self) -> Arc<dyn UserDirectory> {
        match self {
            Self::Memory(directory) => Arc::clone(directory) as Arc<dyn UserDirectory>,
            Self::Postgres(directory) => Arc::new(directory.clone()),
        }
    }
}
