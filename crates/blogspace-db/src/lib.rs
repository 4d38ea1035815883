//! # BlogSpace DB
//!
//! PostgreSQL connection pool and the Postgres-backed
//! [`UserDirectory`](blogspace_auth::UserDirectory).
//!
//! # Example
//!
//! ```ignore
//! use blogspace_db::{PgUserDirectory, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&database_url).await?;
//! run_migrations(&pool).await?;
//! let directory = PgUserDirectory::new(pool);
//! ```

pub mod users;

use sqlx::postgres::PgPoolOptions;

pub use sqlx::PgPool;
pub use users::{NewUser, PgUserDirectory};

/// Opens a PostgreSQL connection pool.
///
/// The returned pool is cheaply cloneable; open it once at startup.
///
/// # Errors
///
/// Returns the sqlx error if the database cannot be reached.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Applies the SQL migrations in the repository's `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
