use async_trait::async_trait;
use blogspace_auth::{DirectoryError, Identity, UserDirectory};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password: String,
    username: String,
    authorities: Vec<String>,
}

impl From<UserRow> for Identity {
    fn from(row: UserRow) -> Self {
        Identity::new(row.id, row.email, row.password, row.username)
            .with_authorities(row.authorities)
    }
}

/// Account to insert. `password_hash` must already be hashed.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub display_name: &'a str,
    pub authorities: &'a [String],
}

#[derive(Clone, Debug)]
pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }

    /// Inserts a user unless the email is already registered.
    ///
    /// Returns `Ok(None)` when the email exists.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: NewUser<'_>) -> Result<Option<Uuid>, DirectoryError> {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (email, password, username, authorities)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (email) DO NOTHING
             RETURNING id",
        )
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.display_name)
        .bind(user.authorities)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)
    }
}

fn unavailable(err: sqlx::Error) -> DirectoryError {
    DirectoryError::Unavailable(err.to_string())
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DirectoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password, username, authorities FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)?;

        Ok(row.map(Identity::from))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, DirectoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password, username, authorities FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)?;

        Ok(row.map(Identity::from))
    }
}
