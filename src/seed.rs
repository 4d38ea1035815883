use blogspace_auth::{Identity, UserDirectory};
use blogspace_core::PasswordHasher;
use blogspace_db::NewUser;
use tracing::info;
use uuid::Uuid;

use crate::state::UserStore;

pub const DEFAULT_USER_EMAIL: &str = "user@test.com";
pub const DEFAULT_USER_PASSWORD: &str = "password";
pub const DEFAULT_USER_DISPLAY_NAME: &str = "Test User";
pub const DEFAULT_AUTHORITY: &str = "ROLE_USER";

/// Ensures the default development account exists.
///
/// Returns `true` if the account was created, `false` if it was already there.
pub async fn seed_default_user(
    store: &UserStore,
    hasher: &dyn PasswordHasher,
) -> anyhow::Result<bool> {
    if store
        .directory()
        .find_by_email(DEFAULT_USER_EMAIL)
        .await?
        .is_some()
    {
        return Ok(false);
    }

    let password_hash = hasher.hash(DEFAULT_USER_PASSWORD)?;

    let created = match store {
        UserStore::Memory(directory) => {
            directory.insert(
                Identity::new(
                    Uuid::new_v4(),
                    DEFAULT_USER_EMAIL,
                    password_hash,
                    DEFAULT_USER_DISPLAY_NAME,
                )
                .with_authorities([DEFAULT_AUTHORITY]),
            )?;
            true
        }
        UserStore::Postgres(directory) => directory
            .create_user(NewUser {
                email: DEFAULT_USER_EMAIL,
                password_hash: &password_hash,
                display_name: DEFAULT_USER_DISPLAY_NAME,
                authorities: &[DEFAULT_AUTHORITY.to_string()],
            })
            .await?
            .is_some(),
    };

    if created {
        info!(email = DEFAULT_USER_EMAIL, "Seeded default user");
    }

    Ok(created)
}
