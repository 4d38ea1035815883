use anyhow::{Context, bail};
use blogspace_core::PasswordHasher;
use blogspace_db::{NewUser, PgUserDirectory};
use uuid::Uuid;
use validator::ValidateEmail;

/// Splits a comma separated authority list, dropping blanks.
pub fn parse_authorities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|authority| !authority.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn create_user(
    directory: &PgUserDirectory,
    hasher: &dyn PasswordHasher,
    email: &str,
    display_name: &str,
    password: &str,
    authorities: &[String],
) -> anyhow::Result<Uuid> {
    if !email.validate_email() {
        bail!("'{}' is not a valid email address", email);
    }
    if password.is_empty() {
        bail!("Password must not be empty");
    }

    let password_hash = hasher.hash(password).context("Failed to hash password")?;

    let created = directory
        .create_user(NewUser {
            email,
            password_hash: &password_hash,
            display_name,
            authorities,
        })
        .await?;

    match created {
        Some(id) => Ok(id),
        None => bail!("User with this email already exists"),
    }
}
