use std::fmt;
use std::sync::Arc;

use blogspace_core::PasswordHasher;
use tracing::{instrument, warn};

use crate::directory::UserDirectory;
use crate::error::AuthError;
use crate::identity::Identity;

/// Checked against on unknown emails so both login failures cost one bcrypt run.
const DUMMY_PASSWORD: &str = "blogspace-unknown-account";

/// Checks an email/password pair against the user directory.
///
/// Read only. The plaintext password is never logged: it is skipped from
/// the tracing span and only handed to the hasher.
#[derive(Clone)]
pub struct CredentialVerifier {
    directory: Arc<dyn UserDirectory>,
    hasher: Arc<dyn PasswordHasher>,
    dummy_hash: Option<String>,
}

impl CredentialVerifier {
    /// Hashes a dummy password once up front with `hasher`.
    pub fn new(directory: Arc<dyn UserDirectory>, hasher: Arc<dyn PasswordHasher>) -> Self {
        let dummy_hash = match hasher.hash(DUMMY_PASSWORD) {
            Ok(hash) => Some(hash),
            Err(e) => {
                warn!(error = %e, "Could not prepare dummy password hash");
                None
            }
        };

        Self {
            directory,
            hasher,
            dummy_hash,
        }
    }

    /// # Errors
    ///
    /// - [`AuthError::IdentityNotFound`] if no identity has this email
    /// - [`AuthError::InvalidCredentials`] if the password does not match
    /// - [`AuthError::Internal`] if the directory or the hasher fails
    #[instrument(skip(self, password))]
    pub async fn verify(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let Some(identity) = self.directory.find_by_email(email).await? else {
            if let Some(dummy_hash) = &self.dummy_hash {
                // The outcome is irrelevant; only the time spent matters.
                let _ = self.password_matches(password, dummy_hash.clone()).await;
            }
            return Err(AuthError::IdentityNotFound);
        };

        if !self
            .password_matches(password, identity.password_hash.clone())
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(identity)
    }

    async fn password_matches(&self, password: &str, stored_hash: String) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let plaintext = password.to_owned();

        // bcrypt is CPU bound; keep it off the async workers.
        let matches = tokio::task::spawn_blocking(move || hasher.matches(&plaintext, &stored_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("password check aborted: {}", e)))??;

        Ok(matches)
    }
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}
