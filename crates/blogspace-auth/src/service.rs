use std::fmt;
use std::sync::Arc;

use blogspace_config::JwtConfig;
use blogspace_core::PasswordHasher;
use tracing::{debug, instrument};

use crate::clock::Clock;
use crate::credentials::CredentialVerifier;
use crate::directory::UserDirectory;
use crate::error::AuthError;
use crate::identity::Identity;
use crate::jwt::TokenCodec;

/// A freshly signed token and its lifetime in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
}

/// Login and per-request token resolution.
///
/// Holds no per-user state. Every call to [`AuthService::resolve_from_token`]
/// verifies the token and re-reads the identity from the directory, so an
/// authority change or a deleted account takes effect on the next request.
pub struct AuthService {
    verifier: CredentialVerifier,
    codec: TokenCodec,
    directory: Arc<dyn UserDirectory>,
    token_ttl: u64,
}

impl AuthService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        hasher: Arc<dyn PasswordHasher>,
        jwt_config: &JwtConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier: CredentialVerifier::new(Arc::clone(&directory), hasher),
            codec: TokenCodec::new(jwt_config, clock),
            directory,
            token_ttl: jwt_config.token_expiry,
        }
    }

    pub fn token_ttl(&self) -> u64 {
        self.token_ttl
    }

    /// Exposes the codec so tests can inspect issued tokens.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Verifies credentials and issues a token whose subject is the identity email.
    ///
    /// # Errors
    ///
    /// Unknown email and wrong password both return
    /// [`AuthError::InvalidCredentials`]. Directory or hasher faults return
    /// [`AuthError::Internal`].
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let identity = self
            .verifier
            .verify(email, password)
            .await
            .map_err(|e| match e {
                AuthError::IdentityNotFound => AuthError::InvalidCredentials,
                other => other,
            })?;

        let token = self
            .codec
            .encode(&identity.email, self.codec.now(), self.token_ttl)?;

        debug!(user_id = %identity.id, "Issued access token");

        Ok(IssuedToken {
            token,
            expires_in: self.token_ttl,
        })
    }

    /// Resolves a bearer token to the identity it names, as currently stored.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Malformed`], [`AuthError::InvalidSignature`],
    ///   [`AuthError::Expired`] from the codec
    /// - [`AuthError::IdentityNotFound`] if the subject no longer resolves
    /// - [`AuthError::Internal`] if the directory fails
    #[instrument(skip_all)]
    pub async fn resolve_from_token(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.codec.decode(token)?;

        self.directory
            .find_by_email(claims.subject())
            .await?
            .ok_or(AuthError::IdentityNotFound)
    }
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("codec", &self.codec)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::directory::InMemoryUserDirectory;
    use blogspace_core::BcryptPasswordHasher;
    use tokio::task::JoinSet;
    use uuid::Uuid;

    const NOW: i64 = 1_700_000_000;

    struct Fixture {
        service: Arc<AuthService>,
        directory: Arc<InMemoryUserDirectory>,
        clock: Arc<ManualClock>,
        user_id: Uuid,
    }

    fn fixture() -> Fixture {
        let hasher = BcryptPasswordHasher::with_cost(4);
        let directory = Arc::new(InMemoryUserDirectory::new());
        let user_id = Uuid::new_v4();
        directory
            .insert(
                Identity::new(
                    user_id,
                    "realuser@x.com",
                    hasher.hash("rightpass").unwrap(),
                    "Real User",
                )
                .with_authorities(["ROLE_USER"]),
            )
            .unwrap();

        let clock = Arc::new(ManualClock::at(NOW));
        let service = Arc::new(AuthService::new(
            directory.clone(),
            Arc::new(hasher),
            &JwtConfig::new("service-test-secret", 86_400),
            clock.clone(),
        ));

        Fixture {
            service,
            directory,
            clock,
            user_id,
        }
    }

    #[tokio::test]
    async fn test_login_issues_token_for_identity() {
        let fx = fixture();

        let issued = fx.service.login("realuser@x.com", "rightpass").await.unwrap();
        assert_eq!(issued.expires_in, 86_400);

        let claims = fx.service.codec().decode(&issued.token).unwrap();
        assert_eq!(claims.sub, "realuser@x.com");
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + 86_400);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let fx = fixture();

        let unknown = fx.service.login("nouser@x.com", "anything").await.unwrap_err();
        let wrong = fx.service.login("realuser@x.com", "wrongpass").await.unwrap_err();

        assert_eq!(unknown, AuthError::InvalidCredentials);
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_resolve_from_token() {
        let fx = fixture();
        let issued = fx.service.login("realuser@x.com", "rightpass").await.unwrap();

        let identity = fx.service.resolve_from_token(&issued.token).await.unwrap();
        assert_eq!(identity.id, fx.user_id);
        assert_eq!(identity.email, "realuser@x.com");
    }

    #[tokio::test]
    async fn test_resolve_reads_current_authorities() {
        let fx = fixture();
        let issued = fx.service.login("realuser@x.com", "rightpass").await.unwrap();

        fx.directory
            .update(fx.user_id, |user| {
                user.authorities.insert("ROLE_ADMIN".to_string());
            })
            .unwrap();

        let identity = fx.service.resolve_from_token(&issued.token).await.unwrap();
        assert!(identity.has_authority("ROLE_ADMIN"));
    }

    #[tokio::test]
    async fn test_resolve_deleted_account() {
        let fx = fixture();
        let issued = fx.service.login("realuser@x.com", "rightpass").await.unwrap();

        fx.directory.remove(fx.user_id).unwrap();

        let result = fx.service.resolve_from_token(&issued.token).await;
        assert_eq!(result.unwrap_err(), AuthError::IdentityNotFound);
    }

    #[tokio::test]
    async fn test_resolve_after_expiry() {
        let fx = fixture();
        let issued = fx.service.login("realuser@x.com", "rightpass").await.unwrap();

        fx.clock.advance(86_399);
        assert!(fx.service.resolve_from_token(&issued.token).await.is_ok());

        fx.clock.advance(1);
        let result = fx.service.resolve_from_token(&issued.token).await;
        assert_eq!(result.unwrap_err(), AuthError::Expired);
    }

    #[tokio::test]
    async fn test_resolve_garbage() {
        let fx = fixture();

        let result = fx.service.resolve_from_token("not-a-token").await;
        assert_eq!(result.unwrap_err(), AuthError::Malformed);
    }

    #[tokio::test]
    async fn test_concurrent_resolution_of_one_token() {
        let fx = fixture();
        let issued = fx.service.login("realuser@x.com", "rightpass").await.unwrap();

        let mut tasks = JoinSet::new();
        for _ in 0..64 {
            let service = Arc::clone(&fx.service);
            let token = issued.token.clone();
            tasks.spawn(async move { service.resolve_from_token(&token).await });
        }

        let mut resolved = 0;
        while let Some(result) = tasks.join_next().await {
            let identity = result.unwrap().unwrap();
            assert_eq!(identity.id, fx.user_id);
            assert_eq!(identity.email, "realuser@x.com");
            resolved += 1;
        }
        assert_eq!(resolved, 64);
    }
}
