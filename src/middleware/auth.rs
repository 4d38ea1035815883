use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use blogspace_auth::{AuthError, AuthService, Identity};
use blogspace_core::AppError;
use tracing::warn;
use uuid::Uuid;

use crate::state::AppState;

/// Who is making the current request.
///
/// Built by [`authenticate_request`] for each request and stored in the
/// request extensions. It lives exactly as long as the request.
#[derive(Debug, Clone, Default)]
pub enum SecurityContext {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl SecurityContext {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SecurityContext::Authenticated(identity) => Some(identity),
            SecurityContext::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.identity().map(|identity| identity.id)
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.identity()
            .is_some_and(|identity| identity.has_authority(authority))
    }
}

/// Returns the token from an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Resolves the caller's security context from the request headers.
///
/// A missing header, or a token that is malformed, forged, expired or names
/// a deleted account, yields [`SecurityContext::Anonymous`]. Only server
/// faults are returned as errors.
pub async fn establish_security_context(
    auth: &AuthService,
    headers: &HeaderMap,
) -> Result<SecurityContext, AuthError> {
    let Some(token) = extract_bearer_token(headers) else {
        return Ok(SecurityContext::Anonymous);
    };

    match auth.resolve_from_token(token).await {
        Ok(identity) => Ok(SecurityContext::Authenticated(identity)),
        Err(err) if err.is_token_rejection() => {
            warn!(reason = err.kind(), "Received invalid auth token");
            Ok(SecurityContext::Anonymous)
        }
        Err(err) => Err(err),
    }
}

/// Runs once per request and attaches a [`SecurityContext`].
///
/// Never rejects a request because of its token: route-level authorization
/// decides whether an anonymous caller may proceed.
pub async fn authenticate_request(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = establish_security_context(&state.auth, req.headers())
        .await
        .map_err(AuthError::into_app_error)?;

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

/// Extractor for handlers that require an authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.0.id
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.0.has_authority(authority)
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<SecurityContext>() {
            Some(SecurityContext::Authenticated(identity)) => Ok(AuthUser(identity.clone())),
            _ => Err(AppError::unauthorized("Authentication required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use blogspace_auth::{InMemoryUserDirectory, ManualClock, UserDirectory};
    use blogspace_config::JwtConfig;
    use blogspace_core::{BcryptPasswordHasher, PasswordHasher};
    use std::sync::Arc;

    const NOW: i64 = 1_700_000_000;

    struct BrokenDirectory;

    #[async_trait::async_trait]
    impl UserDirectory for BrokenDirectory {
        async fn find_by_email(
            &self,
            _: &str,
        ) -> Result<Option<Identity>, blogspace_auth::DirectoryError> {
            Err(blogspace_auth::DirectoryError::Unavailable(
                "connection reset".to_string(),
            ))
        }

        async fn find_by_id(
            &self,
            _: Uuid,
        ) -> Result<Option<Identity>, blogspace_auth::DirectoryError> {
            Err(blogspace_auth::DirectoryError::Unavailable(
                "connection reset".to_string(),
            ))
        }
    }

    fn service_with(directory: Arc<dyn UserDirectory>, clock: Arc<ManualClock>) -> AuthService {
        AuthService::new(
            directory,
            Arc::new(BcryptPasswordHasher::with_cost(4)),
            &JwtConfig::new("middleware-test-secret", 86_400),
            clock,
        )
    }

    fn service() -> (AuthService, Arc<ManualClock>) {
        let hasher = BcryptPasswordHasher::with_cost(4);
        let directory = InMemoryUserDirectory::new();
        directory
            .insert(Identity::new(
                Uuid::new_v4(),
                "user@test.com",
                hasher.hash("password").unwrap(),
                "Test User",
            ))
            .unwrap();
        let clock = Arc::new(ManualClock::at(NOW));
        (service_with(Arc::new(directory), clock.clone()), clock)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&bearer("abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);

        let mut basic = HeaderMap::new();
        basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_bearer_token(&basic), None);

        let mut lowercase = HeaderMap::new();
        lowercase.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(extract_bearer_token(&lowercase), None);
    }

    #[tokio::test]
    async fn test_no_header_is_anonymous() {
        let (auth, _) = service();
        let context = establish_security_context(&auth, &HeaderMap::new())
            .await
            .unwrap();
        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn test_valid_token_is_authenticated() {
        let (auth, _) = service();
        let issued = auth.login("user@test.com", "password").await.unwrap();

        let context = establish_security_context(&auth, &bearer(&issued.token))
            .await
            .unwrap();
        assert_eq!(context.identity().unwrap().email, "user@test.com");
        assert!(context.user_id().is_some());
    }

    #[tokio::test]
    async fn test_bad_tokens_fall_back_to_anonymous() {
        let (auth, clock) = service();
        let issued = auth.login("user@test.com", "password").await.unwrap();

        for token in ["", "garbage", "a.b.c"] {
            let context = establish_security_context(&auth, &bearer(token))
                .await
                .unwrap();
            assert!(!context.is_authenticated(), "token {:?}", token);
        }

        clock.advance(86_400);
        let context = establish_security_context(&auth, &bearer(&issued.token))
            .await
            .unwrap();
        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn test_directory_fault_is_not_downgraded() {
        let (issuer, clock) = service();
        let issued = issuer.login("user@test.com", "password").await.unwrap();

        let auth = service_with(Arc::new(BrokenDirectory), clock);
        let result = establish_security_context(&auth, &bearer(&issued.token)).await;

        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[test]
    fn test_security_context_authorities() {
        let identity = Identity::new(Uuid::new_v4(), "a@b.com", "hash", "A")
            .with_authorities(["ROLE_USER"]);
        let context = SecurityContext::Authenticated(identity);

        assert!(context.has_authority("ROLE_USER"));
        assert!(!context.has_authority("ROLE_ADMIN"));
        assert!(!SecurityContext::Anonymous.has_authority("ROLE_USER"));
    }
}
