use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::Response,
};
use blogspace_core::AppError;

use crate::middleware::auth::SecurityContext;

/// Read-only resources any caller may browse.
const PUBLIC_READ_PREFIXES: [&str; 3] = ["/api/v1/posts", "/api/v1/categories", "/api/v1/tags"];

const LOGIN_PATHS: [&str; 2] = ["/api/v1/auth", "/api/v1/auth/login"];

const DOCS_PREFIXES: [&str; 2] = ["/swagger-ui", "/api-docs"];

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Whether a request may proceed without an authenticated security context.
pub fn is_public(method: &Method, path: &str) -> bool {
    if method == Method::OPTIONS {
        return true;
    }

    if DOCS_PREFIXES.iter().any(|prefix| matches_prefix(path, prefix)) {
        return true;
    }

    if method == Method::POST {
        LOGIN_PATHS.contains(&path)
    } else if method == Method::GET {
        PUBLIC_READ_PREFIXES
            .iter()
            .any(|prefix| matches_prefix(path, prefix))
    } else {
        false
    }
}

/// Rejects anonymous callers on every route outside the public set.
///
/// Must run after [`crate::middleware::auth::authenticate_request`].
pub async fn require_authentication(req: Request, next: Next) -> Result<Response, AppError> {
    let authenticated = req
        .extensions()
        .get::<SecurityContext>()
        .is_some_and(SecurityContext::is_authenticated);

    if !authenticated && !is_public(req.method(), req.uri().path()) {
        return Err(AppError::unauthorized("Authentication required"));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_routes_are_public() {
        assert!(is_public(&Method::POST, "/api/v1/auth"));
        assert!(is_public(&Method::POST, "/api/v1/auth/login"));
        assert!(!is_public(&Method::GET, "/api/v1/auth/me"));
        assert!(!is_public(&Method::POST, "/api/v1/auth/me"));
    }

    #[test]
    fn test_public_reads() {
        assert!(is_public(&Method::GET, "/api/v1/posts"));
        assert!(is_public(&Method::GET, "/api/v1/posts/42"));
        assert!(is_public(&Method::GET, "/api/v1/categories/rust/posts"));
        assert!(is_public(&Method::GET, "/api/v1/tags"));

        assert!(!is_public(&Method::POST, "/api/v1/posts"));
        assert!(!is_public(&Method::DELETE, "/api/v1/posts/42"));
        assert!(!is_public(&Method::GET, "/api/v1/postscript"));
    }

    #[test]
    fn test_docs_and_preflight_are_public() {
        assert!(is_public(&Method::GET, "/swagger-ui"));
        assert!(is_public(&Method::GET, "/swagger-ui/index.html"));
        assert!(is_public(&Method::GET, "/api-docs/openapi.json"));
        assert!(is_public(&Method::OPTIONS, "/api/v1/users/7"));
    }

    #[test]
    fn test_everything_else_requires_authentication() {
        assert!(!is_public(&Method::GET, "/api/v1/users"));
        assert!(!is_public(&Method::PUT, "/api/v1/comments/3"));
        assert!(!is_public(&Method::GET, "/"));
    }
}
