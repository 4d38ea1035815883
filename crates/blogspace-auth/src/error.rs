//! Authentication error taxonomy.

use blogspace_core::{AppError, PasswordError};
use thiserror::Error;

use crate::directory::DirectoryError;

/// Message shown to a login caller for any credential failure.
pub const BAD_CREDENTIALS_MESSAGE: &str = "Incorrect Username or Password";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email/password pair rejected at login
    #[error("{}", BAD_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    /// Token is structurally invalid or its claims do not parse
    #[error("token is malformed")]
    Malformed,

    /// Token signature does not verify against the server secret
    #[error("token signature is invalid")]
    InvalidSignature,

    /// Current time is at or after the token's `exp`
    #[error("token has expired")]
    Expired,

    /// The email or token subject does not resolve to a stored identity
    #[error("identity not found")]
    IdentityNotFound,

    /// Server fault unrelated to what the caller presented
    #[error("internal authentication error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Errors that only mean "this bearer token establishes no identity".
    ///
    /// The request middleware downgrades these to an anonymous request.
    /// Anything else is a server fault and must fail the request.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::Malformed
                | AuthError::InvalidSignature
                | AuthError::Expired
                | AuthError::IdentityNotFound
        )
    }

    /// Short stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Malformed => "malformed",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "expired",
            AuthError::IdentityNotFound => "identity_not_found",
            AuthError::Internal(_) => "internal",
        }
    }

    /// Maps to the HTTP error the API returns.
    ///
    /// Every caller-side failure becomes the same 401 body so a client cannot
    /// tell an unknown account from a wrong password or a bad token.
    pub fn into_app_error(self) -> AppError {
        match self {
            err @ AuthError::Internal(_) => AppError::internal(err),
            _ => AppError::unauthorized(BAD_CREDENTIALS_MESSAGE),
        }
    }
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_rejections() {
        assert!(AuthError::Malformed.is_token_rejection());
        assert!(AuthError::InvalidSignature.is_token_rejection());
        assert!(AuthError::Expired.is_token_rejection());
        assert!(AuthError::IdentityNotFound.is_token_rejection());
        assert!(!AuthError::InvalidCredentials.is_token_rejection());
        assert!(!AuthError::Internal("db down".to_string()).is_token_rejection());
    }

    #[test]
    fn test_credential_errors_share_response() {
        let not_found = AuthError::IdentityNotFound.into_app_error();
        let bad_password = AuthError::InvalidCredentials.into_app_error();

        assert_eq!(not_found.status, bad_password.status);
        assert_eq!(not_found.error.to_string(), bad_password.error.to_string());
        assert_eq!(bad_password.error.to_string(), BAD_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn test_internal_maps_to_server_error() {
        let err = AuthError::Internal("directory unreachable".to_string()).into_app_error();
        assert!(err.is_server_error());
    }

    #[test]
    fn test_directory_error_is_internal() {
        let err: AuthError = DirectoryError::Unavailable("timeout".to_string()).into();
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
