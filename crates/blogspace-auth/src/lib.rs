//! # BlogSpace Auth
//!
//! Stateless request authentication for the BlogSpace API.
//!
//! This crate provides:
//!
//! - [`credentials`]: checks an email/password pair against the user directory
//! - [`jwt`]: signs and verifies expiring HS256 tokens
//! - [`service`]: login (verify then issue) and per-request token resolution
//! - [`directory`]: the read-only user lookup collaborator and an in-memory implementation
//! - [`clock`]: the time source used for issuing and expiry checks
//!
//! A token is valid if and only if its signature verifies against the server
//! secret and the current time is before its `exp` claim. There is no session
//! store, no cache and no revocation: every request re-verifies the token and
//! re-reads the identity from the directory.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use blogspace_auth::{AuthService, InMemoryUserDirectory, SystemClock};
//! use blogspace_config::JwtConfig;
//! use blogspace_core::BcryptPasswordHasher;
//!
//! let service = AuthService::new(
//!     Arc::new(InMemoryUserDirectory::new()),
//!     Arc::new(BcryptPasswordHasher::default()),
//!     &JwtConfig::from_env()?,
//!     Arc::new(SystemClock),
//! );
//!
//! let issued = service.login("user@test.com", "password").await?;
//! let identity = service.resolve_from_token(&issued.token).await?;
//! ```

pub mod claims;
pub mod clock;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod identity;
pub mod jwt;
pub mod service;

pub use claims::Claims;
#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use credentials::CredentialVerifier;
pub use directory::{DirectoryError, InMemoryUserDirectory, UserDirectory};
pub use error::AuthError;
pub use identity::Identity;
pub use jwt::TokenCodec;
pub use service::{AuthService, IssuedToken};
