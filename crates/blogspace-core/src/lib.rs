//! # BlogSpace Core
//!
//! Foundational types shared by every BlogSpace crate:
//!
//! - [`errors`]: HTTP-facing application error with JSON response conversion
//! - [`password`]: Password hashing collaborator and its bcrypt implementation
//!
//! # Example
//!
//! ```ignore
//! use blogspace_core::{AppError, BcryptPasswordHasher, PasswordHasher};
//!
//! let hasher = BcryptPasswordHasher::default();
//! let hash = hasher.hash("secure_password")?;
//! assert!(hasher.matches("secure_password", &hash)?);
//!
//! let error = AppError::unauthorized("Incorrect Username or Password");
//! ```

pub mod errors;
pub mod password;

pub use errors::{AppError, ErrorResponse};
pub use password::{
    BcryptPasswordHasher, PasswordError, PasswordHasher, hash_password, verify_password,
};
