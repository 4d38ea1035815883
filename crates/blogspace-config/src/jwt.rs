use std::fmt;

use crate::{ConfigError, env_lookup};

/// Token lifetime used when `JWT_EXPIRY` is not set (24 hours).
pub const DEFAULT_TOKEN_EXPIRY: u64 = 86_400;

/// Signing secret and token lifetime.
///
/// Loaded once at startup and shared read-only for the life of the process.
/// The secret is never printed: the `Debug` impl redacts it.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds
    pub token_expiry: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, token_expiry: u64) -> Self {
        Self {
            secret: secret.into(),
            token_expiry,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let token_expiry = match lookup("JWT_EXPIRY") {
            None => DEFAULT_TOKEN_EXPIRY,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        name: "JWT_EXPIRY",
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Ok(secs) => secs,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "JWT_EXPIRY",
                        reason: e.to_string(),
                    });
                }
            },
        };

        Ok(Self {
            secret,
            token_expiry,
        })
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("token_expiry", &self.token_expiry)
            .finish()
    }
}
