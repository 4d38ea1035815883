//! Signed, expiring access tokens.
//!
//! Tokens are compact HS256 JWTs over [`Claims`]. [`TokenCodec`] owns the
//! signing and verification keys, built once from [`JwtConfig`] and never
//! mutated afterwards, so a single codec is shared by every request without
//! locking.
//!
//! Decoding checks, in order:
//!
//! 1. the signature, against the server secret ([`AuthError::InvalidSignature`]);
//! 2. the structure and claims ([`AuthError::Malformed`]);
//! 3. the expiry, `now < exp` with no leeway ([`AuthError::Expired`]).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use blogspace_auth::{SystemClock, TokenCodec};
//!
//! let codec = TokenCodec::new(&jwt_config, Arc::new(SystemClock));
//! let token = codec.encode("user@test.com", codec.now(), 86_400)?;
//! let claims = codec.decode(&token)?;
//! assert_eq!(claims.sub, "user@test.com");
//! ```

use std::fmt;
use std::sync::Arc;

use blogspace_config::JwtConfig;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::claims::Claims;
use crate::clock::Clock;
use crate::error::AuthError;

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(jwt_config: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        let secret = jwt_config.secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock, with `exp == now` rejected.
        // jsonwebtoken only sees `exp` as present when it fits a u64, so the
        // required claims are enforced by deserializing `Claims` instead.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims::<&str>(&[]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
        }
    }

    /// Current time according to the codec's clock, in unix seconds.
    pub fn now(&self) -> i64 {
        self.clock.unix_now()
    }

    /// Signs a token for `subject` valid from `issued_at` for `ttl` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if `issued_at + ttl` overflows or the
    /// signer fails.
    pub fn encode(&self, subject: &str, issued_at: i64, ttl: u64) -> Result<String, AuthError> {
        let exp = i64::try_from(ttl)
            .ok()
            .and_then(|ttl| issued_at.checked_add(ttl))
            .ok_or_else(|| AuthError::Internal("token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verifies `token` against the current time of the codec's clock.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_at(token, self.now())
    }

    /// Verifies `token` as of `now` (unix seconds).
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))?;

        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Malformed,
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}
