use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

/// An authenticated principal as stored in the user directory.
///
/// The auth core only reads identities. `password_hash` stays inside this
/// struct: it is never serialized and `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub authorities: BTreeSet<String>,
}

impl Identity {
    pub fn new(
        id: Uuid,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash: password_hash.into(),
            display_name: display_name.into(),
            authorities: BTreeSet::new(),
        }
    }

    pub fn with_authorities<I, S>(mut self, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorities = authorities.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .field("authorities", &self.authorities)
            .finish()
    }
}
