//! Read-only identity lookup.
//!
//! [`UserDirectory`] is the seam between authentication and storage. The
//! server uses the Postgres implementation from `blogspace-db`; tests and
//! database-less development use [`InMemoryUserDirectory`].

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::identity::Identity;

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The backing store could not be reached or failed the query
    #[error("user directory unavailable: {0}")]
    Unavailable(String),

    /// A write would break email uniqueness
    #[error("email already registered: {0}")]
    Conflict(String),
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DirectoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, DirectoryError>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, Identity>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an identity. Fails if another id already owns the email.
    pub fn insert(&self, identity: Identity) -> Result<(), DirectoryError> {
        let mut users = self.users.write().map_err(poisoned)?;

        let taken = users
            .values()
            .any(|existing| existing.email == identity.email && existing.id != identity.id);
        if taken {
            return Err(DirectoryError::Conflict(identity.email));
        }

        users.insert(identity.id, identity);
        Ok(())
    }

    pub fn remove(&self, id: Uuid) -> Result<Option<Identity>, DirectoryError> {
        Ok(self.users.write().map_err(poisoned)?.remove(&id))
    }

    /// Applies `update` to the stored identity, if present.
    pub fn update<F>(&self, id: Uuid, update: F) -> Result<bool, DirectoryError>
    where
        F: FnOnce(&mut Identity),
    {
        let mut users = self.users.write().map_err(poisoned)?;
        match users.get_mut(&id) {
            Some(identity) => {
                update(identity);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> DirectoryError {
    DirectoryError::Unavailable("in-memory directory lock poisoned".to_string())
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DirectoryError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, DirectoryError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(&id).cloned())
    }
}
