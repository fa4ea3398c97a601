//! In-memory Identity Store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{User, UserId, Username};

use super::{read, write};

/// Identity Store keyed by [`UserId`].
///
/// Username lookups scan every record. Two users may share a username here;
/// uniqueness belongs to the registration flow.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = write(&self.users);
        if users.contains_key(user.id()) {
            return Err(UserRepositoryError::already_exists(user.id().clone()));
        }
        users.insert(user.id().clone(), user.clone());
        debug!(user_id = %user.id(), total = users.len(), "stored user");
        Ok(())
    }

    async fn find_by_username(&self, username: &Username) -> Result<User, UserRepositoryError> {
        read(&self.users)
            .values()
            .find(|user| user.username() == username)
            .cloned()
            .ok_or_else(|| UserRepositoryError::not_found(username.as_str()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<User, UserRepositoryError> {
        read(&self.users)
            .get(id)
            .cloned()
            .ok_or_else(|| UserRepositoryError::not_found(id.as_str()))
    }
}
