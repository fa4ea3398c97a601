//! Port abstraction for the Identity Store and its errors.
use async_trait::async_trait;

use crate::domain::{User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by Identity Store adapters.
    pub enum UserRepositoryError {
        /// No user matches the lookup key.
        NotFound { key: String } => "user not found: {key}",
        /// A user with the same identifier is already stored.
        AlreadyExists { id: UserId } => "user already exists: {id}",
    }
}

/// Identity Store contract.
///
/// Only identifier collisions are rejected by [`UserRepository::create`];
/// callers must check username availability with
/// [`UserRepository::find_by_username`] beforehand.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user.
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch a user by login name; scans every record.
    async fn find_by_username(&self, username: &Username) -> Result<User, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<User, UserRepositoryError>;
}
