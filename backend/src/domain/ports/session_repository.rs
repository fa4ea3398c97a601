//! Port abstraction for the Session Store and its errors.
//!
//! A user owns at most one session at a time. [`SessionRepository::create`]
//! enforces this, which makes [`SessionRepository::find_by_user_id`]
//! unambiguous.

use async_trait::async_trait;

use crate::domain::{Session, SessionToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by Session Store adapters.
    pub enum SessionRepositoryError {
        /// No session matches the lookup.
        NotFound => "session not found",
        /// Another session already uses the same token value.
        TokenAlreadyExists => "session token already exists",
        /// The owning user already holds a session.
        UserAlreadyHasSession { user_id: UserId } =>
            "user {user_id} already has a session",
    }
}

impl SessionRepositoryError {
    /// Whether the error reports a collision with an existing session.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::TokenAlreadyExists | Self::UserAlreadyHasSession { .. }
        )
    }
}

/// Session Store contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session.
    async fn create(&self, session: &Session) -> Result<(), SessionRepositoryError>;

    /// Fetch the session holding `token`.
    async fn find_by_token(&self, token: &SessionToken)
    -> Result<Session, SessionRepositoryError>;

    /// Fetch the session owned by `user_id`.
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Session, SessionRepositoryError>;

    /// Remove the session holding `token`.
    async fn revoke(&self, token: &SessionToken) -> Result<(), SessionRepositoryError>;
}
