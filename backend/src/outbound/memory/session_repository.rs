//! In-memory Session Store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{SessionRepository, SessionRepositoryError};
use crate::domain::{Session, SessionToken, UserId};

use super::{read, write};

#[derive(Debug, Default)]
struct SessionTable {
    by_token: HashMap<SessionToken, Session>,
    token_by_user: HashMap<UserId, SessionToken>,
}

/// Session Store indexed by token and by owner.
///
/// Both indexes live under one lock so they never disagree.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    table: RwLock<SessionTable>,
}

impl InMemorySessionRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &Session) -> Result<(), SessionRepositoryError> {
        let mut table = write(&self.table);
        if table.by_token.contains_key(session.token()) {
            return Err(SessionRepositoryError::token_already_exists());
        }
        if table.token_by_user.contains_key(session.user_id()) {
            return Err(SessionRepositoryError::user_already_has_session(
                session.user_id().clone(),
            ));
        }
        table
            .token_by_user
            .insert(session.user_id().clone(), session.token().clone());
        table
            .by_token
            .insert(session.token().clone(), session.clone());
        debug!(user_id = %session.user_id(), "stored session");
        Ok(())
    }

    async fn find_by_token(
        &self,
        token: &SessionToken,
    ) -> Result<Session, SessionRepositoryError> {
        read(&self.table)
            .by_token
            .get(token)
            .cloned()
            .ok_or_else(SessionRepositoryError::not_found)
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Session, SessionRepositoryError> {
        let table = read(&self.table);
        table
            .token_by_user
            .get(user_id)
            .and_then(|token| table.by_token.get(token))
            .cloned()
            .ok_or_else(SessionRepositoryError::not_found)
    }

    async fn revoke(&self, token: &SessionToken) -> Result<(), SessionRepositoryError> {
        let mut table = write(&self.table);
        let session = table
            .by_token
            .remove(token)
            .ok_or_else(SessionRepositoryError::not_found)?;
        table.token_by_user.remove(session.user_id());
        debug!(user_id = %session.user_id(), "revoked session");
        Ok(())
    }
}
