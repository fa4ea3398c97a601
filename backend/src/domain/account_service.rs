//! Registration, login, and bearer authentication.
//!
//! The Identity Store only rejects duplicate identifiers, so username
//! uniqueness is enforced here: the availability check and the insert run
//! under a registration gate shared by every clone of the service.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error_mapping::{
    map_hash_error, map_issuance_error, map_session_error, map_user_error,
    map_verification_error, username_taken,
};
use super::ports::{
    PasswordHasher, SessionRepository, SessionRepositoryError, TokenIssuer, UserRepository,
    UserRepositoryError,
};
use super::{
    Error, LoginCredentials, Session, SessionToken, User, UserId, UserIdentity, Username,
};

/// Account service driving the Identity and Session stores.
pub struct AccountService<U, S> {
    users: Arc<U>,
    sessions: Arc<S>,
    tokens: Arc<dyn TokenIssuer>,
    hasher: Arc<dyn PasswordHasher>,
    registration_gate: Arc<Mutex<()>>,
}

impl<U, S> Clone for AccountService<U, S> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            sessions: Arc::clone(&self.sessions),
            tokens: Arc::clone(&self.tokens),
            hasher: Arc::clone(&self.hasher),
            registration_gate: Arc::clone(&self.registration_gate),
        }
    }
}

impl<U, S> AccountService<U, S> {
    /// Create a new service over the given stores and credential adapters.
    pub fn new(
        users: Arc<U>,
        sessions: Arc<S>,
        tokens: Arc<dyn TokenIssuer>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            hasher,
            registration_gate: Arc::new(Mutex::new(())),
        }
    }
}

impl<U, S> AccountService<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    /// Create an account and open its first session.
    ///
    /// Fails with a `Conflict` carrying field details when the username is
    /// taken.
    pub async fn register(&self, credentials: &LoginCredentials) -> Result<Session, Error> {
        // Hash before taking the gate so slow hashing never serialises
        // unrelated registrations.
        let digest = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(map_hash_error)?;

        let (user, token) = {
            let _gate = self.registration_gate.lock().await;
            match self.users.find_by_username(credentials.username()).await {
                Ok(_) => {
                    debug!(username = %credentials.username(), "username already registered");
                    return Err(username_taken(credentials.username()));
                }
                Err(UserRepositoryError::NotFound { .. }) => {}
                Err(err) => return Err(map_user_error(err)),
            }
            let user = User::new(UserId::random(), credentials.username().clone(), digest);
            // Mint before storing so a failed issue leaves no orphaned user.
            let token = self
                .tokens
                .issue(&user.identity())
                .map_err(map_issuance_error)?;
            self.users.create(&user).await.map_err(map_user_error)?;
            (user, token)
        };

        info!(user_id = %user.id(), username = %user.username(), "registered user");
        self.store_session(Session::new(token, user.id().clone()))
            .await
    }

    /// Check credentials and return the user's session, opening one when
    /// needed.
    ///
    /// A stored session whose token no longer verifies is revoked and
    /// replaced.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session, Error> {
        let user = match self.users.find_by_username(credentials.username()).await {
            Ok(user) => user,
            Err(UserRepositoryError::NotFound { .. }) => {
                debug!(username = %credentials.username(), "login for unknown user");
                return Err(Error::unauthorized("user not found"));
            }
            Err(err) => return Err(map_user_error(err)),
        };

        if !self
            .hasher
            .verify(user.password_hash(), credentials.password())
            .await
        {
            debug!(user_id = %user.id(), "login with wrong password");
            return Err(Error::unauthorized("invalid password"));
        }

        match self.sessions.find_by_user_id(user.id()).await {
            Ok(session) => match self.tokens.verify(session.token()) {
                Ok(_) => {
                    debug!(user_id = %user.id(), "reusing existing session");
                    return Ok(session);
                }
                Err(reason) => {
                    debug!(user_id = %user.id(), %reason, "replacing stale session");
                    self.discard(session.token()).await?;
                }
            },
            Err(SessionRepositoryError::NotFound) => {}
            Err(err) => return Err(map_session_error(err)),
        }

        self.open_session(&user.identity()).await
    }

    /// Resolve a bearer token to the identity it was issued for.
    ///
    /// The token must verify and a stored session owned by the same user
    /// must hold it.
    pub async fn authenticate(&self, token: &SessionToken) -> Result<UserIdentity, Error> {
        let identity = self.tokens.verify(token).map_err(|reason| {
            debug!(%reason, "token rejected");
            map_verification_error(reason)
        })?;

        let session = match self.sessions.find_by_token(token).await {
            Ok(session) => session,
            Err(SessionRepositoryError::NotFound) => {
                debug!(user_id = %identity.id(), "token has no stored session");
                return Err(Error::unauthorized("session not found"));
            }
            Err(err) => return Err(map_session_error(err)),
        };

        if session.user_id() != identity.id() {
            debug!(
                user_id = %identity.id(),
                session_user_id = %session.user_id(),
                "session owner does not match token"
            );
            return Err(Error::unauthorized("session does not match token"));
        }
        Ok(identity)
    }

    /// Look a user up by login name.
    pub async fn user_by_username(&self, username: &Username) -> Result<User, Error> {
        self.users
            .find_by_username(username)
            .await
            .map_err(map_user_error)
    }

    /// Look a user up by identifier.
    pub async fn user_by_id(&self, id: &UserId) -> Result<User, Error> {
        self.users.find_by_id(id).await.map_err(map_user_error)
    }

    async fn open_session(&self, identity: &UserIdentity) -> Result<Session, Error> {
        let token = self.tokens.issue(identity).map_err(map_issuance_error)?;
        self.store_session(Session::new(token, identity.id().clone()))
            .await
    }

    async fn store_session(&self, session: Session) -> Result<Session, Error> {
        match self.sessions.create(&session).await {
            Ok(()) => {
                info!(user_id = %session.user_id(), "opened session");
                Ok(session)
            }
            Err(err) if err.is_already_exists() => {
                // A concurrent login won; hand back its session.
                debug!(user_id = %session.user_id(), %err, "session created concurrently");
                self.sessions
                    .find_by_user_id(session.user_id())
                    .await
                    .map_err(map_session_error)
            }
            Err(err) => Err(map_session_error(err)),
        }
    }

    async fn discard(&self, token: &SessionToken) -> Result<(), Error> {
        match self.sessions.revoke(token).await {
            Ok(()) | Err(SessionRepositoryError::NotFound) => Ok(()),
            Err(err) => Err(map_session_error(err)),
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
