//! Bearer sessions.

use std::fmt;

use super::ids::UserId;

/// Validation errors returned by [`SessionToken::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionTokenValidationError {
    /// The token was blank.
    #[error("session token must not be empty")]
    Empty,
}

/// Opaque bearer credential minted by a
/// [`TokenIssuer`](crate::domain::ports::TokenIssuer).
///
/// The core compares tokens for equality only. `Debug` output is redacted so
/// tokens never reach logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Result<Self, SessionTokenValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SessionTokenValidationError::Empty);
        }
        Ok(Self(token))
    }

    /// Borrow the raw token for transport.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Issued session binding a token to its owner.
///
/// Sessions are immutable. Expiry, if any, lives inside the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: SessionToken,
    user_id: UserId,
}

impl Session {
    /// Bind `token` to `user_id`.
    pub fn new(token: SessionToken, user_id: UserId) -> Self {
        Self { token, user_id }
    }

    /// Bearer token.
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Owning user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
