//! Application state wiring the in-memory stores to the services.

use std::sync::Arc;

use chrono::Duration;
use mockable::{Clock, DefaultClock};
use tracing::info;

use crate::config::ForumSettings;
use crate::domain::ports::{PasswordHasher, TokenIssuer};
use crate::domain::{AccountService, PostService};
use crate::outbound::auth::{Argon2PasswordHasher, HmacTokenIssuer, TokenKeyError};
use crate::outbound::memory::{
    InMemoryPostRepository, InMemorySessionRepository, InMemoryUserRepository,
};

/// Account service over the in-memory stores.
pub type InMemoryAccountService = AccountService<InMemoryUserRepository, InMemorySessionRepository>;
/// Post service over the in-memory stores.
pub type InMemoryPostService = PostService<InMemoryPostRepository, InMemoryUserRepository>;

/// Reasons the state cannot be assembled from settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateBuildError {
    /// No usable signing secret was configured.
    #[error("token_secret must be set to a non-blank value")]
    MissingTokenSecret,
    /// The token lifetime does not fit a timestamp offset.
    #[error("token_ttl_hours {hours} is out of range")]
    TokenTtlOutOfRange {
        /// Rejected value.
        hours: u64,
    },
    /// The signing key was rejected.
    #[error(transparent)]
    TokenKey(#[from] TokenKeyError),
}

/// Convert the configured lifetime, rejecting zero and any lifetime whose
/// expiry would not fit a timestamp.
fn token_lifetime(hours: u64, clock: &dyn Clock) -> Result<Duration, StateBuildError> {
    i64::try_from(hours)
        .ok()
        .filter(|value| *value > 0)
        .and_then(Duration::try_hours)
        .filter(|ttl| clock.utc().checked_add_signed(*ttl).is_some())
        .ok_or(StateBuildError::TokenTtlOutOfRange { hours })
}

/// Services sharing one set of stores.
#[derive(Clone)]
pub struct AppState {
    /// Registration, login, and authentication.
    pub accounts: InMemoryAccountService,
    /// Posts, comments, and votes.
    pub posts: InMemoryPostService,
}

impl AppState {
    /// Build state over fresh stores, the HMAC issuer, Argon2 hashing, and the
    /// system clock.
    ///
    /// # Examples
    /// ```
    /// use redditclone::config::ForumSettings;
    /// use redditclone::state::AppState;
    ///
    /// let state = AppState::in_memory(&ForumSettings::with_secret("s3cret")).expect("state");
    /// # let _ = state;
    /// ```
    pub fn in_memory(settings: &ForumSettings) -> Result<Self, StateBuildError> {
        let secret = settings
            .token_secret()
            .ok_or(StateBuildError::MissingTokenSecret)?;
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let ttl = token_lifetime(settings.token_ttl_hours, &*clock)?;
        let tokens = HmacTokenIssuer::new(secret.as_bytes().to_vec(), ttl, Arc::clone(&clock))?;

        let state = Self::from_parts(
            Arc::new(tokens),
            Arc::new(Argon2PasswordHasher::new()),
            clock,
        );
        info!(token_ttl_hours = settings.token_ttl_hours, "built in-memory state");
        Ok(state)
    }

    /// Build state over fresh stores with caller-supplied credential adapters.
    pub fn from_parts(
        tokens: Arc<dyn TokenIssuer>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new());
        Self {
            accounts: AccountService::new(Arc::clone(&users), sessions, tokens, hasher),
            posts: PostService::new(posts, users, clock),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for state assembly.
    use super::*;
    use crate::test_support::FixedClock;
    use chrono::{DateTime, Utc};
    use rstest::rstest;

    #[rstest]
    fn missing_secret_is_a_startup_error() {
        let settings = ForumSettings {
            token_secret: None,
            token_ttl_hours: 1,
        };

        assert!(matches!(
            AppState::in_memory(&settings),
            Err(StateBuildError::MissingTokenSecret)
        ));
    }

    #[rstest]
    #[case(0)]
    #[case(2_500_000_000)]
    #[case(u64::MAX)]
    fn unusable_lifetime_is_rejected(#[case] hours: u64) {
        let settings = ForumSettings {
            token_secret: Some("s3cret".to_owned()),
            token_ttl_hours: hours,
        };

        assert!(matches!(
            AppState::in_memory(&settings),
            Err(StateBuildError::TokenTtlOutOfRange { hours: rejected }) if rejected == hours
        ));
    }

    #[rstest]
    fn lifetime_past_the_last_timestamp_is_rejected() {
        let clock = FixedClock(DateTime::<Utc>::MAX_UTC - Duration::minutes(30));

        assert_eq!(
            token_lifetime(1, &clock),
            Err(StateBuildError::TokenTtlOutOfRange { hours: 1 })
        );
        assert_eq!(
            token_lifetime(1, &FixedClock::default()),
            Ok(Duration::hours(1))
        );
    }

    #[rstest]
    fn configured_secret_builds_state() {
        assert!(AppState::in_memory(&ForumSettings::with_secret("s3cret")).is_ok());
    }
}
