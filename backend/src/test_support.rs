//! Test utilities for the backend crate.
//!
//! Deterministic stand-ins for the clock and the credential ports, shared by
//! unit tests (in `src/`) and integration tests (in `tests/`). Compiled for
//! tests and behind the `test-support` feature.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    PasswordHashError, PasswordHasher, TokenIssuanceError, TokenIssuer, TokenVerificationError,
};
use crate::domain::{PasswordHash, SessionToken, UserIdentity};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Midday on 1 May 2024, the default instant for fixed clocks.
pub fn fixture_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(fixture_instant())
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Clock that only moves when a test advances it.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `delta`.
    ///
    /// # Panics
    /// Panics when `delta` does not fit in a [`TimeDelta`].
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        let mut now = lock(&self.0);
        *now += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Password "hasher" that stores a tagged copy of the plaintext.
///
/// Only for tests: it keeps registration fast and makes digests predictable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextPasswordHasher;

const PLAINTEXT_PREFIX: &str = "plain$";

#[async_trait]
impl PasswordHasher for PlaintextPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHashError> {
        PasswordHash::new(format!("{PLAINTEXT_PREFIX}{plaintext}"))
            .map_err(|err| PasswordHashError::hashing(err.to_string()))
    }

    async fn verify(&self, digest: &PasswordHash, plaintext: &str) -> bool {
        digest
            .as_str()
            .strip_prefix(PLAINTEXT_PREFIX)
            .is_some_and(|stored| stored == plaintext)
    }
}

/// Token issuer minting `token-1`, `token-2`, ... and remembering who owns
/// each one.
#[derive(Debug, Default)]
pub struct SequentialTokenIssuer {
    state: Mutex<IssuerState>,
}

#[derive(Debug, Default)]
struct IssuerState {
    next: u64,
    issued: HashMap<String, UserIdentity>,
    expired: Vec<String>,
}

impl SequentialTokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make later verification of `token` fail with
    /// [`TokenVerificationError::Expired`].
    pub fn expire(&self, token: &SessionToken) {
        lock(&self.state).expired.push(token.as_str().to_owned());
    }

    /// Number of tokens minted so far.
    pub fn issued_count(&self) -> u64 {
        lock(&self.state).next
    }
}

impl TokenIssuer for SequentialTokenIssuer {
    fn issue(&self, identity: &UserIdentity) -> Result<SessionToken, TokenIssuanceError> {
        let mut state = lock(&self.state);
        state.next += 1;
        let value = format!("token-{}", state.next);
        state.issued.insert(value.clone(), identity.clone());
        SessionToken::new(value).map_err(|err| TokenIssuanceError::signing(err.to_string()))
    }

    fn verify(&self, token: &SessionToken) -> Result<UserIdentity, TokenVerificationError> {
        let state = lock(&self.state);
        if state.expired.iter().any(|expired| expired == token.as_str()) {
            return Err(TokenVerificationError::expired());
        }
        state
            .issued
            .get(token.as_str())
            .cloned()
            .ok_or_else(|| TokenVerificationError::malformed("token was not issued here"))
    }
}
