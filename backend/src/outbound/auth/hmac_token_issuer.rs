//! HMAC-SHA256 signed bearer tokens.
//!
//! A token is `hex(claims) "." hex(tag)`, where `claims` is the JSON document
//! `{"user":{"username":…,"id":…},"iat":…,"exp":…,"jti":…}` and `tag` is the
//! HMAC-SHA256 of the hex-encoded claims under the server key. `iat` and `exp`
//! are Unix seconds; `jti` is random so two tokens minted in the same second
//! for the same user still differ.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use hmac::{Hmac, Mac};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::domain::ids::random_hex;
use crate::domain::ports::{TokenIssuanceError, TokenIssuer, TokenVerificationError};
use crate::domain::{SessionToken, UserId, UserIdentity, Username};

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime applied when configuration does not override it.
pub const DEFAULT_TOKEN_TTL_HOURS: u64 = 7 * 24;

const JTI_BYTES: usize = 16;

/// Reasons a signing key cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenKeyError {
    /// The key was empty.
    #[error("token signing key must not be empty")]
    Empty,
}

#[derive(Debug, Serialize, Deserialize)]
struct ClaimsUser {
    username: String,
    id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user: ClaimsUser,
    iat: i64,
    exp: i64,
    jti: String,
}

/// [`TokenIssuer`] signing claims with a shared secret.
pub struct HmacTokenIssuer {
    key: Zeroizing<Vec<u8>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for HmacTokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacTokenIssuer")
            .field("key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl HmacTokenIssuer {
    /// Build an issuer over `key` minting tokens valid for `ttl`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use chrono::Duration;
    /// use mockable::DefaultClock;
    /// use redditclone::domain::ports::TokenIssuer;
    /// use redditclone::domain::{UserId, UserIdentity, Username};
    /// use redditclone::outbound::auth::HmacTokenIssuer;
    ///
    /// let issuer = HmacTokenIssuer::new(b"secret".to_vec(), Duration::hours(1), Arc::new(DefaultClock))
    ///     .expect("non-empty key");
    /// let alice = UserIdentity::new(UserId::random(), Username::new("alice").expect("username"));
    /// let token = issuer.issue(&alice).expect("issued");
    /// assert_eq!(issuer.verify(&token).expect("verified"), alice);
    /// ```
    pub fn new(
        key: impl Into<Vec<u8>>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenKeyError> {
        let key = Zeroizing::new(key.into());
        if key.is_empty() {
            return Err(TokenKeyError::Empty);
        }
        Ok(Self { key, ttl, clock })
    }
}

fn malformed(message: impl fmt::Display) -> TokenVerificationError {
    TokenVerificationError::malformed(message.to_string())
}

impl TokenIssuer for HmacTokenIssuer {
    fn issue(&self, identity: &UserIdentity) -> Result<SessionToken, TokenIssuanceError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenIssuanceError::signing("token expiry is out of range"))?;
        let claims = Claims {
            user: ClaimsUser {
                username: identity.username().as_str().to_owned(),
                id: identity.id().as_str().to_owned(),
            },
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: random_hex(JTI_BYTES),
        };
        let json = serde_json::to_vec(&claims)
            .map_err(|err| TokenIssuanceError::signing(err.to_string()))?;
        let payload = hex::encode(json);

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|err| TokenIssuanceError::signing(err.to_string()))?;
        mac.update(payload.as_bytes());
        let tag = hex::encode(mac.finalize().into_bytes());

        SessionToken::new(format!("{payload}.{tag}"))
            .map_err(|err| TokenIssuanceError::signing(err.to_string()))
    }

    fn verify(&self, token: &SessionToken) -> Result<UserIdentity, TokenVerificationError> {
        let (payload, tag) = token
            .as_str()
            .split_once('.')
            .ok_or_else(|| malformed("missing signature separator"))?;
        let tag = hex::decode(tag).map_err(malformed)?;

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|_| TokenVerificationError::bad_signature())?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag)
            .map_err(|_| TokenVerificationError::bad_signature())?;

        let json = hex::decode(payload).map_err(malformed)?;
        let claims: Claims = serde_json::from_slice(&json).map_err(malformed)?;
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenVerificationError::expired());
        }

        let id = UserId::new(claims.user.id).map_err(malformed)?;
        let username = Username::new(claims.user.username).map_err(malformed)?;
        Ok(UserIdentity::new(id, username))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for token signing, tampering, and expiry.
    use std::time::Duration as StdDuration;

    use super::*;
    use crate::test_support::{MutableClock, fixture_instant};
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(fixture_instant()))
    }

    #[fixture]
    fn alice() -> UserIdentity {
        UserIdentity::new(
            UserId::new("u-alice").expect("id"),
            Username::new("alice").expect("username"),
        )
    }

    fn issuer(clock: &Arc<MutableClock>, key: &[u8]) -> HmacTokenIssuer {
        HmacTokenIssuer::new(
            key.to_vec(),
            Duration::hours(1),
            Arc::clone(clock) as Arc<dyn Clock>,
        )
        .expect("valid key")
    }

    #[rstest]
    fn issued_tokens_verify_to_the_same_identity(clock: Arc<MutableClock>, alice: UserIdentity) {
        let issuer = issuer(&clock, b"secret");
        let token = issuer.issue(&alice).expect("issued");

        assert_eq!(issuer.verify(&token).expect("verified"), alice);
    }

    #[rstest]
    fn tokens_issued_in_the_same_instant_differ(clock: Arc<MutableClock>, alice: UserIdentity) {
        let issuer = issuer(&clock, b"secret");

        let first = issuer.issue(&alice).expect("first");
        let second = issuer.issue(&alice).expect("second");

        assert_ne!(first, second);
    }

    #[rstest]
    fn claims_carry_the_expected_fields(clock: Arc<MutableClock>, alice: UserIdentity) {
        let issuer = issuer(&clock, b"secret");
        let token = issuer.issue(&alice).expect("issued");
        let (payload, _) = token.as_str().split_once('.').expect("separator");

        let json: serde_json::Value =
            serde_json::from_slice(&hex::decode(payload).expect("hex")).expect("json");

        assert_eq!(json["user"]["username"], "alice");
        assert_eq!(json["user"]["id"], "u-alice");
        assert_eq!(json["iat"], fixture_instant().timestamp());
        assert_eq!(json["exp"], fixture_instant().timestamp() + 3600);
        assert!(json["jti"].is_string());
    }

    #[rstest]
    fn tampered_claims_fail_signature_check(clock: Arc<MutableClock>, alice: UserIdentity) {
        let issuer = issuer(&clock, b"secret");
        let token = issuer.issue(&alice).expect("issued");
        let (_, tag) = token.as_str().split_once('.').expect("separator");

        let forged_claims = Claims {
            user: ClaimsUser {
                username: "mallory".to_owned(),
                id: "u-alice".to_owned(),
            },
            iat: 0,
            exp: i64::MAX,
            jti: "forged".to_owned(),
        };
        let forged_payload = hex::encode(serde_json::to_vec(&forged_claims).expect("json"));
        let forged = SessionToken::new(format!("{forged_payload}.{tag}")).expect("token");

        assert_eq!(
            issuer.verify(&forged),
            Err(TokenVerificationError::BadSignature)
        );
    }

    #[rstest]
    fn tokens_signed_with_another_key_are_rejected(
        clock: Arc<MutableClock>,
        alice: UserIdentity,
    ) {
        let token = issuer(&clock, b"other").issue(&alice).expect("issued");

        assert_eq!(
            issuer(&clock, b"secret").verify(&token),
            Err(TokenVerificationError::BadSignature)
        );
    }

    #[rstest]
    fn tokens_expire_after_their_lifetime(clock: Arc<MutableClock>, alice: UserIdentity) {
        let issuer = issuer(&clock, b"secret");
        let token = issuer.issue(&alice).expect("issued");

        clock.advance(StdDuration::from_secs(3599));
        assert!(issuer.verify(&token).is_ok());

        clock.advance(StdDuration::from_secs(1));
        assert_eq!(issuer.verify(&token), Err(TokenVerificationError::Expired));
    }

    #[rstest]
    #[case("no-separator")]
    #[case("zz.zz")]
    fn malformed_tokens_are_rejected(clock: Arc<MutableClock>, #[case] raw: &str) {
        let issuer = issuer(&clock, b"secret");
        let token = SessionToken::new(raw).expect("token");

        assert!(matches!(
            issuer.verify(&token),
            Err(TokenVerificationError::Malformed { .. })
        ));
    }

    #[rstest]
    fn empty_keys_are_refused(clock: Arc<MutableClock>) {
        let result = HmacTokenIssuer::new(Vec::new(), Duration::hours(1), clock);

        assert!(matches!(result, Err(TokenKeyError::Empty)));
    }
}
