//! Driven port for the Auth Gateway.
//!
//! Issuers mint opaque bearer tokens binding a [`UserIdentity`] and verify
//! them later. The domain never parses a token; it stores and compares the
//! value only.

use crate::domain::{SessionToken, UserIdentity};

use super::define_port_error;

define_port_error! {
    /// Failures while minting a token.
    pub enum TokenIssuanceError {
        /// Signing or encoding the claims failed.
        Signing { message: String } => "token issuance failed: {message}",
    }
}

define_port_error! {
    /// Reasons a presented token is not accepted.
    pub enum TokenVerificationError {
        /// The token is not in the issuer's format.
        Malformed { message: String } => "token is malformed: {message}",
        /// The signature does not match the claims.
        BadSignature => "token signature is invalid",
        /// The token lifetime has elapsed.
        Expired => "token has expired",
    }
}

/// Issue and verify opaque bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Mint a token for `identity`.
    fn issue(&self, identity: &UserIdentity) -> Result<SessionToken, TokenIssuanceError>;

    /// Recover the identity bound into `token`.
    fn verify(&self, token: &SessionToken) -> Result<UserIdentity, TokenVerificationError>;
}
