//! Driven port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Failures while hashing a password.
    pub enum PasswordHashError {
        /// The hashing backend rejected the input or its parameters.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Hash and check passwords without exposing the algorithm.
///
/// Methods are async so CPU-heavy implementations can leave the caller's
/// executor thread.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a digest of `plaintext`.
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Whether `plaintext` matches `digest`. Unreadable digests do not match.
    async fn verify(&self, digest: &PasswordHash, plaintext: &str) -> bool;
}
