//! Argon2id password hashing.
//!
//! Digests are PHC strings (`$argon2id$v=19$m=…,t=…,p=…$salt$hash`) so the
//! parameters travel with each digest and verification needs no
//! configuration. Hashing runs on the blocking pool.

use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Salt size for new digests (128 bits).
const SALT_SIZE: usize = 16;

/// [`PasswordHasher`] backed by Argon2id.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Hasher using the crate's recommended Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher using explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }
}

fn hash_blocking(params: Params, plaintext: &[u8]) -> Result<String, PasswordHashError> {
    let mut salt = [0_u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt)
        .map_err(|err| PasswordHashError::hashing(format!("invalid salt: {err}")))?;
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(plaintext, &salt)
        .map(|digest| digest.to_string())
        .map_err(|err| PasswordHashError::hashing(err.to_string()))
}

fn verify_blocking(digest: &str, plaintext: &[u8]) -> bool {
    let Ok(parsed) = PhcString::new(digest) else {
        warn!("stored password digest is not a PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(plaintext, &parsed)
        .is_ok()
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHashError> {
        let params = self.params.clone();
        let plaintext = Zeroizing::new(plaintext.as_bytes().to_vec());
        let digest = tokio::task::spawn_blocking(move || hash_blocking(params, &plaintext))
            .await
            .map_err(|err| PasswordHashError::hashing(format!("hashing task failed: {err}")))??;
        PasswordHash::new(digest).map_err(|err| PasswordHashError::hashing(err.to_string()))
    }

    async fn verify(&self, digest: &PasswordHash, plaintext: &str) -> bool {
        let digest = digest.as_str().to_owned();
        let plaintext = Zeroizing::new(plaintext.as_bytes().to_vec());
        match tokio::task::spawn_blocking(move || verify_blocking(&digest, &plaintext)).await {
            Ok(matches) => matches,
            Err(err) => {
                warn!(error = %err, "password verification task failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for Argon2 hashing and verification.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        // Minimum cost keeps the suite fast; production uses the defaults.
        Argon2PasswordHasher::with_params(Params::new(8, 1, 1, None).expect("valid params"))
    }

    #[rstest]
    #[tokio::test]
    async fn hashed_passwords_verify(hasher: Argon2PasswordHasher) {
        let digest = hasher.hash("hunter2").await.expect("hashed");

        assert!(digest.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify(&digest, "hunter2").await);
        assert!(!hasher.verify(&digest, "hunter3").await);
    }

    #[rstest]
    #[tokio::test]
    async fn equal_passwords_get_distinct_salts(hasher: Argon2PasswordHasher) {
        let first = hasher.hash("hunter2").await.expect("first");
        let second = hasher.hash("hunter2").await.expect("second");

        assert_ne!(first.as_str(), second.as_str());
    }

    #[rstest]
    #[tokio::test]
    async fn unreadable_digests_never_match(hasher: Argon2PasswordHasher) {
        let digest = PasswordHash::new("not-a-phc-string").expect("digest");

        assert!(!hasher.verify(&digest, "anything").await);
    }
}
