//! Credential adapters: bearer token signing and password hashing.

mod argon2_password_hasher;
mod hmac_token_issuer;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use hmac_token_issuer::{DEFAULT_TOKEN_TTL_HOURS, HmacTokenIssuer, TokenKeyError};
