//! Outbound adapters implementing domain ports.
//!
//! - **memory**: process-local stores behind one reader/writer lock each.
//! - **auth**: HMAC-signed bearer tokens and Argon2 password hashing.
//!
//! Adapters are thin translators between domain types and their backing
//! representation. They contain no business logic.

pub mod auth;
pub mod memory;
