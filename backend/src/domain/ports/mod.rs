//! Domain ports defining the edges of the hexagon.
//!
//! Stores and credential backends implement these traits; the driving
//! services in [`crate::domain`] only ever see the trait objects. Each port
//! carries its own error enum so adapters report failures as predictable
//! variants.

mod macros;
pub(crate) use macros::define_port_error;

mod password_hasher;
mod post_repository;
mod session_repository;
mod token_issuer;
mod user_repository;

#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostMutation, PostRepository, PostRepositoryError};
#[cfg(test)]
pub use session_repository::MockSessionRepository;
pub use session_repository::{SessionRepository, SessionRepositoryError};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenIssuanceError, TokenIssuer, TokenVerificationError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
