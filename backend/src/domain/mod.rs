//! Domain primitives, aggregates, and driving services.
//!
//! Purpose: Define strongly typed records for users, sessions, posts, and
//! votes, the ports the stores implement, and the services that compose them.
//! Records are plain values; every read from a store is a snapshot.
//!
//! Public surface:
//! - Error / ErrorCode: service error payload and stable identifier.
//! - User, Session, Post: stored records and their newtypes.
//! - voting: the pure vote transition functions.
//! - AccountService, PostService: the operations callers drive.

pub mod account_service;
pub mod auth;
pub mod error;
mod error_mapping;
pub mod ids;
pub mod ports;
pub mod post;
pub mod post_service;
pub mod session;
pub mod user;
pub mod voting;

pub use self::account_service::AccountService;
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{CommentId, IdValidationError, PostId, UserId};
pub use self::post::{
    Category, Comment, Post, PostContent, PostDraft, PostMutationError, PostTitle,
    PostValidationError, TITLE_MAX,
};
pub use self::post_service::PostService;
pub use self::session::{Session, SessionToken, SessionTokenValidationError};
pub use self::user::{
    PasswordHash, USERNAME_MAX, User, UserIdentity, UserValidationError, Username,
};
pub use self::voting::{Vote, VoteAction, VotePolarity, VoteSet, VoteTransition};

/// Convenient service result alias.
///
/// # Examples
/// ```
/// use redditclone::domain::{DomainResult, Error};
///
/// fn guarded() -> DomainResult<()> {
///     Err(Error::forbidden("nope"))
/// }
///
/// assert!(guarded().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
