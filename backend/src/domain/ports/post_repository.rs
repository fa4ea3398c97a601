//! Port abstraction for the Post Store and its errors.
//!
//! Reads hand out value snapshots. Read-modify-write sequences (views,
//! comments, votes) must go through [`PostRepository::modify`], which runs the
//! mutation under the store's exclusive lock so concurrent writers cannot
//! interleave. [`PostRepository::update`] is a wholesale replace for callers
//! that already hold a complete record.

use async_trait::async_trait;

use crate::domain::{Category, Post, PostId, PostMutationError, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by Post Store adapters.
    pub enum PostRepositoryError {
        /// No post has the identifier.
        NotFound { id: PostId } => "post not found: {id}",
        /// A post with the same identifier is already stored.
        AlreadyExists { id: PostId } => "post already exists: {id}",
        /// The author has not published anything. Distinct from an empty
        /// success so callers can branch on it.
        NoPostsForUser { user_id: UserId } => "no posts found for user {user_id}",
        /// The mutation passed to [`PostRepository::modify`] refused to apply.
        Rejected { reason: PostMutationError } => "post mutation rejected: {reason}",
    }
}

/// In-place change applied by [`PostRepository::modify`].
///
/// Returning an error aborts the change and leaves the stored post untouched.
pub type PostMutation = Box<dyn FnOnce(&mut Post) -> Result<(), PostMutationError> + Send>;

/// Post Store contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Snapshot every stored post.
    async fn all(&self) -> Vec<Post>;

    /// Snapshot one post.
    async fn find_by_id(&self, id: &PostId) -> Result<Post, PostRepositoryError>;

    /// Snapshot posts filed under `category`; empty when none match.
    async fn by_category(&self, category: &Category) -> Vec<Post>;

    /// Snapshot posts written by `user_id`.
    ///
    /// Fails with [`PostRepositoryError::NoPostsForUser`] instead of
    /// returning an empty list.
    async fn by_author(&self, user_id: &UserId) -> Result<Vec<Post>, PostRepositoryError>;

    /// Store a new post.
    async fn create(&self, post: &Post) -> Result<(), PostRepositoryError>;

    /// Replace a stored post wholesale.
    async fn update(&self, post: &Post) -> Result<(), PostRepositoryError>;

    /// Remove a post.
    async fn delete(&self, id: &PostId) -> Result<(), PostRepositoryError>;

    /// Atomically read, mutate, and write back one post, returning the
    /// committed snapshot.
    async fn modify(
        &self,
        id: &PostId,
        mutation: PostMutation,
    ) -> Result<Post, PostRepositoryError>;
}
