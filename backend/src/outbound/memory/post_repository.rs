//! In-memory Post Store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{PostMutation, PostRepository, PostRepositoryError};
use crate::domain::{Category, Post, PostId, UserId};

use super::{read, write};

/// Post Store keyed by [`PostId`].
///
/// Category and author queries scan every record. Mutations run on a copy
/// of the stored post and replace it only once they succeed, so a rejected
/// or panicking mutation leaves the stored post as it was.
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<PostId, Post>>,
}

impl InMemoryPostRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, predicate: impl Fn(&Post) -> bool) -> Vec<Post> {
        read(&self.posts)
            .values()
            .filter(|post| predicate(post))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn all(&self) -> Vec<Post> {
        read(&self.posts).values().cloned().collect()
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Post, PostRepositoryError> {
        read(&self.posts)
            .get(id)
            .cloned()
            .ok_or_else(|| PostRepositoryError::not_found(id.clone()))
    }

    async fn by_category(&self, category: &Category) -> Vec<Post> {
        self.matching(|post| post.category() == category)
    }

    async fn by_author(&self, user_id: &UserId) -> Result<Vec<Post>, PostRepositoryError> {
        let posts = self.matching(|post| post.is_authored_by(user_id));
        if posts.is_empty() {
            return Err(PostRepositoryError::no_posts_for_user(user_id.clone()));
        }
        Ok(posts)
    }

    async fn create(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut posts = write(&self.posts);
        if posts.contains_key(post.id()) {
            return Err(PostRepositoryError::already_exists(post.id().clone()));
        }
        posts.insert(post.id().clone(), post.clone());
        debug!(post_id = %post.id(), total = posts.len(), "stored post");
        Ok(())
    }

    async fn update(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut posts = write(&self.posts);
        let stored = posts
            .get_mut(post.id())
            .ok_or_else(|| PostRepositoryError::not_found(post.id().clone()))?;
        *stored = post.clone();
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<(), PostRepositoryError> {
        write(&self.posts)
            .remove(id)
            .map(drop)
            .ok_or_else(|| PostRepositoryError::not_found(id.clone()))
    }

    async fn modify(
        &self,
        id: &PostId,
        mutation: PostMutation,
    ) -> Result<Post, PostRepositoryError> {
        let mut posts = write(&self.posts);
        let stored = posts
            .get_mut(id)
            .ok_or_else(|| PostRepositoryError::not_found(id.clone()))?;
        let mut updated = stored.clone();
        mutation(&mut updated).map_err(|reason| {
            debug!(post_id = %id, %reason, "post mutation rejected");
            PostRepositoryError::rejected(reason)
        })?;
        *stored = updated.clone();
        Ok(updated)
    }
}
