//! Post listing, publishing, comments, and votes.
//!
//! Every read-modify-write goes through [`PostRepository::modify`], so views,
//! comments, and votes from concurrent callers never overwrite one another.

use std::cmp::Reverse;
use std::sync::{Arc, OnceLock};

use mockable::Clock;
use tracing::{debug, info};

use super::error_mapping::{map_post_error, map_user_error, map_validation_error};
use super::ports::{PostMutation, PostRepository, PostRepositoryError, UserRepository};
use super::{
    Category, Comment, CommentId, Error, Post, PostDraft, PostId, UserId, UserIdentity, Username,
    VoteAction, VoteTransition,
};

/// Post service driving the Post Store.
pub struct PostService<P, U> {
    posts: Arc<P>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<P, U> Clone for PostService<P, U> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
            users: Arc::clone(&self.users),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, U> PostService<P, U> {
    /// Create a new service over the Post and Identity stores.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// use redditclone::domain::PostService;
    /// use redditclone::outbound::memory::{InMemoryPostRepository, InMemoryUserRepository};
    ///
    /// let service = PostService::new(
    ///     Arc::new(InMemoryPostRepository::new()),
    ///     Arc::new(InMemoryUserRepository::new()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(posts: Arc<P>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            posts,
            users,
            clock,
        }
    }
}

impl<P, U> PostService<P, U>
where
    P: PostRepository,
    U: UserRepository,
{
    fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
        posts.sort_by_key(|post| Reverse((post.created_at(), post.id().clone())));
        posts
    }

    /// Every post, newest first.
    pub async fn list_all(&self) -> Vec<Post> {
        Self::newest_first(self.posts.all().await)
    }

    /// Posts filed under `category`, newest first.
    pub async fn list_by_category(&self, category: &Category) -> Vec<Post> {
        Self::newest_first(self.posts.by_category(category).await)
    }

    /// Posts written by `username`, newest first.
    ///
    /// An unknown user is `NotFound`; a known user without posts gets an
    /// empty list.
    pub async fn list_by_author(&self, username: &Username) -> Result<Vec<Post>, Error> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(map_user_error)?;
        match self.posts.by_author(user.id()).await {
            Ok(posts) => Ok(Self::newest_first(posts)),
            Err(PostRepositoryError::NoPostsForUser { user_id }) => {
                debug!(%user_id, "user has no posts");
                Ok(Vec::new())
            }
            Err(err) => Err(map_post_error(err)),
        }
    }

    /// Publish a post carrying its author's upvote.
    pub async fn create(&self, author: &UserIdentity, draft: PostDraft) -> Result<Post, Error> {
        let post = Post::new(PostId::random(), author.clone(), draft, self.clock.utc());
        self.posts.create(&post).await.map_err(map_post_error)?;
        info!(
            post_id = %post.id(),
            author_id = %author.id(),
            category = %post.category(),
            kind = post.content().kind(),
            "created post"
        );
        Ok(post)
    }

    /// Fetch a post for display, counting the view.
    pub async fn open(&self, id: &PostId) -> Result<Post, Error> {
        self.mutate(id, Box::new(|post: &mut Post| {
            post.record_view();
            Ok(())
        }))
        .await
    }

    /// Append a comment by `author`.
    pub async fn add_comment(
        &self,
        id: &PostId,
        author: &UserIdentity,
        body: &str,
    ) -> Result<Post, Error> {
        let comment = Comment::new(CommentId::random(), author.clone(), body, self.clock.utc())
            .map_err(map_validation_error)?;
        let comment_id = comment.id().clone();
        let post = self
            .mutate(id, Box::new(move |post: &mut Post| {
                post.add_comment(comment);
                Ok(())
            }))
            .await?;
        info!(post_id = %id, %comment_id, author_id = %author.id(), "added comment");
        Ok(post)
    }

    /// Remove a comment; only its author may do so.
    pub async fn remove_comment(
        &self,
        id: &PostId,
        comment_id: &CommentId,
        caller: &UserId,
    ) -> Result<Post, Error> {
        let target = comment_id.clone();
        let remover = caller.clone();
        let post = self
            .mutate(id, Box::new(move |post: &mut Post| {
                post.remove_comment(&target, &remover).map(drop)
            }))
            .await?;
        info!(post_id = %id, %comment_id, "removed comment");
        Ok(post)
    }

    /// Cast or flip `voter`'s vote to +1.
    pub async fn upvote(&self, id: &PostId, voter: &UserId) -> Result<Post, Error> {
        self.vote(id, voter, VoteAction::Upvote)
            .await
            .map(|(post, _)| post)
    }

    /// Cast or flip `voter`'s vote to -1.
    pub async fn downvote(&self, id: &PostId, voter: &UserId) -> Result<Post, Error> {
        self.vote(id, voter, VoteAction::Downvote)
            .await
            .map(|(post, _)| post)
    }

    /// Retract `voter`'s vote, if any.
    pub async fn unvote(&self, id: &PostId, voter: &UserId) -> Result<Post, Error> {
        self.vote(id, voter, VoteAction::Unvote)
            .await
            .map(|(post, _)| post)
    }

    /// Apply `action` by `voter`, returning the committed post and the
    /// transition the vote made.
    pub async fn vote(
        &self,
        id: &PostId,
        voter: &UserId,
        action: VoteAction,
    ) -> Result<(Post, VoteTransition), Error> {
        let actor = voter.clone();
        let outcome = Arc::new(OnceLock::new());
        let slot = Arc::clone(&outcome);
        let post = self
            .mutate(id, Box::new(move |post: &mut Post| {
                let _ = slot.set(post.apply_vote(&actor, action));
                Ok(())
            }))
            .await?;
        let transition = outcome
            .get()
            .copied()
            .ok_or_else(|| Error::internal("vote was not applied"))?;
        debug!(
            post_id = %id,
            voter_id = %voter,
            ?action,
            before = ?transition.before,
            after = ?transition.after,
            score_delta = transition.score_delta(),
            changed = transition.is_change(),
            score = post.score(),
            upvote_percentage = post.upvote_percentage(),
            "applied vote"
        );
        Ok((post, transition))
    }

    /// Delete a post; only its author may do so.
    pub async fn delete(&self, id: &PostId, caller: &UserId) -> Result<(), Error> {
        let post = self.posts.find_by_id(id).await.map_err(map_post_error)?;
        if !post.is_authored_by(caller) {
            debug!(post_id = %id, caller_id = %caller, "delete by non-author refused");
            return Err(Error::forbidden("only the author can delete a post"));
        }
        self.posts.delete(id).await.map_err(map_post_error)?;
        info!(post_id = %id, "deleted post");
        Ok(())
    }

    async fn mutate(&self, id: &PostId, mutation: PostMutation) -> Result<Post, Error> {
        self.posts.modify(id, mutation).await.map_err(map_post_error)
    }
}

#[cfg(test)]
#[path = "post_service_tests.rs"]
mod tests;
