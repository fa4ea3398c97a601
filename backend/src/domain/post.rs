//! Posts and their embedded comments.

use std::fmt;

use chrono::{DateTime, Utc};
use url::Url;

use super::ids::{CommentId, PostId, UserId};
use super::user::UserIdentity;
use super::voting::{self, VoteAction, VotePolarity, VoteSet, VoteTransition};

/// Maximum allowed length for a post title.
pub const TITLE_MAX: usize = 300;

/// Validation errors raised while building posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// Category was blank.
    #[error("category must not be empty")]
    EmptyCategory,
    /// Title was blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeded [`TITLE_MAX`] characters.
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Post kind was neither `text` nor `link`.
    #[error("unknown post type `{kind}`")]
    UnknownKind {
        /// Rejected value.
        kind: String,
    },
    /// Text post without a body.
    #[error("text posts require a body")]
    EmptyText,
    /// Link post whose URL failed to parse.
    #[error("invalid url: {message}")]
    InvalidUrl {
        /// Parser diagnostic.
        message: String,
    },
    /// Comment without a body.
    #[error("comment must not be empty")]
    EmptyComment,
}

/// Topic a post is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    /// Validate and construct a [`Category`]; surrounding whitespace is
    /// trimmed.
    pub fn new(category: impl AsRef<str>) -> Result<Self, PostValidationError> {
        let trimmed = category.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PostValidationError::EmptyCategory);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Post headline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTitle(String);

impl PostTitle {
    /// Validate and construct a [`PostTitle`].
    pub fn new(title: impl AsRef<str>) -> Result<Self, PostValidationError> {
        let trimmed = title.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(PostValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PostTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Body of a post: inline text or an external link, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostContent {
    /// Self post with a text body.
    Text {
        /// Markdown-free body text.
        body: String,
    },
    /// Link post pointing elsewhere.
    Link {
        /// Absolute target URL.
        url: Url,
    },
}

impl PostContent {
    /// Wire label of the content kind (`text` or `link`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Link { .. } => "link",
        }
    }
}

/// Validated input for a new post.
///
/// # Examples
/// ```
/// use redditclone::domain::{PostContent, PostDraft};
///
/// let draft = PostDraft::try_from_parts("link", "music", "Listen", "", "https://example.com/a")
///     .expect("valid draft");
/// assert!(matches!(draft.content(), PostContent::Link { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    category: Category,
    title: PostTitle,
    content: PostContent,
}

impl PostDraft {
    /// Build a draft from validated parts.
    pub fn new(category: Category, title: PostTitle, content: PostContent) -> Self {
        Self {
            category,
            title,
            content,
        }
    }

    /// Build a draft from raw request fields.
    ///
    /// `kind` selects which of `text` and `url` is used; the other is
    /// ignored.
    pub fn try_from_parts(
        kind: &str,
        category: &str,
        title: &str,
        text: &str,
        url: &str,
    ) -> Result<Self, PostValidationError> {
        let content = match kind.trim() {
            "text" => {
                if text.trim().is_empty() {
                    return Err(PostValidationError::EmptyText);
                }
                PostContent::Text {
                    body: text.to_owned(),
                }
            }
            "link" => {
                let url = Url::parse(url.trim()).map_err(|err| PostValidationError::InvalidUrl {
                    message: err.to_string(),
                })?;
                PostContent::Link { url }
            }
            other => {
                return Err(PostValidationError::UnknownKind {
                    kind: other.to_owned(),
                });
            }
        };
        Ok(Self::new(
            Category::new(category)?,
            PostTitle::new(title)?,
            content,
        ))
    }

    /// Target category.
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Headline.
    pub fn title(&self) -> &PostTitle {
        &self.title
    }

    /// Text body or link.
    pub fn content(&self) -> &PostContent {
        &self.content
    }
}

/// Comment embedded in a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id: CommentId,
    author: UserIdentity,
    body: String,
    created_at: DateTime<Utc>,
}

impl Comment {
    /// Build a comment; blank bodies are rejected.
    pub fn new(
        id: CommentId,
        author: UserIdentity,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PostValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(PostValidationError::EmptyComment);
        }
        Ok(Self {
            id,
            author,
            body,
            created_at,
        })
    }

    /// Comment identifier.
    pub fn id(&self) -> &CommentId {
        &self.id
    }

    /// Author snapshot.
    pub fn author(&self) -> &UserIdentity {
        &self.author
    }

    /// Comment text.
    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Reasons a mutation refuses to change a stored post.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostMutationError {
    /// The referenced comment is not attached to the post.
    #[error("comment {comment_id} not found")]
    CommentNotFound {
        /// Missing comment.
        comment_id: CommentId,
    },
    /// The caller did not write the comment.
    #[error("comment {comment_id} belongs to another user")]
    NotCommentAuthor {
        /// Protected comment.
        comment_id: CommentId,
    },
}

/// Post with its comments, votes, and derived score fields.
///
/// ## Invariants
/// - `votes` holds at most one vote per user.
/// - `score` equals the initial author vote adjusted by every transition and
///   changes only together with `votes` and `upvote_percentage`.
/// - `author` and comment authors are snapshots fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id: PostId,
    author: UserIdentity,
    category: Category,
    title: PostTitle,
    content: PostContent,
    score: i64,
    views: u64,
    comments: Vec<Comment>,
    votes: VoteSet,
    created_at: DateTime<Utc>,
    upvote_percentage: u8,
}

impl Post {
    /// Create a fresh post carrying its author's upvote.
    pub fn new(
        id: PostId,
        author: UserIdentity,
        draft: PostDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        let PostDraft {
            category,
            title,
            content,
        } = draft;
        let mut post = Self {
            id,
            author,
            category,
            title,
            content,
            score: 0,
            views: 0,
            comments: Vec::new(),
            votes: VoteSet::new(),
            created_at,
            upvote_percentage: 0,
        };
        let author_id = post.author.id().clone();
        post.apply_vote(&author_id, VoteAction::Upvote);
        post
    }

    /// Post identifier.
    pub fn id(&self) -> &PostId {
        &self.id
    }

    /// Author snapshot.
    pub fn author(&self) -> &UserIdentity {
        &self.author
    }

    /// Category the post is filed under.
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Headline.
    pub fn title(&self) -> &PostTitle {
        &self.title
    }

    /// Text body or link.
    pub fn content(&self) -> &PostContent {
        &self.content
    }

    /// Net score.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Number of times the post was opened.
    pub fn views(&self) -> u64 {
        self.views
    }

    /// Comments in insertion order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Current votes.
    pub fn votes(&self) -> &VoteSet {
        &self.votes
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Rounded share of upvotes.
    pub fn upvote_percentage(&self) -> u8 {
        self.upvote_percentage
    }

    /// Whether `user_id` wrote the post.
    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        self.author.id() == user_id
    }

    /// Current vote of `user_id`, if any.
    pub fn vote_of(&self, user_id: &UserId) -> Option<VotePolarity> {
        self.votes.polarity_of(user_id)
    }

    /// Count one more view.
    pub fn record_view(&mut self) {
        self.views = self.views.saturating_add(1);
    }

    /// Append a comment.
    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    /// Remove `comment_id` if `caller` wrote it.
    pub fn remove_comment(
        &mut self,
        comment_id: &CommentId,
        caller: &UserId,
    ) -> Result<Comment, PostMutationError> {
        let index = self
            .comments
            .iter()
            .position(|comment| comment.id() == comment_id)
            .ok_or_else(|| PostMutationError::CommentNotFound {
                comment_id: comment_id.clone(),
            })?;
        if self
            .comments
            .get(index)
            .is_some_and(|comment| comment.author().id() != caller)
        {
            return Err(PostMutationError::NotCommentAuthor {
                comment_id: comment_id.clone(),
            });
        }
        Ok(self.comments.remove(index))
    }

    /// Apply a vote transition, updating votes, score, and percentage
    /// together.
    pub fn apply_vote(&mut self, voter: &UserId, action: VoteAction) -> VoteTransition {
        let transition = voting::apply(&mut self.votes, voter, action);
        self.score += transition.score_delta();
        self.upvote_percentage = voting::upvote_percentage(&self.votes);
        transition
    }
}
