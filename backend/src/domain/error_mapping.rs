//! Translate port errors into service [`Error`] payloads.

use serde_json::json;

use super::ports::{
    PasswordHashError, PostRepositoryError, SessionRepositoryError, TokenIssuanceError,
    TokenVerificationError, UserRepositoryError,
};
use super::{Error, PostMutationError, PostValidationError, Username};

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::NotFound { .. } => Error::not_found("user not found"),
        UserRepositoryError::AlreadyExists { id } => {
            Error::conflict(format!("user {id} already exists"))
        }
    }
}

pub(crate) fn map_session_error(error: SessionRepositoryError) -> Error {
    match error {
        SessionRepositoryError::NotFound => Error::not_found("session not found"),
        other => Error::conflict(other.to_string()),
    }
}

pub(crate) fn map_post_error(error: PostRepositoryError) -> Error {
    match error {
        PostRepositoryError::NotFound { .. } => Error::not_found("post not found"),
        PostRepositoryError::NoPostsForUser { .. } => Error::not_found("no posts found for user"),
        PostRepositoryError::AlreadyExists { id } => {
            Error::conflict(format!("post {id} already exists"))
        }
        PostRepositoryError::Rejected { reason } => map_mutation_error(reason),
    }
}

pub(crate) fn map_mutation_error(error: PostMutationError) -> Error {
    match error {
        PostMutationError::CommentNotFound { .. } => Error::not_found("comment not found"),
        PostMutationError::NotCommentAuthor { .. } => {
            Error::forbidden("only the author can delete a comment")
        }
    }
}

pub(crate) fn map_validation_error(error: PostValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

pub(crate) fn map_issuance_error(error: TokenIssuanceError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_verification_error(error: TokenVerificationError) -> Error {
    match error {
        TokenVerificationError::Expired => Error::unauthorized("token expired"),
        TokenVerificationError::BadSignature | TokenVerificationError::Malformed { .. } => {
            Error::unauthorized("invalid token")
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

/// Conflict payload for a username that is already registered.
pub(crate) fn username_taken(username: &Username) -> Error {
    Error::conflict("username already exists").with_details(json!({
        "location": "body",
        "param": "username",
        "value": username.as_str(),
        "msg": "already exists",
    }))
}
