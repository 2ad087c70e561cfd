use std::fmt;

use ci_comment_github::comment_types::Comment;
use ci_comment_github::content_materializer::ContentError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Failure reported by a `CommentPlatform` call.
pub enum PlatformError {
    #[error("github api {operation} request failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("github api {operation} failed with status {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode github {operation} response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid github client configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The half of a delete-and-recreate replace that failed.
pub enum ReplaceStep {
    Delete,
    Create,
}

impl fmt::Display for ReplaceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => f.write_str("delete"),
            Self::Create => f.write_str("create"),
        }
    }
}

#[derive(Debug, Error)]
/// Enumerates supported `CommentError` values.
pub enum CommentError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("invalid comment content: {0}")]
    Content(#[from] ContentError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// Exactly one half of a replace succeeded; the thread may now hold both
    /// the old and the new comment, or neither.
    #[error("replace of comment {old_comment_id} only partially applied ({failed_step} failed): {source}")]
    PartialReplace {
        old_comment_id: u64,
        failed_step: ReplaceStep,
        created: Option<Box<Comment>>,
        #[source]
        source: PlatformError,
    },
}
