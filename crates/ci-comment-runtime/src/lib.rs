//! Comment reconciliation runtime: locates purpose-marked comments on a
//! GitHub thread and creates, updates, or replaces them through an injected
//! platform client.

mod comment_error;
mod comment_platform;
mod comment_runtime;

pub use ci_comment_github::comment_types::{Comment, CommentPage};
pub use ci_comment_github::content_materializer::{CommentContent, ContentEncoding, ContentError};
pub use ci_comment_github::thread_identity::{ThreadIdentity, ThreadIdentityError};
pub use comment_error::{CommentError, PlatformError, ReplaceStep};
pub use comment_platform::CommentPlatform;
pub use comment_runtime::{
    find_comment, post_ci_comment, render_reconciliation_summary, CommentAction,
    CommentPageCursor, CommentReconciler, GithubCommentClient, GithubCommentClientConfig,
    PostCommentRequest, ReconciliationResult, ReplaceMode, GITHUB_API_BASE,
};
