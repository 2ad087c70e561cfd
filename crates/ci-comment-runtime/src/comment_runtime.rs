//! End-to-end comment posting: materialize content, then reconcile it against
//! the thread through a `CommentPlatform`.

mod comment_locator;
mod github_api_client;
mod reconcile;


use ci_comment_github::content_materializer::{
    materialize_content, CommentContent, ContentEncoding,
};
use ci_comment_github::thread_identity::ThreadIdentity;

use crate::{CommentError, CommentPlatform};

pub use comment_locator::{find_comment, CommentPageCursor};
pub use github_api_client::{GithubCommentClient, GithubCommentClientConfig, GITHUB_API_BASE};
pub use reconcile::{CommentAction, CommentReconciler, ReconciliationResult, ReplaceMode};

#[derive(Debug)]
/// Everything needed to post one CI comment.
pub struct PostCommentRequest {
    pub thread: ThreadIdentity,
    pub content: CommentContent,
    pub encoding: ContentEncoding,
    pub purpose: Option<String>,
    pub replace_mode: ReplaceMode,
}

/// Materializes the request content and reconciles it with the thread.
///
/// Argument checks run before content is read so a bad invocation never
/// drains its input stream.
pub async fn post_ci_comment<P>(
    platform: &P,
    request: PostCommentRequest,
) -> Result<ReconciliationResult, CommentError>
where
    P: CommentPlatform + ?Sized,
{
    let PostCommentRequest {
        thread,
        content,
        encoding,
        purpose,
        replace_mode,
    } = request;
    let purpose = reconcile::normalize_purpose(purpose.as_deref());
    reconcile::ensure_replace_has_purpose(replace_mode, purpose)?;
    let content = materialize_content(content, encoding).await?;
    CommentReconciler::new(platform)
        .post_comment(&thread, &content, purpose, replace_mode)
        .await
}

/// One-line human summary, e.g. `updated @ci-bot's comment: <link>`.
pub fn render_reconciliation_summary(result: &ReconciliationResult) -> String {
    let verb = match result.action {
        Some(action) => action.past_tense(),
        None => "no change applied to",
    };
    format!("{verb} @{}'s comment: {}", result.author, result.link)
}
