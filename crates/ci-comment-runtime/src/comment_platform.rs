use async_trait::async_trait;
use ci_comment_github::comment_types::{Comment, CommentPage};
use ci_comment_github::thread_identity::ThreadIdentity;

use crate::PlatformError;

#[async_trait]
/// Comment CRUD and pagination on a hosted review platform.
///
/// Implementations pass failures through untouched; reconciliation never
/// retries a call.
pub trait CommentPlatform: Send + Sync {
    async fn create_comment(
        &self,
        thread: &ThreadIdentity,
        body: &str,
    ) -> Result<Comment, PlatformError>;

    async fn update_comment(
        &self,
        thread: &ThreadIdentity,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment, PlatformError>;

    async fn delete_comment(
        &self,
        thread: &ThreadIdentity,
        comment_id: u64,
    ) -> Result<(), PlatformError>;

    /// Fetches one page of the thread's comments in server order. Pages start at 1.
    async fn list_comments(
        &self,
        thread: &ThreadIdentity,
        page: u32,
    ) -> Result<CommentPage, PlatformError>;
}
