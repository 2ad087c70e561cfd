use ci_comment_github::comment_marker::decode_marker;
use ci_comment_github::comment_types::{Comment, CommentPage};
use ci_comment_github::thread_identity::ThreadIdentity;
use tracing::debug;

use crate::{CommentPlatform, PlatformError};

const FIRST_COMMENT_PAGE: u32 = 1;

/// Forward-only walk over a thread's comment pages.
///
/// Pages are fetched one at a time on demand; a fresh cursor starts over at
/// the first page.
pub struct CommentPageCursor<'a, P: ?Sized> {
    platform: &'a P,
    thread: &'a ThreadIdentity,
    next_page: Option<u32>,
}

impl<'a, P> CommentPageCursor<'a, P>
where
    P: CommentPlatform + ?Sized,
{
    pub fn new(platform: &'a P, thread: &'a ThreadIdentity) -> Self {
        Self {
            platform,
            thread,
            next_page: Some(FIRST_COMMENT_PAGE),
        }
    }

    /// Returns the next page of comments, or `None` once the thread is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Comment>>, PlatformError> {
        let Some(page) = self.next_page else {
            return Ok(None);
        };
        let CommentPage {
            comments,
            next_page,
        } = self.platform.list_comments(self.thread, page).await?;
        // A server that does not advance would otherwise loop forever.
        self.next_page = next_page.filter(|next| *next > page);
        debug!(
            thread = %self.thread,
            page,
            comments = comments.len(),
            has_next = self.next_page.is_some(),
            "fetched comment page"
        );
        Ok(Some(comments))
    }
}

/// Returns the first comment on the thread whose marker carries `token`.
///
/// Stops requesting pages as soon as a match is found.
pub async fn find_comment<P>(
    platform: &P,
    thread: &ThreadIdentity,
    token: &str,
) -> Result<Option<Comment>, PlatformError>
where
    P: CommentPlatform + ?Sized,
{
    let mut cursor = CommentPageCursor::new(platform, thread);
    while let Some(comments) = cursor.next_page().await? {
        if let Some(found) = comments
            .into_iter()
            .find(|comment| decode_marker(&comment.body) == Some(token))
        {
            return Ok(Some(found));
        }
    }
    Ok(None)
}
