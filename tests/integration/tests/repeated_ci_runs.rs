use std::collections::HashMap;

use async_trait::async_trait;
use ci_comment_github::comment_marker::{decode_marker, encode_marker};
use ci_comment_github::dedupe_token::{derive_token, DEDUPE_TOKEN_NAMESPACE};
use ci_comment_runtime::{
    post_ci_comment, Comment, CommentAction, CommentContent, CommentPage, CommentPlatform,
    ContentEncoding, PlatformError, PostCommentRequest, ReconciliationResult, ReplaceMode,
    ThreadIdentity,
};
use serde_json::json;
use tokio::sync::Mutex as AsyncMutex;

type ThreadKey = (String, String, u64);

fn thread_key(thread: &ThreadIdentity) -> ThreadKey {
    (thread.owner.clone(), thread.repo.clone(), thread.thread_number)
}

#[derive(Default)]
struct HostedThreads {
    threads: HashMap<ThreadKey, Vec<Comment>>,
    next_id: u64,
    listed_pages: Vec<u32>,
}

/// In-memory stand-in for a hosted review platform, paginating every thread
/// in fixed-size pages.
struct SimulatedGithub {
    page_size: usize,
    login: String,
    state: AsyncMutex<HostedThreads>,
}

impl SimulatedGithub {
    fn new(page_size: usize) -> Self {
        Self {
            page_size,
            login: "ci-bot".to_string(),
            state: AsyncMutex::new(HostedThreads {
                next_id: 100,
                ..HostedThreads::default()
            }),
        }
    }

    async fn seed(&self, thread: &ThreadIdentity, author: &str, body: &str) -> u64 {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let id = state.next_id;
        let comment = build_comment(thread, id, author, body);
        state
            .threads
            .entry(thread_key(thread))
            .or_default()
            .push(comment);
        id
    }

    async fn comments(&self, thread: &ThreadIdentity) -> Vec<Comment> {
        let state = self.state.lock().await;
        state
            .threads
            .get(&thread_key(thread))
            .cloned()
            .unwrap_or_default()
    }

    async fn take_listed_pages(&self) -> Vec<u32> {
        std::mem::take(&mut self.state.lock().await.listed_pages)
    }
}

fn build_comment(thread: &ThreadIdentity, id: u64, author: &str, body: &str) -> Comment {
    Comment {
        id,
        url: format!(
            "https://api.github.com/repos/{}/issues/comments/{id}",
            thread.as_slug()
        ),
        body: body.to_string(),
        author: author.to_string(),
        html_url: format!(
            "https://github.com/{}/pull/{}#issuecomment-{id}",
            thread.as_slug(),
            thread.thread_number
        ),
    }
}

fn not_found(operation: &str) -> PlatformError {
    PlatformError::Status {
        operation: operation.to_string(),
        status: 404,
        body: "{\"message\":\"Not Found\"}".to_string(),
    }
}

#[async_trait]
impl CommentPlatform for SimulatedGithub {
    async fn create_comment(
        &self,
        thread: &ThreadIdentity,
        body: &str,
    ) -> Result<Comment, PlatformError> {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let comment = build_comment(thread, state.next_id, &self.login, body);
        state
            .threads
            .entry(thread_key(thread))
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        thread: &ThreadIdentity,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment, PlatformError> {
        let mut state = self.state.lock().await;
        let comment = state
            .threads
            .get_mut(&thread_key(thread))
            .and_then(|comments| comments.iter_mut().find(|comment| comment.id == comment_id))
            .ok_or_else(|| not_found("update issue comment"))?;
        comment.body = body.to_string();
        Ok(comment.clone())
    }

    async fn delete_comment(
        &self,
        thread: &ThreadIdentity,
        comment_id: u64,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock().await;
        let comments = state
            .threads
            .get_mut(&thread_key(thread))
            .ok_or_else(|| not_found("delete issue comment"))?;
        let before = comments.len();
        comments.retain(|comment| comment.id != comment_id);
        if comments.len() == before {
            return Err(not_found("delete issue comment"));
        }
        Ok(())
    }

    async fn list_comments(
        &self,
        thread: &ThreadIdentity,
        page: u32,
    ) -> Result<CommentPage, PlatformError> {
        let mut state = self.state.lock().await;
        state.listed_pages.push(page);
        let comments = state
            .threads
            .get(&thread_key(thread))
            .cloned()
            .unwrap_or_default();
        let start = (page.saturating_sub(1) as usize) * self.page_size;
        let rows: Vec<Comment> = comments
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        let next_page = (start + self.page_size < comments.len()).then_some(page + 1);
        Ok(CommentPage {
            comments: rows,
            next_page,
        })
    }
}

fn pull_request(number: u64) -> ThreadIdentity {
    ThreadIdentity::new("acme", "widgets", number).expect("thread identity")
}

async fn run_ci(
    github: &SimulatedGithub,
    thread: &ThreadIdentity,
    purpose: Option<&str>,
    replace_mode: ReplaceMode,
    content: &str,
) -> ReconciliationResult {
    post_ci_comment(
        github,
        PostCommentRequest {
            thread: thread.clone(),
            content: CommentContent::from(content),
            encoding: ContentEncoding::Utf8,
            purpose: purpose.map(ToOwned::to_owned),
            replace_mode,
        },
    )
    .await
    .expect("ci run")
}

fn marked_with(comments: &[Comment], token: &str) -> Vec<u64> {
    comments
        .iter()
        .filter(|comment| decode_marker(&comment.body) == Some(token))
        .map(|comment| comment.id)
        .collect()
}

#[tokio::test]
async fn integration_repeated_runs_converge_on_one_comment_per_purpose() {
    let github = SimulatedGithub::new(2);
    let thread = pull_request(4);
    let token = derive_token(DEDUPE_TOKEN_NAMESPACE, "acme", "widgets", 4, "lint");

    let first = run_ci(&github, &thread, Some("lint"), ReplaceMode::Off, "2 warnings").await;
    assert_eq!(first.action, Some(CommentAction::Create));

    let second = run_ci(&github, &thread, Some("lint"), ReplaceMode::Off, "2 warnings").await;
    assert_eq!(second.action, None);
    assert_eq!(second.comment_id, first.comment_id);

    let third = run_ci(&github, &thread, Some("lint"), ReplaceMode::Off, "clean").await;
    assert_eq!(third.action, Some(CommentAction::Update));
    assert_eq!(third.comment_id, first.comment_id);

    let comments = github.comments(&thread).await;
    assert_eq!(marked_with(&comments, token.as_str()), vec![first.comment_id]);
    assert_eq!(
        comments[0].body,
        format!("{}\nclean", encode_marker(token.as_str()))
    );
}

#[tokio::test]
async fn integration_replace_moves_changed_report_below_discussion() {
    let github = SimulatedGithub::new(2);
    let thread = pull_request(4);

    let original = run_ci(&github, &thread, Some("bench"), ReplaceMode::Off, "v1").await;
    github.seed(&thread, "reviewer", "why did this regress?").await;

    let unchanged = run_ci(&github, &thread, Some("bench"), ReplaceMode::IfDifferent, "v1").await;
    assert_eq!(unchanged.action, None);

    let replaced = run_ci(&github, &thread, Some("bench"), ReplaceMode::IfDifferent, "v2").await;
    assert_eq!(replaced.action, Some(CommentAction::Replace));
    assert_ne!(replaced.comment_id, original.comment_id);

    let comments = github.comments(&thread).await;
    let ids: Vec<u64> = comments.iter().map(|comment| comment.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(!ids.contains(&original.comment_id));
    assert_eq!(ids.last(), Some(&replaced.comment_id));

    let forced = run_ci(&github, &thread, Some("bench"), ReplaceMode::Force, "v2").await;
    assert_eq!(forced.action, Some(CommentAction::Replace));
    assert_eq!(github.comments(&thread).await.len(), 2);
}

#[tokio::test]
async fn integration_purposes_and_pull_requests_are_isolated() {
    let github = SimulatedGithub::new(2);
    let pr_four = pull_request(4);
    let pr_five = pull_request(5);

    let lint = run_ci(&github, &pr_four, Some("lint"), ReplaceMode::Off, "ok").await;
    let coverage = run_ci(&github, &pr_four, Some("coverage"), ReplaceMode::Off, "91%").await;
    let other_pr = run_ci(&github, &pr_five, Some("lint"), ReplaceMode::Off, "ok").await;
    assert_eq!(lint.action, Some(CommentAction::Create));
    assert_eq!(coverage.action, Some(CommentAction::Create));
    assert_eq!(other_pr.action, Some(CommentAction::Create));

    let lint_again = run_ci(&github, &pr_four, Some("lint"), ReplaceMode::Off, "1 warning").await;
    assert_eq!(lint_again.comment_id, lint.comment_id);

    let pr_four_comments = github.comments(&pr_four).await;
    assert_eq!(pr_four_comments.len(), 2);
    let coverage_comment = pr_four_comments
        .iter()
        .find(|comment| comment.id == coverage.comment_id)
        .expect("coverage comment");
    assert!(coverage_comment.body.ends_with("\n91%"));
    assert_eq!(github.comments(&pr_five).await.len(), 1);
}

#[tokio::test]
async fn integration_without_purpose_every_run_posts_an_unmarked_comment() {
    let github = SimulatedGithub::new(2);
    let thread = pull_request(4);

    let first = run_ci(&github, &thread, None, ReplaceMode::Off, "build log").await;
    let second = run_ci(&github, &thread, None, ReplaceMode::Off, "build log").await;
    assert_eq!(first.action, Some(CommentAction::Create));
    assert_eq!(second.action, Some(CommentAction::Create));
    assert_ne!(first.comment_id, second.comment_id);

    let comments = github.comments(&thread).await;
    assert!(comments
        .iter()
        .all(|comment| comment.body == "build log" && decode_marker(&comment.body).is_none()));
    assert!(github.take_listed_pages().await.is_empty());
}

#[tokio::test]
async fn integration_marked_comment_is_found_beyond_the_first_pages() {
    let github = SimulatedGithub::new(2);
    let thread = pull_request(4);
    for index in 0..5 {
        github
            .seed(&thread, "reviewer", &format!("review note {index}"))
            .await;
    }
    let created = run_ci(&github, &thread, Some("docs"), ReplaceMode::Off, "draft").await;
    assert_eq!(created.action, Some(CommentAction::Create));
    assert_eq!(github.take_listed_pages().await, vec![1, 2, 3]);

    github.seed(&thread, "reviewer", "looks good").await;
    let updated = run_ci(&github, &thread, Some("docs"), ReplaceMode::Off, "final").await;
    assert_eq!(updated.action, Some(CommentAction::Update));
    assert_eq!(updated.comment_id, created.comment_id);
    // The match sits on page 3; page 4 is never requested.
    assert_eq!(github.take_listed_pages().await, vec![1, 2, 3]);
}

#[tokio::test]
async fn regression_quoted_marker_in_a_reply_is_not_adopted() {
    let github = SimulatedGithub::new(10);
    let thread = pull_request(4);
    let token = derive_token(DEDUPE_TOKEN_NAMESPACE, "acme", "widgets", 4, "lint");
    let quoted = format!("> {}\n> 2 warnings\n\nplease fix", encode_marker(token.as_str()));
    let reply_id = github.seed(&thread, "reviewer", &quoted).await;

    let result = run_ci(&github, &thread, Some("lint"), ReplaceMode::Off, "2 warnings").await;
    assert_eq!(result.action, Some(CommentAction::Create));
    assert_ne!(result.comment_id, reply_id);

    let comments = github.comments(&thread).await;
    assert_eq!(comments[0].body, quoted);
    assert_eq!(marked_with(&comments, token.as_str()), vec![result.comment_id]);
}

#[tokio::test]
async fn integration_binary_content_and_result_serialization() {
    let github = SimulatedGithub::new(2);
    let thread = pull_request(4);

    let result = post_ci_comment(
        &github,
        PostCommentRequest {
            thread: thread.clone(),
            content: CommentContent::Binary(vec![0x63, 0x61, 0x66, 0xe9]),
            encoding: ContentEncoding::Latin1,
            purpose: Some("i18n".to_string()),
            replace_mode: ReplaceMode::Off,
        },
    )
    .await
    .expect("ci run");

    let comments = github.comments(&thread).await;
    assert!(comments[0].body.ends_with("\ncafé"));
    assert_eq!(
        serde_json::to_value(&result).expect("serialize result"),
        json!({
            "action": "create",
            "comment_id": result.comment_id,
            "link": format!("https://github.com/acme/widgets/pull/4#issuecomment-{}", result.comment_id),
            "author": "ci-bot",
        })
    );
}
