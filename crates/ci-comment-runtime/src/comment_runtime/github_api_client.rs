use std::time::Duration;

use async_trait::async_trait;
use ci_comment_github::comment_types::{Comment, CommentPage, GithubIssueComment};
use ci_comment_github::github_transport_helpers::{
    is_retryable_github_status, is_retryable_transport_error, parse_next_page, parse_retry_after,
    retry_delay, truncate_for_error,
};
use ci_comment_github::thread_identity::ThreadIdentity;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use serde_json::json;
use tracing::debug;

use crate::{CommentPlatform, PlatformError};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const COMMENTS_PER_PAGE: usize = 100;
const ERROR_BODY_MAX_CHARS: usize = 800;

#[derive(Debug, Clone)]
/// Connection settings for `GithubCommentClient`.
pub struct GithubCommentClientConfig {
    pub api_base: String,
    pub token: String,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
}

impl GithubCommentClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            token: token.into(),
            request_timeout_ms: 30_000,
            retry_max_attempts: 1,
            retry_base_delay_ms: 500,
        }
    }
}

#[derive(Clone)]
/// GitHub REST implementation of `CommentPlatform` for issue and pull request threads.
pub struct GithubCommentClient {
    http: reqwest::Client,
    api_base: String,
    retry_max_attempts: usize,
    retry_base_delay_ms: u64,
}

impl GithubCommentClient {
    pub fn new(config: GithubCommentClientConfig) -> Result<Self, PlatformError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("ci-comment"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        let token = config.token.trim();
        if token.is_empty() {
            return Err(PlatformError::InvalidConfig(
                "github token must not be empty".to_string(),
            ));
        }
        let mut auth_header = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            PlatformError::InvalidConfig("invalid github authorization header".to_string())
        })?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .map_err(|error| {
                PlatformError::InvalidConfig(format!("failed to create github api client: {error}"))
            })?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            retry_max_attempts: config.retry_max_attempts.max(1),
            retry_base_delay_ms: config.retry_base_delay_ms.max(1),
        })
    }

    fn thread_comments_url(&self, thread: &ThreadIdentity) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_base, thread.owner, thread.repo, thread.thread_number
        )
    }

    fn comment_url(&self, thread: &ThreadIdentity, comment_id: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/comments/{}",
            self.api_base, thread.owner, thread.repo, comment_id
        )
    }

    async fn decode_comment(
        operation: &str,
        response: reqwest::Response,
    ) -> Result<Comment, PlatformError> {
        let parsed = response
            .json::<GithubIssueComment>()
            .await
            .map_err(|source| PlatformError::Decode {
                operation: operation.to_string(),
                source,
            })?;
        Ok(Comment::from(parsed))
    }

    /// Sends a request, retrying rate limits, server errors, and transport
    /// failures up to the configured attempt budget.
    ///
    /// A non-idempotent request is only retried when the server cannot have
    /// acted on it: a 429 rejection or a failed connect.
    async fn send_with_retry<F>(
        &self,
        operation: &str,
        idempotent: bool,
        mut request_builder: F,
    ) -> Result<reqwest::Response, PlatformError>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            match request_builder().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let retry_after = parse_retry_after(response.headers());
                    let body = response.text().await.unwrap_or_default();
                    let retryable = if idempotent {
                        is_retryable_github_status(status.as_u16())
                    } else {
                        status.as_u16() == 429
                    };
                    if attempt < self.retry_max_attempts && retryable {
                        debug!(operation, attempt, status = status.as_u16(), "retrying github api call");
                        tokio::time::sleep(retry_delay(
                            self.retry_base_delay_ms,
                            attempt,
                            retry_after,
                        ))
                        .await;
                        continue;
                    }

                    return Err(PlatformError::Status {
                        operation: operation.to_string(),
                        status: status.as_u16(),
                        body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
                    });
                }
                Err(error) => {
                    let retryable = if idempotent {
                        is_retryable_transport_error(&error)
                    } else {
                        error.is_connect()
                    };
                    if attempt < self.retry_max_attempts && retryable {
                        debug!(operation, attempt, %error, "retrying github api call");
                        tokio::time::sleep(retry_delay(self.retry_base_delay_ms, attempt, None))
                            .await;
                        continue;
                    }
                    return Err(PlatformError::Transport {
                        operation: operation.to_string(),
                        source: error,
                    });
                }
            }
        }
    }
}

#[async_trait]
impl CommentPlatform for GithubCommentClient {
    async fn create_comment(
        &self,
        thread: &ThreadIdentity,
        body: &str,
    ) -> Result<Comment, PlatformError> {
        let operation = "create issue comment";
        let payload = json!({ "body": body });
        let url = self.thread_comments_url(thread);
        let response = self
            .send_with_retry(operation, false, || self.http.post(&url).json(&payload))
            .await?;
        Self::decode_comment(operation, response).await
    }

    async fn update_comment(
        &self,
        thread: &ThreadIdentity,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment, PlatformError> {
        let operation = "update issue comment";
        let payload = json!({ "body": body });
        let url = self.comment_url(thread, comment_id);
        let response = self
            .send_with_retry(operation, true, || self.http.patch(&url).json(&payload))
            .await?;
        Self::decode_comment(operation, response).await
    }

    async fn delete_comment(
        &self,
        thread: &ThreadIdentity,
        comment_id: u64,
    ) -> Result<(), PlatformError> {
        let url = self.comment_url(thread, comment_id);
        self.send_with_retry("delete issue comment", true, || self.http.delete(&url))
            .await?;
        Ok(())
    }

    async fn list_comments(
        &self,
        thread: &ThreadIdentity,
        page: u32,
    ) -> Result<CommentPage, PlatformError> {
        let operation = "list issue comments";
        let url = self.thread_comments_url(thread);
        let per_page = COMMENTS_PER_PAGE.to_string();
        let page_value = page.to_string();
        let response = self
            .send_with_retry(operation, true, || {
                self.http.get(&url).query(&[
                    ("per_page", per_page.as_str()),
                    ("page", page_value.as_str()),
                ])
            })
            .await?;
        let has_link_header = response.headers().contains_key(LINK);
        let link_next_page = parse_next_page(response.headers());
        let rows = response
            .json::<Vec<GithubIssueComment>>()
            .await
            .map_err(|source| PlatformError::Decode {
                operation: operation.to_string(),
                source,
            })?;
        // Without a Link header only a full page can be followed by another.
        let next_page = if has_link_header {
            link_next_page
        } else if rows.len() >= COMMENTS_PER_PAGE {
            Some(page.saturating_add(1))
        } else {
            None
        };
        Ok(CommentPage {
            comments: rows.into_iter().map(Comment::from).collect(),
            next_page,
        })
    }
}
