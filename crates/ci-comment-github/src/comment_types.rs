use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `GithubUser` used across ci-comment components.
pub struct GithubUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Issue comment as returned by the GitHub REST API.
pub struct GithubIssueComment {
    pub id: u64,
    pub url: String,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: GithubUser,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A thread comment reduced to the fields reconciliation needs.
pub struct Comment {
    pub id: u64,
    pub url: String,
    pub body: String,
    pub author: String,
    pub html_url: String,
}

impl From<GithubIssueComment> for Comment {
    fn from(comment: GithubIssueComment) -> Self {
        Self {
            id: comment.id,
            url: comment.url,
            body: comment.body.unwrap_or_default(),
            author: comment.user.login,
            html_url: comment.html_url,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// One page of thread comments plus the page number to request next, if any.
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub next_page: Option<u32>,
}
