use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enumerates supported `ThreadIdentityError` values.
pub enum ThreadIdentityError {
    #[error("invalid repository slug '{0}', expected owner/repo")]
    InvalidSlug(String),
    #[error("invalid pull request number '{0}', expected a positive integer")]
    InvalidThreadNumber(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A discussion thread (pull request or issue) on one repository.
pub struct ThreadIdentity {
    pub owner: String,
    pub repo: String,
    pub thread_number: u64,
}

impl ThreadIdentity {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        thread_number: u64,
    ) -> Result<Self, ThreadIdentityError> {
        let owner = owner.into();
        let repo = repo.into();
        let slug = format!("{owner}/{repo}");
        Self::from_slug(&slug, thread_number)
    }

    pub fn from_slug(slug: &str, thread_number: u64) -> Result<Self, ThreadIdentityError> {
        let (owner, repo) = parse_repo_slug(slug)?;
        if thread_number == 0 {
            return Err(ThreadIdentityError::InvalidThreadNumber(
                thread_number.to_string(),
            ));
        }
        Ok(Self {
            owner,
            repo,
            thread_number,
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for ThreadIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.thread_number)
    }
}

pub fn parse_repo_slug(raw: &str) -> Result<(String, String), ThreadIdentityError> {
    let trimmed = raw.trim();
    let (owner, repo) = trimmed
        .split_once('/')
        .ok_or_else(|| ThreadIdentityError::InvalidSlug(raw.to_string()))?;
    let owner = owner.trim();
    let repo = repo.trim();
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(ThreadIdentityError::InvalidSlug(raw.to_string()));
    }
    Ok((owner.to_string(), repo.to_string()))
}

pub fn parse_thread_number(raw: &str) -> Result<u64, ThreadIdentityError> {
    match raw.trim().parse::<u64>() {
        Ok(number) if number > 0 => Ok(number),
        _ => Err(ThreadIdentityError::InvalidThreadNumber(raw.to_string())),
    }
}
