//! Resolves the target thread and credentials from flags and CI variables.
//!
//! Resolution order for each field: explicit flag, Travis CI, GitHub Actions.
//! Environment access goes through a lookup closure so callers decide where
//! variables come from.

use std::fs;

use ci_comment_github::thread_identity::{parse_repo_slug, parse_thread_number};
use ci_comment_runtime::{CommentError, ThreadIdentity};
use serde_json::Value;

const NOT_A_PULL_REQUEST: &str = "not running against a pull request: pass --pull-request or \
    run from a pull request build (TRAVIS_PULL_REQUEST, GITHUB_REF, or GITHUB_EVENT_PATH)";

pub(crate) fn resolve_thread_identity<F>(
    explicit_repo: Option<&str>,
    explicit_pull_request: Option<u64>,
    lookup: F,
) -> Result<ThreadIdentity, CommentError>
where
    F: Fn(&str) -> Option<String>,
{
    let slug = resolve_repo_slug(explicit_repo, &lookup)?;
    let thread_number = match explicit_pull_request {
        Some(number) => number,
        None => resolve_pull_request_number(&lookup)?,
    };
    ThreadIdentity::from_slug(&slug, thread_number)
        .map_err(|error| CommentError::PreconditionFailed(error.to_string()))
}

pub(crate) fn resolve_github_token<F>(
    explicit: Option<&str>,
    lookup: F,
) -> Result<String, CommentError>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .map(ToOwned::to_owned)
        .or_else(|| lookup("GH_TOKEN"))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            CommentError::PreconditionFailed(
                "--github-token (or GITHUB_TOKEN / GH_TOKEN) is required".to_string(),
            )
        })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn resolve_repo_slug<F>(explicit: Option<&str>, lookup: &F) -> Result<String, CommentError>
where
    F: Fn(&str) -> Option<String>,
{
    let slug = non_empty(explicit.map(ToOwned::to_owned))
        .or_else(|| non_empty(lookup("TRAVIS_REPO_SLUG")))
        .or_else(|| non_empty(lookup("GITHUB_REPOSITORY")))
        .ok_or_else(|| {
            CommentError::PreconditionFailed(
                "repository could not be determined: pass --repo owner/repo or set \
                 TRAVIS_REPO_SLUG / GITHUB_REPOSITORY"
                    .to_string(),
            )
        })?;
    parse_repo_slug(&slug).map_err(|error| CommentError::PreconditionFailed(error.to_string()))?;
    Ok(slug.trim().to_string())
}

fn resolve_pull_request_number<F>(lookup: &F) -> Result<u64, CommentError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = non_empty(lookup("TRAVIS_PULL_REQUEST")) {
        // Travis sets the literal "false" on branch builds.
        if raw.trim() == "false" {
            return Err(CommentError::PreconditionFailed(NOT_A_PULL_REQUEST.to_string()));
        }
        return parse_thread_number(&raw)
            .map_err(|error| CommentError::PreconditionFailed(error.to_string()));
    }

    if let Some(number) = non_empty(lookup("GITHUB_REF"))
        .as_deref()
        .and_then(pull_request_number_from_ref)
    {
        return Ok(number);
    }

    if let Some(path) = non_empty(lookup("GITHUB_EVENT_PATH")) {
        let raw = fs::read_to_string(&path).map_err(|error| {
            CommentError::PreconditionFailed(format!(
                "failed to read GitHub event payload {path}: {error}"
            ))
        })?;
        let payload: Value = serde_json::from_str(&raw).map_err(|error| {
            CommentError::PreconditionFailed(format!(
                "failed to parse GitHub event payload {path}: {error}"
            ))
        })?;
        if let Some(number) = pull_request_number_from_event(&payload) {
            return Ok(number);
        }
    }

    Err(CommentError::PreconditionFailed(NOT_A_PULL_REQUEST.to_string()))
}

/// Parses `refs/pull/<n>/merge` and `refs/pull/<n>/head`.
fn pull_request_number_from_ref(git_ref: &str) -> Option<u64> {
    let rest = git_ref.trim().strip_prefix("refs/pull/")?;
    let (number, suffix) = rest.split_once('/')?;
    if suffix != "merge" && suffix != "head" {
        return None;
    }
    parse_thread_number(number).ok()
}

fn pull_request_number_from_event(payload: &Value) -> Option<u64> {
    ["/pull_request/number", "/issue/number", "/number"]
        .iter()
        .find_map(|pointer| payload.pointer(pointer).and_then(Value::as_u64))
        .filter(|number| *number > 0)
}
