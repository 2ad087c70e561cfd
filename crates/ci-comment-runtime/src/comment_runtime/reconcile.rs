use std::fmt;
use std::str::FromStr;

use ci_comment_github::comment_marker::tag_comment_body;
use ci_comment_github::comment_types::Comment;
use ci_comment_github::dedupe_token::{derive_token, DEDUPE_TOKEN_NAMESPACE};
use ci_comment_github::thread_identity::ThreadIdentity;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::comment_locator::find_comment;
use crate::{CommentError, CommentPlatform, ReplaceStep};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// How an existing purpose-marked comment is brought up to date.
pub enum ReplaceMode {
    /// Edit the existing comment in place when its body differs.
    #[default]
    Off,
    /// Delete and recreate the comment when its body differs.
    IfDifferent,
    /// Delete and recreate the comment whenever one is found.
    Force,
}

impl ReplaceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "false",
            Self::IfDifferent => "true",
            Self::Force => "force",
        }
    }
}

impl fmt::Display for ReplaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplaceMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "false" | "off" | "no" | "0" => Ok(Self::Off),
            "" | "true" | "on" | "yes" | "1" => Ok(Self::IfDifferent),
            "force" => Ok(Self::Force),
            other => Err(format!(
                "invalid replace mode '{other}', expected true, false, or force"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Mutation performed by a reconciliation pass.
pub enum CommentAction {
    Create,
    Update,
    Replace,
}

impl CommentAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Replace => "replaced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Outcome of one reconciliation; `action` is `None` when nothing changed.
pub struct ReconciliationResult {
    pub action: Option<CommentAction>,
    pub comment_id: u64,
    pub link: String,
    pub author: String,
}

impl ReconciliationResult {
    fn from_comment(action: Option<CommentAction>, comment: &Comment) -> Self {
        Self {
            action,
            comment_id: comment.id,
            link: comment.html_url.clone(),
            author: comment.author.clone(),
        }
    }
}

/// An empty purpose means "no purpose"; any other string, whitespace
/// included, is an opaque dedupe key.
pub(super) fn normalize_purpose(purpose: Option<&str>) -> Option<&str> {
    purpose.filter(|value| !value.is_empty())
}

pub(super) fn ensure_replace_has_purpose(
    replace_mode: ReplaceMode,
    purpose: Option<&str>,
) -> Result<(), CommentError> {
    if replace_mode != ReplaceMode::Off && purpose.is_none() {
        return Err(CommentError::InvalidArgument(format!(
            "replace mode '{replace_mode}' requires a comment purpose to locate the previous comment"
        )));
    }
    Ok(())
}

/// Decides between create, update, replace, and no-op for one thread.
pub struct CommentReconciler<'a, P: ?Sized> {
    platform: &'a P,
    namespace: &'a str,
}

impl<'a, P> CommentReconciler<'a, P>
where
    P: CommentPlatform + ?Sized,
{
    pub fn new(platform: &'a P) -> Self {
        Self {
            platform,
            namespace: DEDUPE_TOKEN_NAMESPACE,
        }
    }

    pub fn with_namespace(mut self, namespace: &'a str) -> Self {
        self.namespace = namespace;
        self
    }

    pub async fn post_comment(
        &self,
        thread: &ThreadIdentity,
        content: &str,
        purpose: Option<&str>,
        replace_mode: ReplaceMode,
    ) -> Result<ReconciliationResult, CommentError> {
        let purpose = normalize_purpose(purpose);
        ensure_replace_has_purpose(replace_mode, purpose)?;

        let Some(purpose) = purpose else {
            debug!(%thread, "no purpose supplied; posting without dedupe marker");
            return self.create(thread, content).await;
        };

        let token = derive_token(
            self.namespace,
            &thread.owner,
            &thread.repo,
            thread.thread_number,
            purpose,
        );
        let tagged_content = tag_comment_body(token.as_str(), content);

        let Some(existing) = find_comment(self.platform, thread, token.as_str()).await? else {
            debug!(%thread, purpose, %token, "no marked comment found");
            return self.create(thread, &tagged_content).await;
        };

        let unchanged = existing.body == tagged_content;
        debug!(
            %thread,
            purpose,
            %token,
            comment_id = existing.id,
            unchanged,
            replace_mode = replace_mode.as_str(),
            "found marked comment"
        );
        match replace_mode {
            ReplaceMode::Off | ReplaceMode::IfDifferent if unchanged => {
                Ok(ReconciliationResult::from_comment(None, &existing))
            }
            ReplaceMode::Off => self.update(thread, &existing, &tagged_content).await,
            ReplaceMode::IfDifferent | ReplaceMode::Force => {
                self.replace(thread, &existing, &tagged_content).await
            }
        }
    }

    async fn create(
        &self,
        thread: &ThreadIdentity,
        body: &str,
    ) -> Result<ReconciliationResult, CommentError> {
        let created = self.platform.create_comment(thread, body).await?;
        info!(%thread, comment_id = created.id, "created comment");
        Ok(ReconciliationResult::from_comment(
            Some(CommentAction::Create),
            &created,
        ))
    }

    async fn update(
        &self,
        thread: &ThreadIdentity,
        existing: &Comment,
        body: &str,
    ) -> Result<ReconciliationResult, CommentError> {
        let updated = self
            .platform
            .update_comment(thread, existing.id, body)
            .await?;
        info!(%thread, comment_id = updated.id, "updated comment in place");
        Ok(ReconciliationResult::from_comment(
            Some(CommentAction::Update),
            &updated,
        ))
    }

    /// Deletes the old comment and creates the new one concurrently.
    ///
    /// The platform has no atomic replace, so both outcomes are inspected.
    async fn replace(
        &self,
        thread: &ThreadIdentity,
        existing: &Comment,
        body: &str,
    ) -> Result<ReconciliationResult, CommentError> {
        let (deleted, created) = tokio::join!(
            self.platform.delete_comment(thread, existing.id),
            self.platform.create_comment(thread, body),
        );
        match (deleted, created) {
            (Ok(()), Ok(created)) => {
                info!(
                    %thread,
                    old_comment_id = existing.id,
                    comment_id = created.id,
                    "replaced comment"
                );
                Ok(ReconciliationResult::from_comment(
                    Some(CommentAction::Replace),
                    &created,
                ))
            }
            (Err(delete_error), Ok(created)) => {
                warn!(
                    %thread,
                    old_comment_id = existing.id,
                    comment_id = created.id,
                    error = %delete_error,
                    "created replacement comment but failed to delete the old one"
                );
                Err(CommentError::PartialReplace {
                    old_comment_id: existing.id,
                    failed_step: ReplaceStep::Delete,
                    created: Some(Box::new(created)),
                    source: delete_error,
                })
            }
            (Ok(()), Err(create_error)) => {
                warn!(
                    %thread,
                    old_comment_id = existing.id,
                    error = %create_error,
                    "deleted old comment but failed to create its replacement"
                );
                Err(CommentError::PartialReplace {
                    old_comment_id: existing.id,
                    failed_step: ReplaceStep::Create,
                    created: None,
                    source: create_error,
                })
            }
            (Err(delete_error), Err(create_error)) => {
                warn!(
                    %thread,
                    old_comment_id = existing.id,
                    error = %delete_error,
                    "failed to delete old comment"
                );
                Err(CommentError::Platform(create_error))
            }
        }
    }
}
