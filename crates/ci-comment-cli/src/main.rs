mod bootstrap_helpers;
mod ci_environment;
mod cli_args;

use anyhow::{bail, Context, Result};
use ci_comment_runtime::{
    post_ci_comment, render_reconciliation_summary, CommentContent, GithubCommentClient,
    GithubCommentClientConfig, PostCommentRequest, ReconciliationResult,
};
use clap::Parser;
use tracing::debug;

use crate::bootstrap_helpers::init_tracing;
use crate::ci_environment::{resolve_github_token, resolve_thread_identity};
use crate::cli_args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let json_output = cli.json;
    let result = run(cli).await.context("error posting comment")?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_reconciliation_summary(&result));
    }
    Ok(())
}

fn resolve_purpose(cli: &Cli) -> Result<Option<String>> {
    if cli.no_purpose {
        return Ok(None);
    }
    match cli.purpose.as_deref() {
        // An explicitly empty purpose posts without a marker.
        Some("") => Ok(None),
        Some(purpose) => Ok(Some(purpose.to_string())),
        None => bail!(
            "a comment purpose is required: pass --purpose <name> to edit the same comment on \
             every run, or --no-purpose to post a new comment each time"
        ),
    }
}

async fn run(cli: Cli) -> Result<ReconciliationResult> {
    let purpose = resolve_purpose(&cli)?;
    let lookup = |key: &str| std::env::var(key).ok();
    let thread = resolve_thread_identity(cli.repo.as_deref(), cli.pull_request, lookup)?;
    let token = resolve_github_token(cli.github_token.as_deref(), lookup)?;
    debug!(%thread, purpose = purpose.as_deref(), replace = %cli.replace, "resolved comment target");

    let client = GithubCommentClient::new(GithubCommentClientConfig {
        api_base: cli.github_api_base,
        token,
        request_timeout_ms: cli.request_timeout_ms,
        retry_max_attempts: cli.retry_max_attempts,
        retry_base_delay_ms: cli.retry_base_delay_ms,
    })?;

    let request = PostCommentRequest {
        thread,
        content: CommentContent::Stream(Box::new(tokio::io::stdin())),
        encoding: cli.encoding,
        purpose,
        replace_mode: cli.replace,
    };
    Ok(post_ci_comment(&client, request).await?)
}
