use ci_comment_runtime::{ContentEncoding, ReplaceMode, GITHUB_API_BASE};
use clap::{ArgAction, Parser};

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_replace_mode(value: &str) -> Result<ReplaceMode, String> {
    value.parse::<ReplaceMode>()
}

fn parse_content_encoding(value: &str) -> Result<ContentEncoding, String> {
    value
        .parse::<ContentEncoding>()
        .map_err(|error| error.to_string())
}

#[derive(Debug, Parser)]
#[command(
    name = "post-ci-comment",
    about = "Post a status comment to the current pull request from CI, editing the previous one for the same purpose instead of piling up duplicates",
    version,
    after_help = "Pipe data into the command to set the comment's content."
)]
pub(crate) struct Cli {
    #[arg(
        short = 'p',
        long = "purpose",
        env = "CI_COMMENT_PURPOSE",
        help = "Comment purpose to key on; later runs with the same purpose edit the same comment"
    )]
    pub(crate) purpose: Option<String>,

    #[arg(
        long = "no-purpose",
        default_value_t = false,
        help = "Post a fresh comment on every run without deduplication (overrides --purpose)"
    )]
    pub(crate) no_purpose: bool,

    #[arg(
        long = "replace",
        env = "CI_COMMENT_REPLACE",
        default_value = "false",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_replace_mode,
        help = "Delete and recreate the previous comment instead of editing it: --replace recreates only when content changed, --replace=force always recreates"
    )]
    pub(crate) replace: ReplaceMode,

    #[arg(
        long = "repo",
        env = "CI_COMMENT_REPO",
        help = "GitHub repository in owner/repo format (defaults to the CI environment)"
    )]
    pub(crate) repo: Option<String>,

    #[arg(
        long = "pull-request",
        env = "CI_COMMENT_PULL_REQUEST",
        value_parser = parse_positive_u64,
        help = "Pull request number to comment on (defaults to the CI environment)"
    )]
    pub(crate) pull_request: Option<u64>,

    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub token used for API access"
    )]
    pub(crate) github_token: Option<String>,

    #[arg(
        long = "github-api-base",
        env = "CI_COMMENT_GITHUB_API_BASE",
        default_value = GITHUB_API_BASE,
        help = "GitHub API base URL"
    )]
    pub(crate) github_api_base: String,

    #[arg(
        long = "encoding",
        env = "CI_COMMENT_ENCODING",
        default_value = "utf8",
        value_parser = parse_content_encoding,
        help = "Character encoding of stdin content (utf8, utf16le, latin1, ascii, base64, hex)"
    )]
    pub(crate) encoding: ContentEncoding,

    #[arg(
        long = "request-timeout-ms",
        env = "CI_COMMENT_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Timeout for each GitHub API request in milliseconds"
    )]
    pub(crate) request_timeout_ms: u64,

    #[arg(
        long = "retry-max-attempts",
        env = "CI_COMMENT_RETRY_MAX_ATTEMPTS",
        default_value_t = 1,
        value_parser = parse_positive_usize,
        help = "Maximum attempts for retryable github api failures (429/5xx/transport)"
    )]
    pub(crate) retry_max_attempts: usize,

    #[arg(
        long = "retry-base-delay-ms",
        env = "CI_COMMENT_RETRY_BASE_DELAY_MS",
        default_value_t = 500,
        help = "Base backoff delay in milliseconds for github api retries"
    )]
    pub(crate) retry_base_delay_ms: u64,

    #[arg(
        long = "json",
        default_value_t = false,
        action = ArgAction::SetTrue,
        help = "Print the reconciliation result as JSON instead of a summary line"
    )]
    pub(crate) json: bool,
}
