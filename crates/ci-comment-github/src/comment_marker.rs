//! Invisible dedupe marker carried on the first line of purpose-scoped comments.
//!
//! GitHub renders HTML comments as nothing, so the marker line survives in the
//! stored body without showing up in the rendered thread.

pub const DEDUPE_MARKER_PREFIX: &str = "<!-- ci-comment :: ";
pub const DEDUPE_MARKER_SUFFIX: &str = " -->";
const HTML_COMMENT_CLOSE: &str = "-->";

pub fn encode_marker(token: &str) -> String {
    format!("{DEDUPE_MARKER_PREFIX}{token}{DEDUPE_MARKER_SUFFIX}")
}

/// Prefixes `content` with the marker line for `token`.
pub fn tag_comment_body(token: &str, content: &str) -> String {
    format!("{}\n{content}", encode_marker(token))
}

/// Returns the token of the first line that starts with a dedupe marker.
///
/// Marker text that does not begin a line is payload and never matches.
pub fn decode_marker(body: &str) -> Option<&str> {
    body.lines().find_map(decode_marker_line)
}

fn decode_marker_line(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(DEDUPE_MARKER_PREFIX)?;
    let end = rest.find(DEDUPE_MARKER_SUFFIX)?;
    let token = &rest[..end];
    if token.is_empty() || token.contains(HTML_COMMENT_CLOSE) {
        return None;
    }
    Some(token)
}
