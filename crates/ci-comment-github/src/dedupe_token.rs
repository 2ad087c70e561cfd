use std::fmt;

use sha2::{Digest, Sha256};

/// Namespace mixed into every token so markers from other tools never match ours.
///
/// Changing this value orphans every marker already posted.
pub const DEDUPE_TOKEN_NAMESPACE: &str = "ci-comment/dedupe-token";

const FIELD_SEPARATOR: [u8; 1] = [0];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Hex SHA-256 digest identifying one (repository, thread, purpose) slot.
pub struct DedupeToken(String);

impl DedupeToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DedupeToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives the dedupe token for a purpose-scoped comment slot.
///
/// Every field is followed by a NUL byte, so shifting characters across a
/// field boundary always changes the digest.
pub fn derive_token(
    namespace: &str,
    owner: &str,
    repo: &str,
    thread_number: u64,
    purpose: &str,
) -> DedupeToken {
    let thread = thread_number.to_string();
    let mut hasher = Sha256::new();
    for field in [namespace, owner, repo, thread.as_str(), purpose] {
        hasher.update(field.as_bytes());
        hasher.update(FIELD_SEPARATOR);
    }
    DedupeToken(format!("{:x}", hasher.finalize()))
}
