#![no_main]

use ci_comment_github::comment_marker::{decode_marker, tag_comment_body};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let body = String::from_utf8_lossy(data);
    if let Some(token) = decode_marker(&body) {
        assert!(!token.is_empty());
        assert!(!token.contains("-->"));
        let retagged = tag_comment_body(token, &body);
        assert_eq!(decode_marker(&retagged), Some(token));
    }
});
