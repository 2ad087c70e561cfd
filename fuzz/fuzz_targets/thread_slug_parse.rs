#![no_main]

use ci_comment_github::thread_identity::{parse_repo_slug, parse_thread_number, ThreadIdentity};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    if let Ok((owner, repo)) = parse_repo_slug(&raw) {
        assert!(!owner.is_empty());
        assert!(!repo.is_empty());
        let identity = ThreadIdentity::new(owner, repo, 1).expect("parsed slug round-trips");
        let reparsed = parse_repo_slug(&identity.as_slug()).expect("slug reparses");
        assert_eq!(reparsed, (identity.owner, identity.repo));
    }
    if let Ok(number) = parse_thread_number(&raw) {
        assert!(number > 0);
    }
});
