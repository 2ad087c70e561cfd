//! Shared helpers for posting deduplicated CI comments to GitHub threads.
//! This crate provides the dedupe token and marker codec, GitHub comment wire
//! types, content materialization, and transport helpers consumed by the
//! runtime and CLI crates.

pub mod comment_marker;
pub mod comment_types;
pub mod content_materializer;
pub mod dedupe_token;
pub mod github_transport_helpers;
pub mod thread_identity;
