//! Fuzz target: gateway request shaping.
//!
//! Arbitrary `path` values and bodies must produce a request without
//! panicking, and GET never carries a body.
#![no_main]

use axum::http::{HeaderMap, Method};
use libfuzzer_sys::fuzz_target;
use libris_gateway::ForwardedRequest;

fuzz_target!(|data: &[u8]| {
    let split = data.first().map_or(0, |b| usize::from(*b)).min(data.len());
    let (path, body) = data.split_at(split);
    let target = String::from_utf8_lossy(path).into_owned();

    let get = ForwardedRequest::from_parts(Method::GET, Some(target.clone()), &HeaderMap::new(), body);
    assert!(get.body.is_none());

    let post = ForwardedRequest::from_parts(Method::POST, Some(target), &HeaderMap::new(), body);
    assert_eq!(post.body.is_some(), !body.is_empty());
    let _ = post.upstream_url("https://backend.invalid");
});
