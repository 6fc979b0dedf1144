#![allow(dead_code)]

use anyhow::{anyhow, Result};
use reddit_extractor::{ExtractionResults, FetchTask, Fetcher, IssueCode, ValidationIssue};
use serde_json::{json, Value};

/// Nested-schema request with the given sources and total budget; everything else default.
pub fn nested_request(sources: &[&str], total_items: u32) -> Value {
    json!({
        "input": { "sources": sources },
        "content": { "include": ["posts"], "limits": { "totalItems": total_items } },
        "output": { "format": "json", "delivery": { "mode": "sync" } },
    })
}

/// A post record shaped like what the fetch layer returns.
pub fn post(id: &str, subreddit: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Post {id}"),
        "url": format!("https://reddit.com/r/{subreddit}/comments/{id}"),
        "author": "alice",
        "subreddit": subreddit,
        "score": 42,
        "num_comments": 3,
        "created_utc": 1136073600,
        "permalink": format!("/r/{subreddit}/comments/{id}"),
        "selftext": "",
        "domain": format!("self.{subreddit}"),
        "over_18": false,
        "pinned": false,
    })
}

pub fn comment(id: &str, subreddit: &str) -> Value {
    json!({
        "id": id,
        "body": format!("Comment {id}"),
        "author": "bob",
        "subreddit": subreddit,
        "score": 7,
        "created_utc": 1136073700,
        "permalink": format!("/r/{subreddit}/comments/p/{id}"),
        "parent_id": "t3_p",
        "post_title": "Parent post",
    })
}

/// Codes of the hard errors in an issue list, in order.
pub fn error_codes(issues: &[ValidationIssue]) -> Vec<IssueCode> {
    issues.iter().filter(|i| i.is_error()).map(|i| i.code()).collect()
}

/// Codes of the warnings in an issue list, in order.
pub fn warning_codes(issues: &[ValidationIssue]) -> Vec<IssueCode> {
    issues.iter().filter(|i| !i.is_error()).map(|i| i.code()).collect()
}

/// Offline fetcher: returns `allocation + extra` posts (tagged with the source
/// they came from) and two comments per task. Sources listed in `fail_on` error out.
pub struct StubFetcher {
    pub extra: usize,
    pub fail_on: Vec<String>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self { extra: 5, fail_on: Vec::new() }
    }

    pub fn failing(mut self, original: &str) -> Self {
        self.fail_on.push(original.to_string());
        self
    }
}

impl Fetcher for StubFetcher {
    fn fetch(&self, task: &FetchTask) -> Result<ExtractionResults> {
        if self.fail_on.contains(&task.source.original) {
            return Err(anyhow!("HTTP 503 from {}", task.endpoint));
        }
        let n = task.allocation as usize + self.extra;
        let mut out = ExtractionResults::new();
        for i in 0..n {
            let mut p = post(&format!("{}-{i}", task.source.normalized.replace(' ', "_")), "stub");
            p["source"] = json!(task.source.original);
            out.posts.push(p);
        }
        out.comments.push(comment("c1", "stub"));
        out.comments.push(comment("c2", "stub"));
        Ok(out)
    }
}
