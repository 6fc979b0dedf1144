//! Reddit URL helpers: canonical normalization, path parsing into targets,
//! and the public `.json` endpoints the fetch layer calls.

use crate::params::{SortBy, Timeframe};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub const CANONICAL_BASE: &str = "https://reddit.com";
const API_BASE: &str = "https://www.reddit.com";

/// Listing endpoints refuse larger pages.
const MAX_PAGE: u32 = 100;

/// What a Reddit URL (or shorthand) points at.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RedditTarget {
    Subreddit { name: String },
    User { name: String },
    /// `comment_id` is set when the URL addresses a single comment in the thread.
    Post { subreddit: String, post_id: String, comment_id: Option<String> },
}

impl RedditTarget {
    /// Canonical URL for the target (`https://reddit.com/...`). Posts drop slug and comment.
    pub fn canonical_url(&self) -> String {
        match self {
            RedditTarget::Subreddit { name } => format!("{CANONICAL_BASE}/r/{name}"),
            RedditTarget::User { name } => format!("{CANONICAL_BASE}/user/{name}"),
            RedditTarget::Post { subreddit, post_id, .. } => {
                format!("{CANONICAL_BASE}/r/{subreddit}/comments/{post_id}")
            }
        }
    }
}

fn host_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^https?://(?:www\.|old\.)?reddit\.com(/|$)").unwrap())
}

fn subreddit_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^r/(\w+)(?:/(?:hot|new|top|rising))?$").unwrap())
}

fn user_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:user|u)/([\w-]+)(?:/(?:submitted|comments|overview))?$").unwrap())
}

fn post_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // r/{sub}/comments/{id}[/{slug}[/{comment}]][/...]
    RE.get_or_init(|| Regex::new(r"^r/(\w+)/comments/(\w+)(?:/([^/]+)(?:/(\w+))?)?(?:/.*)?$").unwrap())
}

/// Canonicalize a URL: strip fragment, query string and trailing slashes; for
/// Reddit hosts also fold `old.`/`www.` and `http` into `https://reddit.com`.
/// Applying it twice gives the same result as applying it once.
pub fn normalize_url(url: &str) -> String {
    let mut s = url.trim_start();
    if let Some(i) = s.find('#') { s = &s[..i]; }
    if let Some(i) = s.find('?') { s = &s[..i]; }
    // slashes and whitespace may interleave at the end ("r/x /")
    let s = s.trim_end_matches(|c: char| c == '/' || c.is_whitespace());
    host_re().replace(s, format!("{CANONICAL_BASE}$1").as_str()).into_owned()
}

/// True if the string is an http(s) URL on a reddit.com host.
pub fn is_reddit_url(url: &str) -> bool {
    host_re().is_match(url.trim())
}

/// Parse a full Reddit URL into the thing it addresses.
/// Returns `None` for non-Reddit URLs and for Reddit paths we don't fetch.
pub fn parse_reddit_url(url: &str) -> Option<RedditTarget> {
    let normalized = normalize_url(url);
    let path = normalized.strip_prefix(CANONICAL_BASE)?.trim_start_matches('/');

    if let Some(caps) = subreddit_path_re().captures(path) {
        return Some(RedditTarget::Subreddit { name: caps[1].to_string() });
    }
    if let Some(caps) = user_path_re().captures(path) {
        return Some(RedditTarget::User { name: caps[1].to_string() });
    }
    if let Some(caps) = post_path_re().captures(path) {
        return Some(RedditTarget::Post {
            subreddit: caps[1].to_string(),
            post_id: caps[2].to_string(),
            comment_id: caps.get(4).map(|m| m.as_str().to_string()),
        });
    }
    None
}

fn with_query(base: String, pairs: &[(&str, String)]) -> String {
    match Url::parse_with_params(&base, pairs) {
        Ok(u) => u.into(),
        Err(e) => {
            tracing::warn!("could not attach query to {}: {}", base, e);
            base
        }
    }
}

/// Public JSON endpoint for a subreddit, user or post target.
pub fn json_endpoint(target: &RedditTarget, sort: SortBy, timeframe: Timeframe, limit: u32) -> String {
    let listing = |base: String| {
        with_query(base, &[
            ("limit", limit.clamp(1, MAX_PAGE).to_string()),
            ("raw_json", "1".to_string()),
            ("t", timeframe.as_str().to_string()),
        ])
    };
    match target {
        RedditTarget::Subreddit { name } => {
            let sort = match sort {
                SortBy::Hot | SortBy::New | SortBy::Top | SortBy::Rising => sort,
                SortBy::Relevance => SortBy::Hot,
            };
            listing(format!("{API_BASE}/r/{name}/{}.json", sort.as_str()))
        }
        RedditTarget::User { name } => {
            let sort = match sort {
                SortBy::Hot | SortBy::New | SortBy::Top => sort,
                SortBy::Rising | SortBy::Relevance => SortBy::Hot,
            };
            listing(format!("{API_BASE}/user/{name}/submitted/{}.json", sort.as_str()))
        }
        RedditTarget::Post { subreddit, post_id, .. } => {
            with_query(format!("{API_BASE}/r/{subreddit}/comments/{post_id}.json"), &[("raw_json", "1".to_string())])
        }
    }
}

/// Site-wide search endpoint for a free-text query.
pub fn search_endpoint(query: &str, sort: SortBy, timeframe: Timeframe, limit: u32) -> String {
    with_query(format!("{API_BASE}/search.json"), &[
        ("q", query.to_string()),
        ("limit", limit.clamp(1, MAX_PAGE).to_string()),
        ("sort", sort.as_str().to_string()),
        ("type", "link".to_string()),
        ("t", timeframe.as_str().to_string()),
        ("raw_json", "1".to_string()),
    ])
}
