//! Source classification: one caller-supplied string becomes a typed, normalized
//! source with an a-priori yield estimate. Classification never fails; anything
//! unrecognized is a search term.

use crate::reddit_url::{is_reddit_url, normalize_url, parse_reddit_url, RedditTarget};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// How the caller expressed the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    RedditUrl,
    SubredditShorthand,
    UserShorthand,
    SearchTerm,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::RedditUrl => "reddit_url",
            SourceKind::SubredditShorthand => "subreddit_shorthand",
            SourceKind::UserShorthand => "user_shorthand",
            SourceKind::SearchTerm => "search_term",
        }
    }

    /// Seconds per fetched item, used for duration estimates.
    pub fn time_cost(self) -> f64 {
        match self {
            SourceKind::RedditUrl | SourceKind::SubredditShorthand => 0.1,
            SourceKind::UserShorthand => 0.15,
            SourceKind::SearchTerm => 0.2,
        }
    }
}

pub const SUBREDDIT_YIELD: u32 = 100;
pub const USER_YIELD: u32 = 50;
pub const POST_YIELD: u32 = 25;
pub const SEARCH_YIELD: u32 = 200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Source {
    pub original: String,
    pub kind: SourceKind,
    /// Set for every kind except search terms.
    #[serde(skip)]
    pub target: Option<RedditTarget>,
    pub normalized: String,
    pub resolved_url: Option<String>,
    pub estimated_yield: u32,
}

impl Source {
    pub fn is_search(&self) -> bool {
        self.kind == SourceKind::SearchTerm
    }

    pub fn is_user(&self) -> bool {
        matches!(self.target, Some(RedditTarget::User { .. }))
    }

    /// Cheapest-first fetch priority among url-like sources: post < user < subreddit.
    /// Search terms sort after everything.
    pub fn fetch_priority(&self) -> u8 {
        match self.target {
            Some(RedditTarget::Post { .. }) => 1,
            Some(RedditTarget::User { .. }) => 2,
            Some(RedditTarget::Subreddit { .. }) => 3,
            None => 4,
        }
    }

    fn from_target(original: &str, kind: SourceKind, normalized: String, target: RedditTarget) -> Self {
        let resolved_url = match target {
            // keep slug and comment segment of the address the caller gave
            RedditTarget::Post { .. } if kind == SourceKind::RedditUrl => normalized.clone(),
            _ => target.canonical_url(),
        };
        let estimated_yield = match target {
            RedditTarget::Subreddit { .. } => SUBREDDIT_YIELD,
            RedditTarget::User { .. } => USER_YIELD,
            RedditTarget::Post { .. } => POST_YIELD,
        };
        Self {
            original: original.to_string(),
            kind,
            resolved_url: Some(resolved_url),
            target: Some(target),
            normalized,
            estimated_yield,
        }
    }
}

fn subreddit_shorthand_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^r/(\w+)$").unwrap())
}

fn user_shorthand_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^u/([\w-]+)$").unwrap())
}

fn bare_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\w+$").unwrap())
}

/// Classify one raw input string. First match wins:
/// reddit URL (subreddit, user, post) → `r/name` → `u/name` → bare word of
/// 3+ characters (taken as a subreddit) → search term.
pub fn classify(raw: &str) -> Source {
    let s = raw.trim();

    if is_reddit_url(s) {
        if let Some(target) = parse_reddit_url(s) {
            let normalized = normalize_url(s);
            return Source::from_target(raw, SourceKind::RedditUrl, normalized, target);
        }
    }

    if let Some(caps) = subreddit_shorthand_re().captures(s) {
        let name = caps[1].to_string();
        return Source::from_target(raw, SourceKind::SubredditShorthand, name.clone(), RedditTarget::Subreddit { name });
    }

    if let Some(caps) = user_shorthand_re().captures(s) {
        let name = caps[1].to_string();
        return Source::from_target(raw, SourceKind::UserShorthand, name.clone(), RedditTarget::User { name });
    }

    // Heuristic: any single word is probably a subreddit.
    if bare_word_re().is_match(s) && s.chars().count() > 2 {
        let name = s.to_string();
        return Source::from_target(raw, SourceKind::SubredditShorthand, name.clone(), RedditTarget::Subreddit { name });
    }

    Source {
        original: raw.to_string(),
        kind: SourceKind::SearchTerm,
        target: None,
        normalized: s.to_string(),
        resolved_url: None,
        estimated_yield: SEARCH_YIELD,
    }
}

/// Classify every source, preserving input order.
pub fn classify_all<I, S>(raw: I) -> Vec<Source>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter().map(|s| classify(s.as_ref())).collect()
}
