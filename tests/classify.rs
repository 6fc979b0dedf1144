use proptest::prelude::*;
use reddit_extractor::{
    classify, classify_all, is_reddit_url, json_endpoint, normalize_url, parse_reddit_url, search_endpoint, RedditTarget,
    SortBy, SourceKind, Timeframe,
};

/// Full subreddit URLs on any reddit host collapse to the canonical `https://reddit.com/r/{name}`.
#[test]
fn subreddit_urls_are_canonicalized() {
    let s = classify("https://www.reddit.com/r/python/");
    assert_eq!(s.kind, SourceKind::RedditUrl);
    assert_eq!(s.normalized, "https://reddit.com/r/python");
    assert_eq!(s.resolved_url.as_deref(), Some("https://reddit.com/r/python"));
    assert_eq!(s.estimated_yield, 100);

    // listing suffix and query string are dropped from the resolved URL
    let s = classify("http://old.reddit.com/r/rust/top?t=week#x");
    assert_eq!(s.kind, SourceKind::RedditUrl);
    assert_eq!(s.normalized, "https://reddit.com/r/rust/top");
    assert_eq!(s.resolved_url.as_deref(), Some("https://reddit.com/r/rust"));
}

/// `/u/` and `/user/` URLs both resolve to the `/user/{name}` form with the user yield.
#[test]
fn user_urls_resolve_to_user_form() {
    for url in ["https://reddit.com/u/spez", "https://www.reddit.com/user/spez/submitted"] {
        let s = classify(url);
        assert_eq!(s.kind, SourceKind::RedditUrl, "{url}");
        assert!(s.is_user());
        assert_eq!(s.resolved_url.as_deref(), Some("https://reddit.com/user/spez"));
        assert_eq!(s.estimated_yield, 50);
    }
}

/// A permalink to one comment is still a post-type source; the comment id is recorded.
#[test]
fn comment_permalink_is_a_post_source() {
    let url = "https://www.reddit.com/r/rust/comments/abc123/some_title/def456/";
    let s = classify(url);
    assert_eq!(s.kind, SourceKind::RedditUrl);
    assert_eq!(s.estimated_yield, 25);
    assert_eq!(s.resolved_url.as_deref(), Some("https://reddit.com/r/rust/comments/abc123/some_title/def456"));
    assert_eq!(
        parse_reddit_url(url),
        Some(RedditTarget::Post {
            subreddit: "rust".into(),
            post_id: "abc123".into(),
            comment_id: Some("def456".into()),
        })
    );
}

/// Shorthand forms strip their prefix and synthesize a resolved URL.
#[test]
fn shorthand_sources() {
    let r = classify("r/python");
    assert_eq!(r.kind, SourceKind::SubredditShorthand);
    assert_eq!(r.normalized, "python");
    assert_eq!(r.resolved_url.as_deref(), Some("https://reddit.com/r/python"));

    let u = classify("u/some-user");
    assert_eq!(u.kind, SourceKind::UserShorthand);
    assert_eq!(u.normalized, "some-user");
    assert_eq!(u.resolved_url.as_deref(), Some("https://reddit.com/user/some-user"));
    assert_eq!(u.estimated_yield, 50);
}

/// Pins the bare-word heuristic: one word of 3+ characters is taken as a
/// subreddit, shorter words and phrases stay search terms.
#[test]
fn bare_word_heuristic_is_pinned() {
    let rust = classify("rust");
    assert_eq!(rust.kind, SourceKind::SubredditShorthand);
    assert_eq!(rust.resolved_url.as_deref(), Some("https://reddit.com/r/rust"));

    assert_eq!(classify("ai").kind, SourceKind::SearchTerm);
    assert_eq!(classify("machine learning").kind, SourceKind::SearchTerm);
    assert_eq!(classify("c++").kind, SourceKind::SearchTerm);
}

/// Search terms keep the trimmed text, carry no URL and get the largest yield estimate.
#[test]
fn search_terms() {
    let s = classify("  machine learning  ");
    assert_eq!(s.kind, SourceKind::SearchTerm);
    assert_eq!(s.original, "  machine learning  ");
    assert_eq!(s.normalized, "machine learning");
    assert!(s.resolved_url.is_none());
    assert_eq!(s.estimated_yield, 200);

    // non-reddit hosts and unsupported reddit paths fall through to search
    assert_eq!(classify("https://example.com/r/python").kind, SourceKind::SearchTerm);
    assert_eq!(classify("https://reddit.com/r/python/wiki/index").kind, SourceKind::SearchTerm);
}

#[test]
fn classify_all_keeps_input_order() {
    let out = classify_all(["machine learning", "r/python", "u/spez"]);
    let originals: Vec<&str> = out.iter().map(|s| s.original.as_str()).collect();
    assert_eq!(originals, ["machine learning", "r/python", "u/spez"]);
}

#[test]
fn reddit_host_detection() {
    assert!(is_reddit_url("https://old.reddit.com/r/x"));
    assert!(is_reddit_url("HTTP://WWW.REDDIT.COM/r/x"));
    assert!(!is_reddit_url("https://notreddit.com/r/x"));
    assert!(!is_reddit_url("r/x"));
    assert_eq!(normalize_url("https://example.com/a/?q=1#f"), "https://example.com/a");
}

/// Whitespace mixed into trailing slashes is stripped in one pass.
#[test]
fn trailing_slash_and_space_mix() {
    for raw in ["https://reddit.com/r/python /", " https://reddit.com/r/python/ / ", "https://reddit.com/r/python / ?q=1"] {
        let once = normalize_url(raw);
        assert_eq!(once, "https://reddit.com/r/python", "{raw:?}");
        assert_eq!(normalize_url(&once), once);
    }
}

/// Each target maps to its public JSON listing. Sorts a listing does not
/// support fall back to hot, and page size is capped at 100.
#[test]
fn json_endpoints_per_target() {
    let user = RedditTarget::User { name: "spez".into() };
    assert_eq!(
        json_endpoint(&user, SortBy::Rising, Timeframe::Week, 500),
        "https://www.reddit.com/user/spez/submitted/hot.json?limit=100&raw_json=1&t=week"
    );
    assert_eq!(
        json_endpoint(&user, SortBy::Top, Timeframe::Year, 10),
        "https://www.reddit.com/user/spez/submitted/top.json?limit=10&raw_json=1&t=year"
    );

    let sub = RedditTarget::Subreddit { name: "rust".into() };
    assert_eq!(
        json_endpoint(&sub, SortBy::Relevance, Timeframe::Day, 1),
        "https://www.reddit.com/r/rust/hot.json?limit=1&raw_json=1&t=day"
    );
    assert_eq!(
        json_endpoint(&sub, SortBy::Rising, Timeframe::All, 0),
        "https://www.reddit.com/r/rust/rising.json?limit=1&raw_json=1&t=all"
    );

    // comment permalinks still fetch the whole thread
    let post = parse_reddit_url("https://reddit.com/r/rust/comments/abc/some_title/def").unwrap();
    assert_eq!(
        post,
        RedditTarget::Post { subreddit: "rust".into(), post_id: "abc".into(), comment_id: Some("def".into()) }
    );
    assert_eq!(
        json_endpoint(&post, SortBy::New, Timeframe::Hour, 500),
        "https://www.reddit.com/r/rust/comments/abc.json?raw_json=1"
    );

    assert_eq!(
        search_endpoint("rust & c++", SortBy::Relevance, Timeframe::Month, 250),
        "https://www.reddit.com/search.json?q=rust+%26+c%2B%2B&limit=100&sort=relevance&type=link&t=month&raw_json=1"
    );
}

fn reddit_url_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["http", "https", "HTTPS"]),
        prop::sample::select(vec!["", "www.", "old."]),
        prop::collection::vec("[a-z0-9_]{1,10}", 0..4),
        prop::sample::select(vec!["", "/", " /", "/ ", "// \t", " "]),
        prop::option::of("[a-z]{1,5}=[a-z0-9]{1,5}"),
        prop::option::of("[a-z]{1,8}"),
    )
        .prop_map(|(scheme, host, segments, trailing, query, fragment)| {
            let mut u = format!("{scheme}://{host}reddit.com");
            for seg in &segments {
                u.push('/');
                u.push_str(seg);
            }
            u.push_str(trailing);
            if let Some(q) = query {
                u.push('?');
                u.push_str(&q);
            }
            if let Some(f) = fragment {
                u.push('#');
                u.push_str(&f);
            }
            u
        })
}

proptest! {
    /// Normalizing an already-normalized reddit URL changes nothing.
    #[test]
    fn normalize_url_is_idempotent(u in reddit_url_strategy()) {
        let once = normalize_url(&u);
        prop_assert_eq!(normalize_url(&once), once.clone());
        prop_assert!(once.starts_with("https://reddit.com"));
        prop_assert!(!once.ends_with('/'));
        prop_assert!(!once.contains('?'));
    }

    /// Any non-blank string classifies; search terms never carry a URL.
    #[test]
    fn classification_never_fails(s in "\\PC{1,40}") {
        let src = classify(&s);
        prop_assert!(matches!(
            src.kind,
            SourceKind::RedditUrl | SourceKind::SubredditShorthand | SourceKind::UserShorthand | SourceKind::SearchTerm
        ));
        prop_assert!(src.estimated_yield > 0);
        if src.is_search() {
            prop_assert!(src.resolved_url.is_none());
            prop_assert_eq!(src.normalized, s.trim().to_string());
        } else {
            prop_assert!(src.resolved_url.is_some());
        }
    }
}
