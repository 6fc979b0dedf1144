use proptest::prelude::*;
use reddit_extractor::{classify_all, plan, PlanLimits, Source, FIXED_OVERHEAD_SECS};

/// The canonical mixed request: one subreddit shorthand and one search phrase
/// sharing 100 items. Yields are 100 and 200, so the split is 33 / 66 and the
/// subreddit is fetched first.
#[test]
fn mixed_request_end_to_end() {
    let sources = classify_all(["r/python", "machine learning"]);
    let s = plan(&sources, PlanLimits::new(100));

    assert!(s.is_mixed);
    assert_eq!(s.order, ["r/python", "machine learning"]);
    assert_eq!(s.allocated("r/python"), 33);
    assert_eq!(s.allocated("machine learning"), 66);
    assert!(s.total_allocated() <= 100);
    assert_eq!((s.url_sources, s.search_sources), (1, 1));

    // 33 * 0.1 + 66 * 0.2 + 2.0
    assert!((s.estimated_duration_seconds - 18.5).abs() < 1e-9);
}

/// With itemsPerSource every source gets min(itemsPerSource, total / count).
#[test]
fn items_per_source_caps_equally() {
    let sources = classify_all(["r/a", "u/b", "deep learning"]);

    let s = plan(&sources, PlanLimits::new(100).with_items_per_source(50));
    assert!(s.allocation.values().all(|&v| v == 33));

    let s = plan(&sources, PlanLimits::new(100).with_items_per_source(10));
    assert!(s.allocation.values().all(|&v| v == 10));
    assert_eq!(s.total_allocated(), 30);
}

/// Posts before users before subreddits, then search terms in input order.
#[test]
fn order_is_cheapest_first_then_search() {
    let sources = classify_all([
        "machine learning",
        "r/python",
        "u/spez",
        "https://reddit.com/r/rust/comments/abc/title",
        "deep learning",
    ]);
    let s = plan(&sources, PlanLimits::new(500));
    assert_eq!(
        s.order,
        ["https://reddit.com/r/rust/comments/abc/title", "u/spez", "r/python", "machine learning", "deep learning"]
    );
}

/// A single kind of source is not mixed mode.
#[test]
fn uniform_requests_are_not_mixed() {
    assert!(!plan(&classify_all(["r/a", "r/b"]), PlanLimits::new(10)).is_mixed);
    assert!(!plan(&classify_all(["a b", "c d"]), PlanLimits::new(10)).is_mixed);
}

/// Degenerate input gives a degenerate but well-formed strategy.
#[test]
fn degenerate_inputs() {
    let empty = plan(&[], PlanLimits::new(100));
    assert!(empty.allocation.is_empty());
    assert!(empty.order.is_empty());
    assert!(!empty.is_mixed);

    let sources = classify_all(["r/python", "machine learning"]);
    let zero = plan(&sources, PlanLimits::new(0));
    assert!(zero.allocation.values().all(|&v| v == 0));
    assert_eq!(zero.order.len(), 2);
    assert_eq!(zero.estimated_duration_seconds, FIXED_OVERHEAD_SECS);
}

/// Pins the single-pass rescale: five equal sources sharing three items all
/// keep their floor of one, so the plan overshoots the budget. Downstream
/// trimming caps the merged results instead.
#[test]
fn single_rescale_pass_can_overshoot() {
    let sources = classify_all(["r/a", "r/b", "r/c", "r/d", "r/e"]);
    let s = plan(&sources, PlanLimits::new(3));
    assert!(s.allocation.values().all(|&v| v == 1));
    assert_eq!(s.total_allocated(), 5);
}

/// One rescale pass does bring moderate overshoot back under the budget.
#[test]
fn rescale_pulls_sum_back_under_budget() {
    // Two searches (yield 200) and four posts (yield 25) share 10 items:
    // proportional shares 4, 4, 0, 0, 0, 0 -> floors give 4, 4, 1, 1, 1, 1 = 12;
    // rescaling by 10/12 gives 3, 3, 1, 1, 1, 1 = 10.
    let mut raw = vec!["alpha beta".to_string(), "gamma delta".to_string()];
    raw.extend((0..4).map(|i| format!("https://reddit.com/r/s/comments/p{i}")));
    let s = plan(&classify_all(&raw), PlanLimits::new(10));
    assert_eq!(s.allocated("alpha beta"), 3);
    assert_eq!(s.allocated("gamma delta"), 3);
    assert_eq!(s.total_allocated(), 10);
}

fn source_pool() -> impl Strategy<Value = Vec<Source>> {
    prop::collection::vec(0u8..4, 1..20).prop_map(|kinds| {
        let raw: Vec<String> = kinds
            .iter()
            .enumerate()
            .map(|(i, k)| match k {
                0 => format!("r/sub{i}"),
                1 => format!("u/user{i}"),
                2 => format!("https://reddit.com/r/sub{i}/comments/id{i}"),
                _ => format!("search phrase {i}"),
            })
            .collect();
        classify_all(&raw)
    })
}

proptest! {
    /// The budget is respected whenever it is at least ten items per source.
    #[test]
    fn allocation_respects_budget(sources in source_pool(), extra in 0u32..5000) {
        let total = 10 * sources.len() as u32 + extra;
        let s = plan(&sources, PlanLimits::new(total));
        prop_assert!(s.total_allocated() <= total as u64);
    }

    /// No source is starved while there is at least one item per source.
    #[test]
    fn every_source_gets_at_least_one(sources in source_pool(), extra in 0u32..2000) {
        let total = sources.len() as u32 + extra;
        let s = plan(&sources, PlanLimits::new(total));
        for src in &sources {
            prop_assert!(s.allocated(&src.original) >= 1, "{} starved", src.original);
        }
    }

    /// Search terms never precede a url-derived source.
    #[test]
    fn search_terms_come_last(sources in source_pool()) {
        let s = plan(&sources, PlanLimits::new(1000));
        prop_assert_eq!(s.order.len(), sources.len());
        let is_search = |o: &String| sources.iter().any(|src| &src.original == o && src.is_search());
        if let Some(first_search) = s.order.iter().position(is_search) {
            prop_assert!(s.order[first_search..].iter().all(is_search));
        }
    }

    /// Same input, same plan.
    #[test]
    fn planning_is_deterministic(sources in source_pool(), total in 0u32..10_000) {
        prop_assert_eq!(plan(&sources, PlanLimits::new(total)), plan(&sources, PlanLimits::new(total)));
    }
}
