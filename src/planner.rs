//! Distribution planner: splits one shared item budget across classified
//! sources, orders them cheapest-first, and estimates how long fetching takes.
//! Pure and deterministic; degenerate input yields a degenerate strategy.

use crate::source::Source;
use serde::Serialize;
use std::collections::BTreeMap;

/// Fixed per-request overhead added to every duration estimate, in seconds.
pub const FIXED_OVERHEAD_SECS: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanLimits {
    pub total_items: u32,
    /// When set, every source gets the same capped share instead of a yield-weighted one.
    pub items_per_source: Option<u32>,
}

impl PlanLimits {
    pub fn new(total_items: u32) -> Self {
        Self { total_items, items_per_source: None }
    }

    pub fn with_items_per_source(mut self, n: u32) -> Self {
        self.items_per_source = Some(n);
        self
    }
}

impl From<&crate::params::Limits> for PlanLimits {
    fn from(l: &crate::params::Limits) -> Self {
        Self { total_items: l.total_items, items_per_source: l.items_per_source }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProcessingStrategy {
    /// Item budget per source, keyed by the caller's original string.
    pub allocation: BTreeMap<String, u32>,
    /// Original strings in fetch order: url-like sources (post, user, subreddit)
    /// then search terms in input order.
    pub order: Vec<String>,
    pub url_sources: usize,
    pub search_sources: usize,
    pub is_mixed: bool,
    pub estimated_duration_seconds: f64,
}

impl ProcessingStrategy {
    pub fn allocated(&self, original: &str) -> u32 {
        self.allocation.get(original).copied().unwrap_or(0)
    }

    pub fn total_allocated(&self) -> u64 {
        self.allocation.values().map(|&v| v as u64).sum()
    }
}

/// Plan allocation and order for `sources` under `limits`.
pub fn plan(sources: &[Source], limits: PlanLimits) -> ProcessingStrategy {
    if sources.is_empty() {
        return ProcessingStrategy::default();
    }

    let allocation = allocate(sources, limits);
    let order = fetch_order(sources);

    let search_sources = sources.iter().filter(|s| s.is_search()).count();
    let url_sources = sources.len() - search_sources;

    let estimated_duration_seconds = sources
        .iter()
        .map(|s| allocation.get(&s.original).copied().unwrap_or(0) as f64 * s.kind.time_cost())
        .sum::<f64>()
        + FIXED_OVERHEAD_SECS;

    ProcessingStrategy {
        allocation,
        order,
        url_sources,
        search_sources,
        is_mixed: url_sources > 0 && search_sources > 0,
        estimated_duration_seconds,
    }
}

fn allocate(sources: &[Source], limits: PlanLimits) -> BTreeMap<String, u32> {
    let total = limits.total_items as u64;
    let count = sources.len() as u64;
    let mut allocation = BTreeMap::new();

    if total == 0 {
        for s in sources {
            allocation.insert(s.original.clone(), 0);
        }
        return allocation;
    }

    if let Some(per_source) = limits.items_per_source {
        let share = (total / count) as u32;
        for s in sources {
            allocation.insert(s.original.clone(), per_source.min(share));
        }
        return allocation;
    }

    let yield_sum: u64 = sources.iter().map(|s| s.estimated_yield as u64).sum();
    for s in sources {
        let share = if yield_sum == 0 { 0 } else { total * s.estimated_yield as u64 / yield_sum };
        allocation.insert(s.original.clone(), share.max(1) as u32);
    }

    // One rescale pass only; the merged results are trimmed after fetch.
    let sum: u64 = allocation.values().map(|&v| v as u64).sum();
    if sum > total {
        tracing::debug!("allocation {} exceeds budget {}, rescaling once", sum, total);
        for v in allocation.values_mut() {
            *v = ((*v as u64 * total / sum) as u32).max(1);
        }
    }
    allocation
}

fn fetch_order(sources: &[Source]) -> Vec<String> {
    let (mut url_like, search_like): (Vec<&Source>, Vec<&Source>) = sources.iter().partition(|s| !s.is_search());
    url_like.sort_by_key(|s| s.fetch_priority());
    url_like
        .into_iter()
        .chain(search_like)
        .map(|s| s.original.clone())
        .collect()
}
