//! Fetch-layer boundary. The actual HTTP client lives behind [`Fetcher`];
//! this module turns a plan into ordered tasks, runs them with bounded
//! parallelism, and merges what comes back.

use crate::concurrency::map_limited;
use crate::config::ExtractorOptions;
use crate::params::{ContentType, Filters, ValidatedRequest};
use crate::planner::ProcessingStrategy;
use crate::progress::ProgressScope;
use crate::reddit_url::{json_endpoint, search_endpoint};
use crate::results::ExtractionResults;
use crate::source::Source;
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;

/// One source to fetch, with everything the client needs to do it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FetchTask {
    pub source: Source,
    pub allocation: u32,
    /// Public JSON endpoint for the source.
    pub endpoint: String,
    pub include: Vec<ContentType>,
    pub filters: Filters,
    pub comments_per_post: u32,
}

/// Something that can fetch one source. Implementations must be shareable
/// across rayon workers.
pub trait Fetcher: Sync {
    fn fetch(&self, task: &FetchTask) -> Result<ExtractionResults>;
}

impl<F> Fetcher for F
where
    F: Fn(&FetchTask) -> Result<ExtractionResults> + Sync,
{
    fn fetch(&self, task: &FetchTask) -> Result<ExtractionResults> {
        self(task)
    }
}

/// One task per distinct source in `strategy.order`. Repeats of a source and
/// zero-allocation sources are skipped.
pub fn build_tasks(request: &ValidatedRequest, sources: &[Source], strategy: &ProcessingStrategy) -> Vec<FetchTask> {
    let filters = &request.input.filters;
    let mut tasks = Vec::with_capacity(strategy.order.len());
    let mut seen = HashSet::new();
    for original in &strategy.order {
        if !seen.insert(original.as_str()) {
            tracing::debug!("skipping repeated source {:?}", original);
            continue;
        }
        let Some(source) = sources.iter().find(|s| &s.original == original) else {
            continue;
        };
        let allocation = strategy.allocated(original);
        if allocation == 0 {
            tracing::debug!("skipping {:?}: nothing allocated", original);
            continue;
        }
        let endpoint = match &source.target {
            Some(target) => json_endpoint(target, filters.sort_by, filters.timeframe, allocation),
            None => search_endpoint(&source.normalized, filters.sort_by, filters.timeframe, allocation),
        };
        tasks.push(FetchTask {
            source: source.clone(),
            allocation,
            endpoint,
            include: request.content.include.clone(),
            filters: filters.clone(),
            comments_per_post: request.content.limits.comments_per_post,
        });
    }
    tasks
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchOutcome {
    pub results: ExtractionResults,
    /// Original strings of sources whose fetch failed.
    pub failed_sources: Vec<String>,
}

/// Run every task, merge results in task order, then cap the merged set at
/// `totalItems` and drop content types the caller did not ask for. A failing
/// task is logged and skipped; the others still run.
pub fn execute<F>(fetcher: &F, tasks: &[FetchTask], request: &ValidatedRequest, opts: &ExtractorOptions) -> FetchOutcome
where
    F: Fetcher + ?Sized,
{
    let label = opts.progress_label.as_deref().unwrap_or("sources");
    let progress = ProgressScope::count(opts.progress, label, tasks.len() as u64);

    let fetched = map_limited(tasks, opts.fetch_concurrency, |task| {
        let r = fetcher.fetch(task);
        progress.inc(1);
        r
    });

    let mut outcome = FetchOutcome::default();
    for (task, result) in tasks.iter().zip(fetched) {
        match result {
            Ok(mut part) => {
                // a source never contributes more than it was allotted
                part.trim_to(task.allocation as usize);
                outcome.results.merge(part);
            }
            Err(e) => {
                tracing::warn!("fetch failed for {:?} ({}): {:#}", task.source.original, task.endpoint, e);
                outcome.failed_sources.push(task.source.original.clone());
            }
        }
    }

    let fetched_total = outcome.results.total();
    outcome.results.retain_included(&request.content.include);
    outcome.results.trim_to(request.content.limits.total_items as usize);
    tracing::info!(
        "fetched {} item(s) from {} source(s), kept {}, {} failed",
        fetched_total,
        tasks.len(),
        outcome.results.total(),
        outcome.failed_sources.len()
    );
    progress.finish(format!("{} item(s)", outcome.results.total()));
    outcome
}

/// Flat parameters understood by the older scraping entry point.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyScrapeParams {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub start_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_search_terms: Vec<String>,
}

impl LegacyScrapeParams {
    /// URL-only requests become `startUrls`; search-only requests fold into one
    /// `(a) OR (b)` term; mixed requests keep URLs and carry terms alongside.
    pub fn from_sources(sources: &[Source]) -> Self {
        let mut urls = Vec::new();
        let mut terms = Vec::new();
        for s in sources {
            match (&s.resolved_url, s.is_search()) {
                (Some(url), false) => urls.push(url.clone()),
                _ => terms.push(s.normalized.clone()),
            }
        }
        if !urls.is_empty() && terms.is_empty() {
            Self { start_urls: urls, ..Self::default() }
        } else if urls.is_empty() && !terms.is_empty() {
            let joined = terms.iter().map(|t| format!("({t})")).collect::<Vec<_>>().join(" OR ");
            Self { search_term: Some(joined), ..Self::default() }
        } else {
            Self { start_urls: urls, additional_search_terms: terms, ..Self::default() }
        }
    }
}
