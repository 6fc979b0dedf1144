use crate::config::ExtractorOptions;
use crate::fetch::{build_tasks, execute, FetchTask, Fetcher, LegacyScrapeParams};
use crate::formatters::format_results;
use crate::issues::ValidationIssue;
use crate::normalizer::normalize;
use crate::params::{AsyncHandoff, ValidatedRequest};
use crate::planner::{plan, PlanLimits, ProcessingStrategy};
use crate::report::{success_response, ProcessingReport};
use crate::results::ExtractionResults;
use crate::source::{classify_all, Source};
use crate::util::{init_tracing_once, write_atomic};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Instant;

/// Entry point: validate, classify and plan a request, then run it against a [`Fetcher`].
#[derive(Clone, Debug, Default)]
pub struct RedditExtractor {
    pub(crate) opts: ExtractorOptions,
}

/// A request that passed validation, with its sources classified and planned.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
    pub request: ValidatedRequest,
    pub warnings: Vec<ValidationIssue>,
    pub sources: Vec<Source>,
    pub strategy: ProcessingStrategy,
    pub report: ProcessingReport,
    pub tasks: Vec<FetchTask>,
}

impl PreparedRequest {
    /// Payload for the job manager when delivery is async, `None` for sync requests.
    pub fn async_handoff(&self) -> Option<AsyncHandoff> {
        self.request.async_handoff()
    }

    pub fn legacy_params(&self) -> LegacyScrapeParams {
        LegacyScrapeParams::from_sources(&self.sources)
    }

    /// What a caller sees before anything is fetched: the plan and the warnings.
    pub fn preview(&self) -> Value {
        json!({
            "success": true,
            "request": self.request,
            "processingReport": self.report,
            "tasks": self.tasks,
            "legacyParams": self.legacy_params(),
            "asyncHandoff": self.async_handoff(),
            "warnings": self.warnings,
        })
    }
}

/// Finished extraction: merged results plus their serialized form.
#[derive(Clone, Debug)]
pub struct ExtractionOutput {
    pub results: ExtractionResults,
    pub payload: String,
    pub content_type: &'static str,
    pub file_extension: &'static str,
    pub failed_sources: Vec<String>,
    /// Success envelope (metadata, warnings) around `results`.
    pub response: Value,
}

impl ExtractionOutput {
    pub fn write_payload(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        write_atomic(path, self.payload.as_bytes()).with_context(|| format!("write payload to {}", path.display()))
    }
}

impl RedditExtractor {
    pub fn new() -> Self {
        Self { opts: ExtractorOptions::default() }
    }

    pub fn with_options(opts: ExtractorOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn fetch_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_fetch_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn pretty_json(mut self, yes: bool) -> Self { self.opts = self.opts.with_pretty_json(yes); self }
    pub fn rss_max_items(mut self, n: usize) -> Self { self.opts = self.opts.with_rss_max_items(n); self }
    pub fn text_preview_chars(mut self, n: usize) -> Self { self.opts = self.opts.with_text_preview_chars(n); self }

    // -------- Operations --------

    /// Normalize the raw body, classify its sources and plan the fetch.
    /// On failure returns every error followed by every warning.
    pub fn prepare(&self, raw: &Value) -> std::result::Result<PreparedRequest, Vec<ValidationIssue>> {
        let normalized = normalize(raw)?;
        let request = normalized.request;
        let sources = classify_all(&request.input.sources);
        let strategy = plan(&sources, PlanLimits::from(&request.content.limits));
        let report = ProcessingReport::new(&sources, &strategy);
        let tasks = build_tasks(&request, &sources, &strategy);
        tracing::debug!(
            "planned {} task(s) over {} source(s), mode {}",
            tasks.len(),
            sources.len(),
            report.processing_strategy.mode
        );
        Ok(PreparedRequest { request, warnings: normalized.warnings, sources, strategy, report, tasks })
    }

    /// Fetch every planned source and format the merged results.
    pub fn run<F>(&self, prepared: &PreparedRequest, fetcher: &F) -> Result<ExtractionOutput>
    where
        F: Fetcher + ?Sized,
    {
        init_tracing_once();
        let started = Instant::now();
        let format = prepared.request.output.format;

        if prepared.request.is_async() {
            tracing::info!("request uses async delivery; running inline, hand-off is the caller's job");
        }

        let outcome = execute(fetcher, &prepared.tasks, &prepared.request, &self.opts);
        let payload = format_results(&outcome.results, format, Some(&prepared.request), &self.opts)
            .with_context(|| format!("format results as {format}"))?;
        let response = success_response(&outcome.results, &prepared.request, started.elapsed().as_secs_f64(), &prepared.warnings);

        Ok(ExtractionOutput {
            payload,
            content_type: format.content_type(),
            file_extension: format.file_extension(),
            failed_sources: outcome.failed_sources,
            results: outcome.results,
            response,
        })
    }
}
