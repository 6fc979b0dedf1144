mod config;
mod date;
mod reddit_url;
mod source;
mod planner;

mod params;
mod issues;
mod normalizer;
mod enhance;
mod report;

mod results;
mod concurrency;
mod progress;
mod fetch;
mod formatters;
mod util;
mod pipeline;

pub use crate::config::ExtractorOptions;
pub use crate::pipeline::{ExtractionOutput, PreparedRequest, RedditExtractor};

// Core: classification, planning, normalization.
pub use crate::source::{classify, classify_all, Source, SourceKind};
pub use crate::planner::{plan, PlanLimits, ProcessingStrategy, FIXED_OVERHEAD_SECS};
pub use crate::normalizer::{convert_legacy, is_legacy_format, normalize, Normalized, LEGACY_KEYS};
pub use crate::params::{
    AsyncHandoff, ContentSection, ContentType, Delivery, DeliveryMode, Filters, InputSection, LimitRange, Limits,
    OutputFormat, OutputSection, SortBy, Timeframe, ValidatedRequest,
};
pub use crate::issues::{IssueCode, IssueSink, Section, ValidationIssue};

// Reddit URL helpers.
pub use crate::reddit_url::{is_reddit_url, json_endpoint, normalize_url, parse_reddit_url, search_endpoint, RedditTarget};

// Presentation: enhanced errors, report, envelopes, formatters.
pub use crate::enhance::{alternatives, enhance, summarize, Alternative, EnhancedError, ErrorSummary, Help};
pub use crate::report::{error_response, success_response, ProcessingReport, SourceAnalysis};
pub use crate::formatters::{format_csv, format_json, format_results, format_rss, format_xml};

// Fetch boundary.
pub use crate::fetch::{build_tasks, execute, FetchOutcome, FetchTask, Fetcher, LegacyScrapeParams};
pub use crate::results::ExtractionResults;

pub use crate::date::parse_iso8601;
pub use crate::progress::set_global_multiprogress;
pub use crate::util::{init_tracing_once, write_atomic};
