//! Presentation of validation errors: maps each `IssueCode` onto a category,
//! user-facing wording and structured help, plus request-aware suggestions,
//! a grouped summary and alternative request shapes.

use crate::issues::{IssueCode, Section, ValidationIssue};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const CAT_INPUT: &str = "Input Configuration";
const CAT_FILTERS: &str = "Input Filters";
const CAT_CONTENT: &str = "Content Configuration";
const CAT_LIMITS: &str = "Limits";
const CAT_OUTPUT: &str = "Output Configuration";
const CAT_ASYNC: &str = "Async Configuration";
const CAT_GENERAL: &str = "General";

/// Static help text for one code. Fields left empty are omitted from output.
struct CatalogEntry {
    category: &'static str,
    user_message: &'static str,
    explanation: &'static str,
    examples: &'static [&'static str],
    how_to_fix: &'static [&'static str],
    valid_options: &'static [&'static str],
    recommendations: &'static [(&'static str, &'static str)],
    use_cases: &'static [(&'static str, &'static str)],
    format_guide: &'static [(&'static str, &'static str)],
    setup_guide: &'static [&'static str],
    requirements: &'static [&'static str],
    documentation: Option<&'static str>,
}

const BLANK: CatalogEntry = CatalogEntry {
    category: CAT_GENERAL,
    user_message: "",
    explanation: "",
    examples: &[],
    how_to_fix: &[],
    valid_options: &[],
    recommendations: &[],
    use_cases: &[],
    format_guide: &[],
    setup_guide: &[],
    requirements: &[],
    documentation: None,
};

fn catalog(code: IssueCode) -> CatalogEntry {
    use IssueCode::*;
    match code {
        NoInputSources => CatalogEntry {
            category: CAT_INPUT,
            user_message: "No input sources provided",
            explanation: "The API needs to know what Reddit content to scrape. You must specify at least one source.",
            examples: &[
                r#""sources": ["r/python"]"#,
                r#""sources": ["machine learning"]"#,
                r#""sources": ["https://reddit.com/r/javascript"]"#,
            ],
            documentation: Some("/docs#input-sources"),
            ..BLANK
        },
        InvalidSourcesType | InvalidSourceType => CatalogEntry {
            category: CAT_INPUT,
            user_message: "Sources must be provided as an array of strings",
            explanation: "The sources parameter expects a JSON array of strings, not a single string or other type.",
            how_to_fix: &[r#"Wrong: "sources": "r/python""#, r#"Correct: "sources": ["r/python"]"#],
            documentation: Some("/docs#input-sources"),
            ..BLANK
        },
        InvalidTimeframe => CatalogEntry {
            category: CAT_FILTERS,
            user_message: "Invalid time filter specified",
            explanation: "Reddit supports specific time ranges for filtering content by recency.",
            valid_options: &["hour", "day", "week", "month", "year", "all"],
            documentation: Some("/docs#time-filters"),
            ..BLANK
        },
        InvalidSort => CatalogEntry {
            category: CAT_FILTERS,
            user_message: "Invalid sorting option specified",
            explanation: "Reddit provides different ways to sort content. Choose the one that best fits your use case.",
            valid_options: &["hot", "new", "top", "rising", "relevance"],
            recommendations: &[
                ("hot", "Trending content (good for current discussions)"),
                ("new", "Latest posts (good for real-time monitoring)"),
                ("top", "Highest scoring content (good for quality posts)"),
                ("rising", "Gaining momentum (good for emerging trends)"),
                ("relevance", "Most relevant to search terms (best for searches)"),
            ],
            documentation: Some("/docs#sorting-options"),
            ..BLANK
        },
        InvalidNsfwFlag | InvalidDateFormat | InvalidDateType => CatalogEntry {
            category: CAT_FILTERS,
            user_message: "Invalid filter value",
            explanation: "includeNSFW must be true or false; afterDate must be an ISO 8601 date string.",
            examples: &[r#""includeNSFW": false"#, r#""afterDate": "2024-01-01T00:00:00Z""#],
            documentation: Some("/docs#time-filters"),
            ..BLANK
        },
        InvalidContentType | InvalidIncludeType | NoContentTypes => CatalogEntry {
            category: CAT_CONTENT,
            user_message: "Invalid content type specified",
            explanation: "You can choose which types of Reddit content to include in your results.",
            valid_options: &["posts", "comments", "users", "communities"],
            use_cases: &[
                ("posts", "Reddit submissions and discussions"),
                ("comments", "User replies and conversations"),
                ("users", "Profile information and activity"),
                ("communities", "Subreddit information and stats"),
            ],
            documentation: Some("/docs#content-types"),
            ..BLANK
        },
        InvalidTotalItems => CatalogEntry {
            category: CAT_LIMITS,
            user_message: "Invalid total items limit",
            explanation: "The totalItems limit controls how much data you get back. Choose based on your needs and processing capabilities.",
            recommendations: &[
                ("1-50", "Quick sampling or testing"),
                ("51-200", "Standard analysis or reports"),
                ("201-1000", "Comprehensive research (consider async mode)"),
                ("1000+", "Large datasets (requires async mode)"),
            ],
            documentation: Some("/docs#limits"),
            ..BLANK
        },
        InvalidItemsPerSource | InvalidCommentsPerPost | InvalidItemsPerPage => CatalogEntry {
            category: CAT_LIMITS,
            user_message: "Invalid numeric limit",
            explanation: "Numeric limits must be whole numbers inside their documented range.",
            documentation: Some("/docs#limits"),
            ..BLANK
        },
        MissingWebhookUrl => CatalogEntry {
            category: CAT_ASYNC,
            user_message: "Webhook URL required for async processing",
            explanation: "Async mode sends results to your webhook when processing is complete. This prevents timeouts for large requests.",
            setup_guide: &[
                "1. Set up a webhook endpoint on your server",
                "2. Ensure it accepts POST requests",
                "3. Handle the JSON payload we'll send",
                "4. Return a 200 status code to confirm receipt",
            ],
            documentation: Some("/docs#webhooks"),
            ..BLANK
        },
        InvalidWebhookUrl => CatalogEntry {
            category: CAT_ASYNC,
            user_message: "Invalid webhook URL format",
            explanation: "Webhook URLs must be valid HTTP/HTTPS endpoints that can receive POST requests.",
            requirements: &[
                "Must start with http:// or https://",
                "Must be a valid URL format",
                "Should be publicly accessible",
                "Should return 200 OK for POST requests",
            ],
            documentation: Some("/docs#webhook-setup"),
            ..BLANK
        },
        InvalidOutputFormat => CatalogEntry {
            category: CAT_OUTPUT,
            user_message: "Invalid output format specified",
            explanation: "Choose the format that best suits your use case and downstream processing needs.",
            format_guide: &[
                ("json", "Default format, best for APIs and programming"),
                ("csv", "Spreadsheet format, great for analysis in Excel/Google Sheets"),
                ("rss", "Feed format, perfect for content syndication"),
                ("xml", "Structured markup, good for legacy systems"),
            ],
            documentation: Some("/docs#output-formats"),
            ..BLANK
        },
        InvalidDeliveryMode => CatalogEntry {
            category: CAT_ASYNC,
            user_message: "Invalid delivery mode specified",
            explanation: "Results are either returned in the response (sync) or posted to a webhook later (async).",
            valid_options: &["sync", "async"],
            documentation: Some("/docs#webhooks"),
            ..BLANK
        },
        InvalidSectionType | InvalidRequestBody => CatalogEntry {
            category: CAT_GENERAL,
            user_message: "Malformed request structure",
            explanation: "The request body and each of its input, content and output sections must be JSON objects.",
            ..BLANK
        },
        // warnings carry their own suggestion and are not enhanced
        _ => BLANK,
    }
}

fn category_for(issue: &ValidationIssue) -> &'static str {
    let c = catalog(issue.code()).category;
    if c != CAT_GENERAL {
        return c;
    }
    match issue.section() {
        Section::Input => CAT_INPUT,
        Section::Content => CAT_CONTENT,
        Section::Output => CAT_OUTPUT,
        Section::Request => CAT_GENERAL,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Help {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub how_to_fix: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub valid_options: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub recommendations: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub use_cases: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub format_guide: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub setup_guide: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// A validation error dressed up for humans. Code and section are kept so
/// every entry stays traceable to the check that raised it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnhancedError {
    pub code: IssueCode,
    pub section: Section,
    pub message: String,
    pub details: String,
    pub explanation: String,
    pub category: &'static str,
    pub severity: &'static str,
    pub help: Help,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> BTreeMap<String, String> {
    items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Enhance one issue. `raw_request` (the body as received, in nested form when
/// possible) feeds the context-aware suggestions.
pub fn enhance(issue: &ValidationIssue, raw_request: Option<&Value>) -> EnhancedError {
    let entry = catalog(issue.code());
    let (details, hints) = match issue {
        ValidationIssue::Error { details, hints, .. } => (details.clone(), hints.clone()),
        ValidationIssue::Warning { suggestion, .. } => (suggestion.clone(), Vec::new()),
    };
    let message = if entry.user_message.is_empty() { issue.message().to_string() } else { entry.user_message.to_string() };
    let valid_options = if entry.valid_options.is_empty() { hints } else { strings(entry.valid_options) };

    let help = Help {
        examples: strings(entry.examples),
        how_to_fix: strings(entry.how_to_fix),
        valid_options,
        recommendations: pairs(entry.recommendations),
        use_cases: pairs(entry.use_cases),
        format_guide: pairs(entry.format_guide),
        setup_guide: strings(entry.setup_guide),
        requirements: strings(entry.requirements),
        documentation: entry.documentation.map(str::to_string),
        suggestions: raw_request.map(|r| smart_suggestions(issue.code(), r)).unwrap_or_default(),
    };

    EnhancedError {
        code: issue.code(),
        section: issue.section(),
        message,
        details: if details.is_empty() { entry.explanation.to_string() } else { details },
        explanation: entry.explanation.to_string(),
        category: category_for(issue),
        severity: if issue.is_error() { "error" } else { "warning" },
        help,
    }
}

pub fn enhance_all(issues: &[ValidationIssue], raw_request: Option<&Value>) -> Vec<EnhancedError> {
    issues.iter().filter(|i| i.is_error()).map(|i| enhance(i, raw_request)).collect()
}

fn smart_suggestions(code: IssueCode, req: &Value) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    match code {
        IssueCode::NoInputSources => {
            out.push("Try starting with a simple source like 'r/popular' to test the API".into());
            out.push("You can mix URLs and search terms: ['r/python', 'machine learning']".into());
        }
        IssueCode::InvalidTotalItems => {
            let current = req.pointer("/content/limits/totalItems").or_else(|| req.get("maxItems")).and_then(Value::as_f64);
            match current {
                Some(v) if v > 10_000.0 => {
                    out.push("Consider breaking large requests into smaller batches".into());
                    out.push("Use async mode with webhooks for processing large datasets".into());
                }
                Some(v) if v < 1.0 => out.push("Set totalItems to at least 10 for meaningful results".into()),
                _ => {}
            }
        }
        IssueCode::MissingWebhookUrl => {
            out.push("Test with sync mode first using smaller totalItems (< 1000)".into());
            out.push("Use webhook.site to create a test webhook URL for development".into());
            out.push("Consider using ngrok to expose your local development server".into());
        }
        IssueCode::InvalidOutputFormat => {
            let current = req
                .pointer("/output/format")
                .or_else(|| req.get("outputFormat"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            if current.contains("xls") {
                out.push("Use 'csv' format instead - it opens in Excel and is more compatible".into());
            } else if current.contains("txt") {
                out.push("Use 'csv' format for structured data or 'json' for programming use".into());
            }
        }
        _ => {}
    }
    out
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub total_errors: usize,
    /// Codes grouped by category.
    pub categories: BTreeMap<String, Vec<IssueCode>>,
    pub quick_fixes: Vec<String>,
    pub next_steps: Vec<String>,
}

/// Group enhanced errors by category and add fixes for the categories seen.
pub fn summarize(errors: &[EnhancedError]) -> Option<ErrorSummary> {
    if errors.is_empty() {
        return None;
    }
    let mut summary = ErrorSummary { total_errors: errors.len(), ..Default::default() };
    for e in errors {
        summary.categories.entry(e.category.to_string()).or_default().push(e.code);
    }
    let has = |c: &str| summary.categories.contains_key(c);
    let (input, limits, asyncc) = (has(CAT_INPUT), has(CAT_LIMITS), has(CAT_ASYNC));
    if input {
        summary.quick_fixes.push("Check your input sources array format".into());
        summary.next_steps.push("Review the input section of your request".into());
    }
    if limits {
        summary.quick_fixes.push("Verify your numeric limits are within valid ranges".into());
        summary.next_steps.push("Consider using smaller limits for testing".into());
    }
    if asyncc {
        summary.quick_fixes.push("Set up a webhook URL for async processing".into());
        summary.next_steps.push("Test with sync mode first using smaller datasets".into());
    }
    summary.next_steps.extend(
        [
            "Check the API documentation for examples",
            "Validate the request format against the nested input/content/output schema",
            "Start with a minimal request and add parameters gradually",
        ]
        .map(String::from),
    );
    Some(summary)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Alternative {
    pub title: &'static str,
    pub description: &'static str,
    pub change: &'static str,
}

/// Request shapes that are more likely to go through than the failed one.
pub fn alternatives(failed_request: &Value) -> Vec<Alternative> {
    let mut out = Vec::new();
    let mode = failed_request.pointer("/output/delivery/mode").and_then(Value::as_str).unwrap_or("sync");
    let total = failed_request.pointer("/content/limits/totalItems").and_then(Value::as_f64).unwrap_or(0.0);
    if mode == "sync" && total > 1000.0 {
        out.push(Alternative {
            title: "Use Async Processing",
            description: "Switch to async mode to handle large requests without timeouts",
            change: "Set output.delivery.mode to 'async' and add a webhookUrl",
        });
    }

    let len_at = |ptr: &str| failed_request.pointer(ptr).and_then(Value::as_array).map_or(0, Vec::len);
    if len_at("/input/sources") > 3 || len_at("/content/include") > 2 {
        out.push(Alternative {
            title: "Simplify Request",
            description: "Start with fewer sources and content types, then expand gradually",
            change: "Reduce to 1-2 sources and focus on 'posts' only initially",
        });
    }

    out.push(Alternative {
        title: "Try Legacy Format",
        description: "Use the simpler flat parameter format while learning the nested structure",
        change: "Send startUrls/searchTerm/maxItems at the top level instead of input/content/output",
    });
    out
}
