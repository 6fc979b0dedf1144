//! Request normalization: detect the legacy flat schema, convert it to the
//! nested `input/content/output` tree, validate each section independently and
//! run the advisory cross-section checks. Every problem is collected before the
//! request is rejected, so callers see all of them at once.

use crate::date::parse_iso8601;
use crate::issues::{IssueCode, IssueSink, Section, ValidationIssue};
use crate::params::{
    ContentSection, ContentType, Delivery, DeliveryMode, Filters, InputSection, LimitRange, Limits, OutputFormat,
    OutputSection, SortBy, Timeframe, ValidatedRequest, COMMENTS_PER_POST_RANGE, DEFAULT_COMMENTS_PER_POST,
    DEFAULT_TOTAL_ITEMS, ITEMS_PER_PAGE_RANGE, ITEMS_PER_SOURCE_RANGE, TOTAL_ITEMS_RANGE,
};
use crate::source::classify_all;
use serde_json::{json, Map, Value};
use url::Url;

/// Top-level keys that only exist in the flat legacy schema.
pub const LEGACY_KEYS: &[&str] = &[
    "startUrls",
    "searchTerm",
    "maxItems",
    "searchForPosts",
    "searchForComments",
    "searchForUsers",
    "searchForCommunities",
    "skipComments",
    "postsPerPage",
    "commentsPerPage",
    "sortSearch",
    "filterByDate",
    "postDateLimit",
    "includeNSFW",
    "outputFormat",
    "webhookUrl",
];

/// Successful normalization: the canonical tree plus advisory warnings.
#[derive(Clone, Debug)]
pub struct Normalized {
    pub request: ValidatedRequest,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a raw request body in either schema.
///
/// On failure the returned list holds every hard error followed by every
/// warning that fired.
pub fn normalize(raw: &Value) -> Result<Normalized, Vec<ValidationIssue>> {
    let mut sink = IssueSink::new();

    let converted;
    let tree = if is_legacy_format(raw) {
        tracing::debug!("legacy parameter format detected, converting to nested form");
        let nested = nested_sections(raw);
        let suggestion = if nested.is_empty() {
            "Consider migrating to the nested input/content/output structure".to_string()
        } else {
            tracing::debug!("legacy keys found next to {:?}; those sections are ignored", nested);
            format!(
                "Legacy keys take precedence, so the {} section(s) were ignored; remove the flat keys to use the nested structure",
                nested.join("/")
            )
        };
        sink.warn(Section::Request, IssueCode::LegacyFormat, "Using legacy parameter format", suggestion);
        converted = convert_legacy(raw);
        &converted
    } else {
        raw
    };

    let request = validate_tree(tree, &mut sink);
    let (mut errors, warnings) = sink.into_parts();
    if errors.is_empty() {
        Ok(Normalized { request, warnings })
    } else {
        tracing::debug!("request rejected with {} error(s)", errors.len());
        errors.extend(warnings);
        Err(errors)
    }
}

pub fn is_legacy_format(raw: &Value) -> bool {
    raw.as_object()
        .map(|obj| LEGACY_KEYS.iter().any(|k| obj.contains_key(*k)))
        .unwrap_or(false)
}

/// Nested section keys present at the top level of `raw`.
fn nested_sections(raw: &Value) -> Vec<&'static str> {
    ["input", "content", "output"]
        .into_iter()
        .filter(|k| raw.get(*k).is_some())
        .collect()
}

/// Map the flat legacy schema onto the nested one. Values are carried over
/// untouched so the section validators can reject bad ones.
pub fn convert_legacy(legacy: &Value) -> Value {
    let empty = Map::new();
    let p = legacy.as_object().unwrap_or(&empty);
    let get = |k: &str| p.get(k);

    let mut sources = Vec::new();
    match get("startUrls") {
        Some(Value::Array(urls)) => sources.extend(urls.iter().cloned()),
        v if truthy(v) => sources.extend(v.cloned()),
        _ => {}
    }
    if let Some(term) = get("searchTerm").filter(|v| truthy(Some(v))) {
        sources.push(term.clone());
    }

    let mut filters = Map::new();
    if let Some(v) = get("filterByDate").filter(|v| truthy(Some(v))) {
        filters.insert("timeframe".into(), v.clone());
    }
    if let Some(v) = get("sortSearch").filter(|v| truthy(Some(v))) {
        filters.insert("sortBy".into(), v.clone());
    }
    if let Some(v) = get("includeNSFW").filter(|v| !v.is_null()) {
        filters.insert("includeNSFW".into(), v.clone());
    }
    if let Some(v) = get("postDateLimit").filter(|v| truthy(Some(v))) {
        filters.insert("afterDate".into(), v.clone());
    }

    let flag = |k: &str, default: bool| get(k).map(|v| truthy(Some(v))).unwrap_or(default);
    let mut include = Vec::new();
    if flag("searchForPosts", true) {
        include.push("posts");
    }
    if flag("searchForComments", true) && !flag("skipComments", false) {
        include.push("comments");
    }
    if flag("searchForUsers", false) {
        include.push("users");
    }
    if flag("searchForCommunities", false) {
        include.push("communities");
    }

    let mut limits = Map::new();
    if let Some(v) = get("maxItems").filter(|v| truthy(Some(v))) {
        limits.insert("totalItems".into(), v.clone());
    }
    if let Some(v) = get("commentsPerPage").filter(|v| truthy(Some(v))) {
        limits.insert("commentsPerPost".into(), v.clone());
    }
    if let Some(v) = get("postsPerPage").filter(|v| truthy(Some(v))) {
        limits.insert("itemsPerPage".into(), v.clone());
    }

    let format = get("outputFormat").filter(|v| truthy(Some(v))).cloned().unwrap_or_else(|| json!("json"));
    let mut delivery = Map::new();
    delivery.insert("mode".into(), json!("sync"));
    if let Some(hook) = get("webhookUrl").filter(|v| truthy(Some(v))) {
        delivery.insert("mode".into(), json!("async"));
        delivery.insert("webhookUrl".into(), hook.clone());
    }

    json!({
        "input": { "sources": sources, "filters": filters },
        "content": { "include": include, "limits": limits },
        "output": { "format": format, "delivery": delivery },
    })
}

/// Validate a nested tree section by section, then add cross-section warnings.
fn validate_tree(tree: &Value, sink: &mut IssueSink) -> ValidatedRequest {
    let empty = Value::Object(Map::new());
    let tree = if tree.is_object() {
        tree
    } else {
        sink.error(
            Section::Request,
            IssueCode::InvalidRequestBody,
            "Request body must be a JSON object",
            format!("Received: {}", type_name(tree)),
        );
        &empty
    };

    let input = InputSection::validate(tree.get("input"), sink);
    let content = ContentSection::validate(tree.get("content"), sink);
    let output = OutputSection::validate(tree.get("output"), sink);
    cross_section_checks(&input, &content, &output, sink);

    ValidatedRequest { input, content, output }
}

impl InputSection {
    /// Validate the `input` section. Invalid fields keep their defaults in the
    /// returned value; the matching errors land in `sink`.
    pub fn validate(raw: Option<&Value>, sink: &mut IssueSink) -> Self {
        let s = Section::Input;
        let Some(obj) = section_object(raw, "input", s, sink) else {
            sink.error(s, IssueCode::NoInputSources, "At least one input source is required", "input section is missing");
            return Self::default();
        };

        let mut sources = Vec::new();
        match obj.get("sources") {
            v if !truthy(v) => sink.error(
                s,
                IssueCode::NoInputSources,
                "At least one input source is required",
                "Provide Reddit URLs, search terms, or subreddit names in the sources array",
            ),
            None => {}
            Some(Value::Array(items)) => {
                let mut bad_entries = false;
                for item in items {
                    match item {
                        Value::String(text) => {
                            let t = text.trim();
                            if !t.is_empty() {
                                sources.push(t.to_string());
                            }
                        }
                        other => {
                            bad_entries = true;
                            sink.error(
                                s,
                                IssueCode::InvalidSourceType,
                                format!("Source must be a string, got {}", type_name(other)),
                                format!("Received: {other}"),
                            );
                        }
                    }
                }
                if sources.is_empty() && !bad_entries {
                    sink.error(s, IssueCode::NoInputSources, "At least one input source is required", "Every source was blank");
                }
            }
            Some(other) => sink.error(
                s,
                IssueCode::InvalidSourcesType,
                "Sources must be an array",
                format!("Received: {}", type_name(other)),
            ),
        }

        let mut filters = Filters::default();
        if let Some(f) = section_object(obj.get("filters"), "input.filters", s, sink) {
            if let Some(v) = present(f.get("timeframe")) {
                match v.as_str().and_then(Timeframe::parse) {
                    Some(t) => filters.timeframe = t,
                    None => sink.error_with_hints(s, IssueCode::InvalidTimeframe, format!("Invalid timeframe: {}", display(v)), format!("Received: {v}"), Timeframe::options()),
                }
            }
            if let Some(v) = present(f.get("sortBy")) {
                match v.as_str().and_then(SortBy::parse) {
                    Some(sort) => filters.sort_by = sort,
                    None => sink.error_with_hints(s, IssueCode::InvalidSort, format!("Invalid sortBy: {}", display(v)), format!("Received: {v}"), SortBy::options()),
                }
            }
            if let Some(v) = present(f.get("includeNSFW")) {
                match v.as_bool() {
                    Some(b) => filters.include_nsfw = b,
                    None => sink.error(s, IssueCode::InvalidNsfwFlag, "includeNSFW must be a boolean", format!("Received type: {}", type_name(v))),
                }
            }
            if let Some(v) = present(f.get("afterDate")) {
                match v {
                    Value::String(text) => match parse_iso8601(text) {
                        Some(dt) => filters.after_date = Some(dt),
                        None => sink.error(
                            s,
                            IssueCode::InvalidDateFormat,
                            "Invalid afterDate format",
                            format!("Must be an ISO 8601 date such as '2024-01-01' or '2024-01-01T00:00:00Z', received: {text}"),
                        ),
                    },
                    other => sink.error(s, IssueCode::InvalidDateType, "afterDate must be a string", format!("Received type: {}", type_name(other))),
                }
            }
        }

        Self { sources, filters }
    }
}

impl ContentSection {
    /// Validate the `content` section and attach the content-level warnings.
    pub fn validate(raw: Option<&Value>, sink: &mut IssueSink) -> Self {
        let s = Section::Content;
        let mut out = Self::default();
        let Some(obj) = section_object(raw, "content", s, sink) else {
            return out;
        };

        if let Some(v) = present(obj.get("include")) {
            match v {
                Value::Array(items) => {
                    let mut include = Vec::new();
                    for item in items {
                        match item.as_str().and_then(ContentType::parse) {
                            Some(t) if !include.contains(&t) => include.push(t),
                            Some(_) => {}
                            None => sink.error_with_hints(
                                s,
                                IssueCode::InvalidContentType,
                                format!("Invalid content type: {}", display(item)),
                                format!("Received: {item}"),
                                ContentType::options(),
                            ),
                        }
                    }
                    if include.is_empty() {
                        sink.error_with_hints(s, IssueCode::NoContentTypes, "At least one content type must be included", "include is empty after filtering", ContentType::options());
                    }
                    out.include = include;
                }
                other => sink.error_with_hints(
                    s,
                    IssueCode::InvalidIncludeType,
                    "include must be an array",
                    format!("Received type: {}", type_name(other)),
                    ContentType::options(),
                ),
            }
        }

        let mut totals_ok = true;
        if let Some(l) = section_object(obj.get("limits"), "content.limits", s, sink) {
            let mut limits = Limits::default();
            match checked_limit(l.get("totalItems"), TOTAL_ITEMS_RANGE) {
                Ok(v) => limits.total_items = v.unwrap_or(DEFAULT_TOTAL_ITEMS),
                Err(raw) => {
                    totals_ok = false;
                    range_error(sink, s, IssueCode::InvalidTotalItems, "totalItems", TOTAL_ITEMS_RANGE, raw);
                }
            }
            match checked_limit(l.get("itemsPerSource"), ITEMS_PER_SOURCE_RANGE) {
                Ok(v) => limits.items_per_source = v,
                Err(raw) => range_error(sink, s, IssueCode::InvalidItemsPerSource, "itemsPerSource", ITEMS_PER_SOURCE_RANGE, raw),
            }
            match checked_limit(l.get("commentsPerPost"), COMMENTS_PER_POST_RANGE) {
                Ok(v) => limits.comments_per_post = v.unwrap_or(DEFAULT_COMMENTS_PER_POST),
                Err(raw) => range_error(sink, s, IssueCode::InvalidCommentsPerPost, "commentsPerPost", COMMENTS_PER_POST_RANGE, raw),
            }
            match checked_limit(l.get("itemsPerPage"), ITEMS_PER_PAGE_RANGE) {
                Ok(v) => limits.items_per_page = v,
                Err(raw) => range_error(sink, s, IssueCode::InvalidItemsPerPage, "itemsPerPage", ITEMS_PER_PAGE_RANGE, raw),
            }
            out.limits = limits;
        }

        let total = out.limits.total_items;
        let comments = out.includes(ContentType::Comments);
        if totals_ok && total > 1000 && comments {
            sink.warn(s, IssueCode::LargeRequestWithComments, "Large requests with comments may be slow", "Consider using async delivery mode or reducing totalItems");
        }
        if comments && out.limits.comments_per_post > 50 {
            sink.warn(
                s,
                IssueCode::HighCommentsPerPost,
                format!("High commentsPerPost ({}) may slow down processing", out.limits.comments_per_post),
                "Consider reducing commentsPerPost for better performance",
            );
        }
        if totals_ok && total < 10 {
            sink.warn(
                s,
                IssueCode::VeryLowTotalItems,
                format!("Very low totalItems ({total}) may not provide useful data"),
                "Consider increasing totalItems for more comprehensive results",
            );
        }
        if totals_ok && total > 50 && out.includes(ContentType::Users) {
            sink.warn(s, IssueCode::UsersWithHighLimit, "User data scraping is typically slower than posts", "Consider separate requests for user data or reduce totalItems");
        }

        out
    }
}

impl OutputSection {
    /// Validate the `output` section. A webhook URL without an explicit async
    /// mode promotes delivery to async instead of failing.
    pub fn validate(raw: Option<&Value>, sink: &mut IssueSink) -> Self {
        let s = Section::Output;
        let mut out = Self::default();
        let Some(obj) = section_object(raw, "output", s, sink) else {
            return out;
        };

        if let Some(v) = present(obj.get("format")) {
            match v.as_str().and_then(OutputFormat::parse) {
                Some(f) => out.format = f,
                None => sink.error_with_hints(s, IssueCode::InvalidOutputFormat, format!("Invalid output format: {}", display(v)), format!("Received: {v}"), OutputFormat::options()),
            }
        }

        let Some(d) = section_object(obj.get("delivery"), "output.delivery", s, sink) else {
            return out;
        };
        let mut delivery = Delivery::default();
        let requested = match present(d.get("mode")) {
            None => Some(DeliveryMode::Sync),
            Some(v) => {
                let mode = v.as_str().and_then(DeliveryMode::parse);
                if mode.is_none() {
                    sink.error_with_hints(s, IssueCode::InvalidDeliveryMode, format!("Invalid delivery mode: {}", display(v)), format!("Received: {v}"), DeliveryMode::options());
                }
                mode
            }
        };
        if let Some(m) = requested {
            delivery.mode = m;
        }

        let hook = d.get("webhookUrl");
        if requested == Some(DeliveryMode::Async) {
            if !truthy(hook) {
                sink.error(s, IssueCode::MissingWebhookUrl, "webhookUrl is required for async delivery mode", "Provide a valid HTTP/HTTPS URL to receive results");
            } else {
                delivery.webhook_url = checked_webhook(hook, sink);
            }
        } else if truthy(hook) {
            tracing::debug!("webhookUrl supplied without async mode, promoting delivery to async");
            delivery.mode = DeliveryMode::Async;
            delivery.webhook_url = checked_webhook(hook, sink);
        }

        out.delivery = delivery;
        out
    }
}

/// Literal lowercase scheme prefix, and a host once parsed.
fn is_http_url(raw: &str) -> bool {
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return false;
    }
    match Url::parse(raw) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

fn checked_webhook(hook: Option<&Value>, sink: &mut IssueSink) -> Option<String> {
    match hook.and_then(Value::as_str) {
        Some(url) if is_http_url(url) => Some(url.to_string()),
        _ => {
            let received = hook.map(|v| v.to_string()).unwrap_or_default();
            sink.error(Section::Output, IssueCode::InvalidWebhookUrl, "webhookUrl must be a valid HTTP/HTTPS URL", format!("Received: {received}"));
            None
        }
    }
}

/// Advisory checks spanning sections. Each fires independently.
fn cross_section_checks(input: &InputSection, content: &ContentSection, output: &OutputSection, sink: &mut IssueSink) {
    let s = Section::Request;
    let total = content.limits.total_items;
    let sync = output.delivery.mode == DeliveryMode::Sync;
    let format = output.format;
    let n_sources = input.sources.len();
    let classified = classify_all(&input.sources);
    let n_search = classified.iter().filter(|c| c.is_search()).count();

    if sync && total > 1000 {
        sink.warn(s, IssueCode::LargeSyncRequest, format!("Sync mode with {total} items may time out"), "Consider using async delivery mode for large requests");
    }
    if !sync && format != OutputFormat::Json {
        sink.warn(
            s,
            IssueCode::NonJsonAsync,
            format!("Async mode with {format} format will include formatted data in the webhook"),
            "The webhook will receive both JSON and formatted data",
        );
    }
    if n_sources > 1 && content.limits.items_per_source.is_none() {
        sink.warn(
            s,
            IssueCode::MultipleSourcesNoLimit,
            format!("Multiple sources ({n_sources}) without itemsPerSource limit"),
            "Items will be distributed by estimated source yield; set itemsPerSource for an even split",
        );
    }
    if sync && format == OutputFormat::Json && total > 500 {
        sink.warn(
            s,
            IssueCode::LargeJsonResponse,
            format!("Large JSON response ({total} items) may be difficult to analyze"),
            "Consider using 'csv' format for easier analysis in spreadsheets",
        );
    }
    if n_search > 3 {
        sink.warn(
            s,
            IssueCode::ManySearchTerms,
            format!("Multiple search terms ({n_search}) may produce overlapping results"),
            "Consider combining related terms or making separate requests",
        );
    }
    let tf = input.filters.timeframe;
    if matches!(tf, Timeframe::Hour | Timeframe::Day) && input.filters.sort_by == SortBy::Top {
        sink.warn(
            s,
            IssueCode::ShortTimeframeTopSort,
            format!("Sorting by 'top' with '{tf}' timeframe may have limited results"),
            "Consider using 'hot' or 'new' sorting for recent timeframes",
        );
    }
    if sync && n_sources > 5 {
        sink.warn(
            s,
            IssueCode::ManySourcesSync,
            format!("Processing {n_sources} sources synchronously may hit rate limits"),
            "Consider using async mode or reducing the number of sources",
        );
    }
    if classified.iter().any(|c| c.is_user()) && !content.includes(ContentType::Posts) {
        sink.warn(
            s,
            IssueCode::UserSourceNoPosts,
            "User sources typically provide posts; consider including 'posts' in content types",
            "Add 'posts' to content.include for user-based sources",
        );
    }
    if content.includes(ContentType::Comments) && n_sources > 3 {
        sink.warn(
            s,
            IssueCode::CommentsManySources,
            "Including comments with multiple sources significantly increases processing time",
            "Consider making separate requests for comments or reducing sources",
        );
    }
    if format == OutputFormat::Rss && content.includes(ContentType::Comments) {
        sink.warn(
            s,
            IssueCode::RssWithComments,
            "RSS format works best with posts only; comments may not display well",
            "Consider excluding comments for RSS output or use JSON/CSV format",
        );
    }
    let n_types = content.include.len();
    if n_types > 2 && total < 50 {
        sink.warn(
            s,
            IssueCode::LowItemsManyTypes,
            format!("Low totalItems ({total}) with {n_types} content types may yield sparse results"),
            format!("Consider increasing totalItems to at least {} for balanced results", n_types * 25),
        );
    }
}

// ----------------------------- value helpers -----------------------------

/// Loose truthiness: null, false, 0, "", [] and {} are falsy.
fn truthy(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// `Some` unless the key is missing or explicitly null.
fn present(v: Option<&Value>) -> Option<&Value> {
    v.filter(|v| !v.is_null())
}

/// Missing/null sections fall back to defaults; non-object sections are an error.
fn section_object<'a>(v: Option<&'a Value>, path: &str, section: Section, sink: &mut IssueSink) -> Option<&'a Map<String, Value>> {
    match present(v) {
        None => None,
        Some(Value::Object(obj)) => Some(obj),
        Some(other) => {
            sink.error(
                section,
                IssueCode::InvalidSectionType,
                format!("{path} must be an object"),
                format!("Received type: {}", type_name(other)),
            );
            None
        }
    }
}

/// `Ok(None)` when absent, `Ok(Some(n))` when an integer inside `range`,
/// `Err(raw)` otherwise. Floats and booleans are rejected, not coerced.
fn checked_limit(v: Option<&Value>, range: LimitRange) -> Result<Option<u32>, &Value> {
    let Some(raw) = present(v) else { return Ok(None) };
    match raw.as_i64() {
        Some(n) if range.contains(n) => u32::try_from(n).map(Some).map_err(|_| raw),
        _ => Err(raw),
    }
}

fn range_error(sink: &mut IssueSink, s: Section, code: IssueCode, field: &str, range: LimitRange, raw: &Value) {
    sink.error_with_hints(
        s,
        code,
        format!("{field} must be an integer between {} and {}", range.min, range.max),
        format!("Received: {raw}"),
        [format!("min: {}", range.min), format!("max: {}", range.max)],
    );
}

/// Strings without their JSON quotes, everything else as JSON.
fn display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
