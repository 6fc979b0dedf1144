//! Output formatters: JSON, CSV, RSS 2.0 and plain XML renderings of merged results.

use crate::config::ExtractorOptions;
use crate::date::{now_rfc3339, rfc2822, rfc2822_from_epoch};
use crate::params::{OutputFormat, ValidatedRequest};
use crate::results::ExtractionResults;
use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{Map, Value};
use time::OffsetDateTime;

impl OutputFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Csv => "text/csv",
            OutputFormat::Rss => "application/rss+xml",
            OutputFormat::Xml => "application/xml",
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Rss | OutputFormat::Xml => "xml",
        }
    }
}

/// Serialize `data` in `format`. `request` supplies the RSS channel title and
/// the XML metadata block.
pub fn format_results(data: &ExtractionResults, format: OutputFormat, request: Option<&ValidatedRequest>, opts: &ExtractorOptions) -> Result<String> {
    match format {
        OutputFormat::Json => format_json(data, opts.pretty_json),
        OutputFormat::Csv => Ok(format_csv(data, opts.text_preview_chars)),
        OutputFormat::Rss => format_rss(data, request, opts),
        OutputFormat::Xml => format_xml(data, request),
    }
}

pub fn format_json(data: &ExtractionResults, pretty: bool) -> Result<String> {
    let out = if pretty { serde_json::to_string_pretty(data) } else { serde_json::to_string(data) };
    out.context("serialize results as json")
}

// ---------------------------------- CSV ----------------------------------

const POST_HEADERS: [&str; 14] = [
    "type", "id", "title", "url", "author", "subreddit", "score", "num_comments", "created_utc", "permalink", "selftext",
    "domain", "is_nsfw", "is_pinned",
];
const COMMENT_HEADERS: [&str; 10] =
    ["type", "id", "body", "author", "subreddit", "score", "created_utc", "permalink", "parent_id", "post_title"];

/// Quote a field when it contains a delimiter, quote or line break (RFC 4180).
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_row<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let row: Vec<String> = fields.into_iter().map(|f| csv_field(f.as_ref())).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// Scalar as text: strings bare, null/missing as `default`, everything else as JSON.
fn text_of(v: Option<&Value>, default: &str) -> String {
    match v {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => (if *b { "True" } else { "False" }).to_string(),
        Some(other) => other.to_string(),
    }
}

fn flatten(s: &str) -> String {
    s.replace(['\n', '\r'], " ")
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

pub fn format_csv(data: &ExtractionResults, preview_chars: usize) -> String {
    let mut out = String::new();
    if !data.posts.is_empty() {
        csv_row(&mut out, POST_HEADERS);
        for p in &data.posts {
            let selftext = flatten(&text_of(p.get("selftext"), ""));
            csv_row(&mut out, [
                "post".to_string(),
                text_of(p.get("id"), ""),
                flatten(&text_of(p.get("title"), "")),
                text_of(p.get("url"), ""),
                text_of(p.get("author"), ""),
                text_of(p.get("subreddit"), ""),
                text_of(p.get("score"), "0"),
                text_of(p.get("num_comments"), "0"),
                text_of(p.get("created_utc"), ""),
                text_of(p.get("permalink"), ""),
                truncate_chars(&selftext, preview_chars).to_string(),
                text_of(p.get("domain"), ""),
                text_of(p.get("over_18"), "False"),
                text_of(p.get("pinned"), "False"),
            ]);
        }
    }
    if !data.comments.is_empty() {
        if !data.posts.is_empty() {
            out.push('\n');
        }
        csv_row(&mut out, COMMENT_HEADERS);
        for c in &data.comments {
            let body = flatten(&text_of(c.get("body"), ""));
            csv_row(&mut out, [
                "comment".to_string(),
                text_of(c.get("id"), ""),
                truncate_chars(&body, preview_chars).to_string(),
                text_of(c.get("author"), ""),
                text_of(c.get("subreddit"), ""),
                text_of(c.get("score"), "0"),
                text_of(c.get("created_utc"), ""),
                text_of(c.get("permalink"), ""),
                text_of(c.get("parent_id"), ""),
                flatten(&text_of(c.get("post_title"), "")),
            ]);
        }
    }
    out
}

// ---------------------------------- XML ----------------------------------

type XmlWriter = Writer<Vec<u8>>;

fn leaf(w: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    w.create_element(name).write_text_content(BytesText::new(text))?;
    Ok(())
}

fn open(w: &mut XmlWriter, start: BytesStart<'_>) -> Result<()> {
    w.write_event(Event::Start(start))?;
    Ok(())
}

fn close(w: &mut XmlWriter, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn new_writer() -> Result<XmlWriter> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(w)
}

fn finish(w: XmlWriter) -> Result<String> {
    String::from_utf8(w.into_inner()).context("xml output is not utf-8")
}

/// Make an arbitrary record key usable as an element name.
fn element_name(key: &str) -> String {
    let mut name: String = key
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') { c } else { '_' })
        .collect();
    let bad_start = name.chars().next().map_or(true, |c| !(c.is_alphabetic() || c == '_'));
    if bad_start {
        name.insert(0, '_');
    }
    name
}

fn xml_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        other => other.to_string(),
    }
}

fn write_record(w: &mut XmlWriter, tag: &str, record: &Value) -> Result<()> {
    open(w, BytesStart::new(tag))?;
    if let Value::Object(fields) = record {
        for (k, v) in fields.iter().filter(|(_, v)| !v.is_null()) {
            leaf(w, &element_name(k), &xml_text(v))?;
        }
    }
    close(w, tag)
}

fn write_metadata(w: &mut XmlWriter, meta: &Map<String, Value>) -> Result<()> {
    open(w, BytesStart::new("metadata"))?;
    for (k, v) in meta {
        let name = element_name(k);
        match v {
            Value::Object(inner) => {
                open(w, BytesStart::new(name.as_str()))?;
                for (ik, iv) in inner {
                    let text = if iv.is_null() { String::new() } else { xml_text(iv) };
                    leaf(w, &element_name(ik), &text)?;
                }
                close(w, &name)?;
            }
            Value::Null => leaf(w, &name, "")?,
            other => leaf(w, &name, &xml_text(other))?,
        }
    }
    close(w, "metadata")
}

pub fn format_xml(data: &ExtractionResults, request: Option<&ValidatedRequest>) -> Result<String> {
    let mut meta = Map::new();
    meta.insert("generatedAt".into(), Value::String(now_rfc3339()));
    meta.insert("itemsReturned".into(), Value::from(data.total()));
    if let Some(req) = request {
        meta.insert("requestParams".into(), serde_json::to_value(req).context("serialize request for xml metadata")?);
    }

    let mut w = new_writer()?;
    open(&mut w, BytesStart::new("redditData"))?;
    write_metadata(&mut w, &meta)?;
    let sections: [(&str, &str, &[Value]); 4] = [
        ("posts", "post", &data.posts),
        ("comments", "comment", &data.comments),
        ("users", "user", &data.users),
        ("communities", "community", &data.communities),
    ];
    for (section, tag, records) in sections {
        if records.is_empty() {
            continue;
        }
        open(&mut w, BytesStart::new(section))?;
        for r in records {
            write_record(&mut w, tag, r)?;
        }
        close(&mut w, section)?;
    }
    close(&mut w, "redditData")?;
    finish(w)
}

// ---------------------------------- RSS ----------------------------------

fn channel_title(request: Option<&ValidatedRequest>) -> String {
    let sources = request.map(|r| r.input.sources.as_slice()).unwrap_or_default();
    match sources {
        [] => "RedditExtractor Feed".to_string(),
        [only] => format!("Reddit Content: {only}"),
        many => format!("Reddit Content from {} sources", many.len()),
    }
}

fn get_str<'a>(v: &'a Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn epoch_of(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn format_rss(data: &ExtractionResults, request: Option<&ValidatedRequest>, opts: &ExtractorOptions) -> Result<String> {
    let mut w = new_writer()?;
    open(&mut w, BytesStart::new("rss").with_attributes([("version", "2.0"), ("xmlns:atom", "http://www.w3.org/2005/Atom")]))?;
    open(&mut w, BytesStart::new("channel"))?;
    leaf(&mut w, "title", &channel_title(request))?;
    leaf(&mut w, "description", &format!("Reddit content extracted by RedditExtractor - {} posts", data.posts.len()))?;
    leaf(&mut w, "link", "https://reddit.com")?;
    leaf(&mut w, "generator", "RedditExtractor API")?;
    if let Some(now) = rfc2822(OffsetDateTime::now_utc()) {
        leaf(&mut w, "lastBuildDate", &now)?;
    }

    for post in data.posts.iter().take(opts.rss_max_items) {
        let subreddit = get_str(post, "subreddit").unwrap_or("unknown");
        let link = match get_str(post, "url") {
            Some(u) => u.to_string(),
            None => format!("https://reddit.com{}", get_str(post, "permalink").unwrap_or_default()),
        };
        let body = match get_str(post, "selftext") {
            Some(t) => t.to_string(),
            None => format!("Reddit post from r/{subreddit}"),
        };
        let description = if body.chars().count() > opts.text_preview_chars {
            format!("{}...", truncate_chars(&body, opts.text_preview_chars))
        } else {
            body
        };

        open(&mut w, BytesStart::new("item"))?;
        leaf(&mut w, "title", get_str(post, "title").unwrap_or("Untitled Post"))?;
        leaf(&mut w, "link", &link)?;
        leaf(&mut w, "description", &description)?;
        leaf(&mut w, "author", &format!("u/{}", get_str(post, "author").unwrap_or("unknown")))?;
        leaf(&mut w, "category", &format!("r/{subreddit}"))?;
        w.create_element("guid")
            .with_attribute(("isPermaLink", "false"))
            .write_text_content(BytesText::new(get_str(post, "id").unwrap_or_default()))?;
        if let Some(pub_date) = epoch_of(post.get("created_utc")).and_then(rfc2822_from_epoch) {
            leaf(&mut w, "pubDate", &pub_date)?;
        }
        close(&mut w, "item")?;
    }

    close(&mut w, "channel")?;
    close(&mut w, "rss")?;
    finish(w)
}
