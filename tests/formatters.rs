#[path = "common/mod.rs"]
mod common;

use common::*;
use reddit_extractor::{
    format_csv, format_json, format_results, format_rss, format_xml, normalize, ExtractionResults, ExtractorOptions,
    OutputFormat,
};
use serde_json::json;

fn sample() -> ExtractionResults {
    let mut data = ExtractionResults::new();
    data.posts.push(post("p1", "rust"));
    data.posts.push(post("p2", "rust"));
    data.comments.push(comment("c1", "rust"));
    data
}

#[test]
fn content_types_and_extensions() {
    let table = [
        (OutputFormat::Json, "application/json", "json"),
        (OutputFormat::Csv, "text/csv", "csv"),
        (OutputFormat::Rss, "application/rss+xml", "xml"),
        (OutputFormat::Xml, "application/xml", "xml"),
    ];
    for (f, ct, ext) in table {
        assert_eq!(f.content_type(), ct);
        assert_eq!(f.file_extension(), ext);
    }
}

#[test]
fn json_pretty_and_compact() {
    let data = sample();
    let pretty = format_json(&data, true).unwrap();
    assert!(pretty.contains("\n  \"posts\""));
    let compact = format_json(&data, false).unwrap();
    assert!(!compact.contains('\n'));
    let back: ExtractionResults = serde_json::from_str(&compact).unwrap();
    assert_eq!(back, data);
}

/// Posts table, blank line, comments table. Newlines are flattened, fields
/// with commas or quotes are quoted, and long text is cut at the preview length.
#[test]
fn csv_layout_and_quoting() {
    let mut data = sample();
    data.posts[0]["title"] = json!("Hello, \"world\"\nagain");
    data.posts[1]["selftext"] = json!("x".repeat(20));
    data.posts[1]["over_18"] = json!(true);

    let csv = format_csv(&data, 10);
    let lines: Vec<&str> = csv.split("\r\n").collect();
    assert_eq!(lines[0], "type,id,title,url,author,subreddit,score,num_comments,created_utc,permalink,selftext,domain,is_nsfw,is_pinned");
    assert!(lines[1].starts_with("post,p1,\"Hello, \"\"world\"\" again\",https://reddit.com/r/rust/comments/p1,alice,rust,42,3,1136073600,"));
    assert!(lines[2].contains(&format!(",{},", "x".repeat(10))));
    assert!(lines[2].ends_with(",self.rust,True,False"));
    assert_eq!(lines[3], "\ntype,id,body,author,subreddit,score,created_utc,permalink,parent_id,post_title");
    assert_eq!(lines[4], "comment,c1,Comment c1,bob,rust,7,1136073700,/r/rust/comments/p/c1,t3_p,Parent post");
}

#[test]
fn csv_with_only_comments_has_no_separator() {
    let mut data = ExtractionResults::new();
    data.comments.push(comment("c1", "rust"));
    let csv = format_csv(&data, 500);
    assert!(csv.starts_with("type,id,body,"));
    assert!(format_csv(&ExtractionResults::new(), 500).is_empty());
}

#[test]
fn rss_feed_items() {
    let mut data = sample();
    data.posts[0]["title"] = json!("a < b & c");
    data.posts[1]["url"] = json!(null);
    data.posts[1]["selftext"] = json!("y".repeat(30));
    let req = normalize(&nested_request(&["r/rust"], 10)).unwrap().request;
    let opts = ExtractorOptions::default().with_text_preview_chars(25);

    let rss = format_rss(&data, Some(&req), &opts).unwrap();
    assert!(rss.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(rss.contains("<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">"));
    assert!(rss.contains("<title>Reddit Content: r/rust</title>"));
    assert!(rss.contains("- 2 posts</description>"));
    assert!(rss.contains("<title>a &lt; b &amp; c</title>"));
    assert!(rss.contains("<guid isPermaLink=\"false\">p1</guid>"));
    assert!(rss.contains("<author>u/alice</author>"));
    assert!(rss.contains("<category>r/rust</category>"));
    assert!(rss.contains("<pubDate>Sun, 01 Jan 2006 00:00:00 +0000</pubDate>"));
    assert!(rss.contains("<description>Reddit post from r/rust</description>"));
    // missing url falls back to the permalink, long bodies are cut with an ellipsis
    assert!(rss.contains("<link>https://reddit.com/r/rust/comments/p2</link>"));
    assert!(rss.contains(&format!("<description>{}...</description>", "y".repeat(25))));

    let capped = format_rss(&data, None, &ExtractorOptions::default().with_rss_max_items(1)).unwrap();
    assert_eq!(capped.matches("<item>").count(), 1);
    assert!(capped.contains("<title>RedditExtractor Feed</title>"));
}

#[test]
fn xml_sections_and_metadata() {
    let mut data = sample();
    data.posts[0]["media"] = json!({ "x": 1 });
    data.posts[0]["edited"] = json!(null);
    data.posts[0]["1st key"] = json!("v");
    let req = normalize(&nested_request(&["r/rust"], 10)).unwrap().request;

    let xml = format_xml(&data, Some(&req)).unwrap();
    assert!(xml.contains("<redditData>"));
    assert!(xml.contains("<metadata>"));
    assert!(xml.contains("<itemsReturned>3</itemsReturned>"));
    assert!(xml.contains("<requestParams>"));
    assert!(xml.contains("<posts>"));
    assert_eq!(xml.matches("<post>").count(), 2);
    assert!(xml.contains("<comments>"));
    assert!(xml.contains("<comment>"));
    assert!(!xml.contains("<users>"));
    assert!(!xml.contains("<edited"));
    assert!(xml.contains("<_1st_key>v</_1st_key>"));
    assert!(xml.contains("<media>"));
    assert!(!xml.contains("<x>"));
    assert!(xml.contains("<over_18>False</over_18>"));
}

#[test]
fn format_results_dispatches_on_format() {
    let data = sample();
    let opts = ExtractorOptions::default();
    assert!(format_results(&data, OutputFormat::Csv, None, &opts).unwrap().starts_with("type,id,title"));
    assert!(format_results(&data, OutputFormat::Rss, None, &opts).unwrap().contains("<rss"));
    assert!(format_results(&data, OutputFormat::Xml, None, &opts).unwrap().contains("<redditData>"));
    assert!(format_results(&data, OutputFormat::Json, None, &opts).unwrap().starts_with('{'));
}
