//! Typed request tree produced by the normalizer: three independent sections
//! (`input`, `content`, `output`) plus the fixed option tables they validate against.

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Implements `as_str`, `parse` and the `ALL` table for a fieldless option enum.
macro_rules! option_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name { $($variant),+ }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self { $($name::$variant => $text),+ }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s { $($text => Some($name::$variant),)+ _ => None }
            }

            /// Accepted values, for error context.
            pub fn options() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

option_enum!(Timeframe { Hour => "hour", Day => "day", Week => "week", Month => "month", Year => "year", All => "all" });
option_enum!(SortBy { Hot => "hot", New => "new", Top => "top", Rising => "rising", Relevance => "relevance" });
option_enum!(ContentType { Posts => "posts", Comments => "comments", Users => "users", Communities => "communities" });
option_enum!(OutputFormat { Json => "json", Csv => "csv", Rss => "rss", Xml => "xml" });
option_enum!(DeliveryMode { Sync => "sync", Async => "async" });

/// Inclusive range a numeric limit must fall in; values outside are rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitRange {
    pub min: i64,
    pub max: i64,
}

impl LimitRange {
    pub const fn new(min: i64, max: i64) -> Self { Self { min, max } }
    pub fn contains(&self, v: i64) -> bool { v >= self.min && v <= self.max }
}

pub const TOTAL_ITEMS_RANGE: LimitRange = LimitRange::new(1, 10_000);
pub const ITEMS_PER_SOURCE_RANGE: LimitRange = LimitRange::new(1, 10_000);
pub const COMMENTS_PER_POST_RANGE: LimitRange = LimitRange::new(0, 100);
pub const ITEMS_PER_PAGE_RANGE: LimitRange = LimitRange::new(1, 100);

pub const DEFAULT_TOTAL_ITEMS: u32 = 100;
pub const DEFAULT_COMMENTS_PER_POST: u32 = 20;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub timeframe: Timeframe,
    pub sort_by: SortBy,
    #[serde(rename = "includeNSFW")]
    pub include_nsfw: bool,
    #[serde(serialize_with = "serialize_opt_rfc3339", skip_serializing_if = "Option::is_none")]
    pub after_date: Option<OffsetDateTime>,
}

impl Default for Filters {
    fn default() -> Self {
        Self { timeframe: Timeframe::All, sort_by: SortBy::Hot, include_nsfw: false, after_date: None }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InputSection {
    /// Trimmed, non-empty source strings in caller order.
    pub sources: Vec<String>,
    pub filters: Filters,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    pub total_items: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_per_source: Option<u32>,
    pub comments_per_post: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<u32>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            total_items: DEFAULT_TOTAL_ITEMS,
            items_per_source: None,
            comments_per_post: DEFAULT_COMMENTS_PER_POST,
            items_per_page: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContentSection {
    /// Requested content types, deduplicated, in caller order.
    pub include: Vec<ContentType>,
    pub limits: Limits,
}

impl Default for ContentSection {
    fn default() -> Self {
        Self { include: vec![ContentType::Posts], limits: Limits::default() }
    }
}

impl ContentSection {
    pub fn includes(&self, t: ContentType) -> bool {
        self.include.contains(&t)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub mode: DeliveryMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl Default for Delivery {
    fn default() -> Self {
        Self { mode: DeliveryMode::Sync, webhook_url: None }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OutputSection {
    pub format: OutputFormat,
    pub delivery: Delivery,
}

impl Default for OutputFormat {
    fn default() -> Self { OutputFormat::Json }
}

/// Canonical request tree. Only the normalizer builds one, and only when
/// every section validated cleanly.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidatedRequest {
    pub input: InputSection,
    pub content: ContentSection,
    pub output: OutputSection,
}

impl ValidatedRequest {
    pub fn is_async(&self) -> bool {
        self.output.delivery.mode == DeliveryMode::Async
    }

    /// Payload for the external job manager when delivery is asynchronous.
    pub fn async_handoff(&self) -> Option<AsyncHandoff> {
        if !self.is_async() {
            return None;
        }
        let webhook_url = self.output.delivery.webhook_url.clone()?;
        Some(AsyncHandoff { webhook_url, request: self.clone() })
    }
}

/// Opaque hand-off to the job/webhook layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncHandoff {
    pub webhook_url: String,
    pub request: ValidatedRequest,
}

fn serialize_opt_rfc3339<S: Serializer>(v: &Option<OffsetDateTime>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(dt) => {
            let text = dt.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
            s.serialize_str(&text)
        }
        None => s.serialize_none(),
    }
}
