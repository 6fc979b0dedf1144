use std::str::FromStr;

/// Runtime knobs for fetching and formatting, with sensible defaults and builder chaining.
/// Validation enums and ranges are fixed and deliberately not configurable here.
#[derive(Clone, Debug)]
pub struct ExtractorOptions {
    pub fetch_concurrency: usize,  // sources fetched in parallel
    pub progress: bool,            // show progress bar over sources
    pub progress_label: Option<String>,
    pub pretty_json: bool,
    pub rss_max_items: usize,      // RSS item cap
    pub text_preview_chars: usize, // CSV/RSS body truncation
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            fetch_concurrency: 1, // one source at a time keeps us polite towards reddit
            progress: false,
            progress_label: None,
            pretty_json: true,
            rss_max_items: 50,
            text_preview_chars: 500,
        }
    }
}

pub const ENV_FETCH_CONCURRENCY: &str = "REDDIT_EXTRACTOR_FETCH_CONCURRENCY";
pub const ENV_PROGRESS: &str = "REDDIT_EXTRACTOR_PROGRESS";
pub const ENV_RSS_MAX_ITEMS: &str = "REDDIT_EXTRACTOR_RSS_MAX_ITEMS";

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!("ignoring {}={:?}: expected a boolean", key, raw);
            None
        }
    }
}

impl ExtractorOptions {
    /// Defaults, overridden by any `REDDIT_EXTRACTOR_*` variables that parse.
    pub fn from_env() -> Self {
        let mut o = Self::default();
        if let Some(n) = env_parse::<usize>(ENV_FETCH_CONCURRENCY) {
            o = o.with_fetch_concurrency(n);
        }
        if let Some(b) = env_flag(ENV_PROGRESS) {
            o = o.with_progress(b);
        }
        if let Some(n) = env_parse::<usize>(ENV_RSS_MAX_ITEMS) {
            o = o.with_rss_max_items(n);
        }
        o
    }

    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_pretty_json(mut self, yes: bool) -> Self {
        self.pretty_json = yes;
        self
    }
    pub fn with_rss_max_items(mut self, n: usize) -> Self {
        self.rss_max_items = n;
        self
    }
    pub fn with_text_preview_chars(mut self, n: usize) -> Self {
        self.text_preview_chars = n;
        self
    }
}
