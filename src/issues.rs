//! Validation issues: fixed machine-readable codes, the section that raised
//! them, and raw context. Turning codes into user guidance happens in `enhance`.

use serde::Serialize;
use std::fmt;

/// Request section an issue originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// The request as a whole (format detection, cross-section checks).
    Request,
    Input,
    Content,
    Output,
}

macro_rules! issue_codes {
    ($($variant:ident => $text:literal),+ $(,)?) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
        pub enum IssueCode { $(#[serde(rename = $text)] $variant),+ }

        impl IssueCode {
            pub fn as_str(self) -> &'static str {
                match self { $(IssueCode::$variant => $text),+ }
            }
        }
    };
}

issue_codes! {
    // hard errors
    InvalidRequestBody => "INVALID_REQUEST_BODY",
    InvalidSectionType => "INVALID_SECTION_TYPE",
    NoInputSources => "NO_INPUT_SOURCES",
    InvalidSourcesType => "INVALID_SOURCES_TYPE",
    InvalidSourceType => "INVALID_SOURCE_TYPE",
    InvalidTimeframe => "INVALID_TIMEFRAME",
    InvalidSort => "INVALID_SORT",
    InvalidNsfwFlag => "INVALID_NSFW_FLAG",
    InvalidDateFormat => "INVALID_DATE_FORMAT",
    InvalidDateType => "INVALID_DATE_TYPE",
    InvalidIncludeType => "INVALID_INCLUDE_TYPE",
    InvalidContentType => "INVALID_CONTENT_TYPE",
    NoContentTypes => "NO_CONTENT_TYPES",
    InvalidTotalItems => "INVALID_TOTAL_ITEMS",
    InvalidItemsPerSource => "INVALID_ITEMS_PER_SOURCE",
    InvalidCommentsPerPost => "INVALID_COMMENTS_PER_POST",
    InvalidItemsPerPage => "INVALID_ITEMS_PER_PAGE",
    InvalidOutputFormat => "INVALID_OUTPUT_FORMAT",
    InvalidDeliveryMode => "INVALID_DELIVERY_MODE",
    MissingWebhookUrl => "MISSING_WEBHOOK_URL",
    InvalidWebhookUrl => "INVALID_WEBHOOK_URL",
    // warnings
    LegacyFormat => "LEGACY_FORMAT",
    LargeRequestWithComments => "LARGE_REQUEST_WITH_COMMENTS",
    HighCommentsPerPost => "HIGH_COMMENTS_PER_POST",
    VeryLowTotalItems => "VERY_LOW_TOTAL_ITEMS",
    UsersWithHighLimit => "USERS_WITH_HIGH_LIMIT",
    LargeSyncRequest => "LARGE_SYNC_REQUEST",
    NonJsonAsync => "NON_JSON_ASYNC",
    MultipleSourcesNoLimit => "MULTIPLE_SOURCES_NO_LIMIT",
    LargeJsonResponse => "LARGE_JSON_RESPONSE",
    ManySearchTerms => "MANY_SEARCH_TERMS",
    ShortTimeframeTopSort => "SHORT_TIMEFRAME_TOP_SORT",
    ManySourcesSync => "MANY_SOURCES_SYNC",
    UserSourceNoPosts => "USER_SOURCE_NO_POSTS",
    CommentsManySources => "COMMENTS_MANY_SOURCES",
    RssWithComments => "RSS_WITH_COMMENTS",
    LowItemsManyTypes => "LOW_ITEMS_MANY_TYPES",
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hard error blocks processing; a warning is advisory and rides along
/// with both success and failure responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "severity", rename_all = "lowercase")]
pub enum ValidationIssue {
    Error {
        code: IssueCode,
        section: Section,
        message: String,
        /// Raw context, e.g. the rejected value.
        details: String,
        /// Accepted values or the valid range, when there is one.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        hints: Vec<String>,
    },
    Warning {
        code: IssueCode,
        section: Section,
        message: String,
        suggestion: String,
    },
}

impl ValidationIssue {
    pub fn code(&self) -> IssueCode {
        match self {
            ValidationIssue::Error { code, .. } | ValidationIssue::Warning { code, .. } => *code,
        }
    }

    pub fn section(&self) -> Section {
        match self {
            ValidationIssue::Error { section, .. } | ValidationIssue::Warning { section, .. } => *section,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationIssue::Error { message, .. } | ValidationIssue::Warning { message, .. } => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationIssue::Error { .. })
    }
}

/// Accumulates every issue a validation pass finds; nothing short-circuits.
#[derive(Debug, Default)]
pub struct IssueSink {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl IssueSink {
    pub fn new() -> Self { Self::default() }

    pub fn error(&mut self, section: Section, code: IssueCode, message: impl Into<String>, details: impl Into<String>) {
        self.error_with_hints(section, code, message, details, Vec::<String>::new());
    }

    pub fn error_with_hints<I, S>(&mut self, section: Section, code: IssueCode, message: impl Into<String>, details: impl Into<String>, hints: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.errors.push(ValidationIssue::Error {
            code,
            section,
            message: message.into(),
            details: details.into(),
            hints: hints.into_iter().map(Into::into).collect(),
        });
    }

    pub fn warn(&mut self, section: Section, code: IssueCode, message: impl Into<String>, suggestion: impl Into<String>) {
        self.warnings.push(ValidationIssue::Warning {
            code,
            section,
            message: message.into(),
            suggestion: suggestion.into(),
        });
    }

    pub fn has_errors(&self) -> bool { !self.errors.is_empty() }

    pub fn error_codes(&self) -> Vec<IssueCode> {
        self.errors.iter().map(|e| e.code()).collect()
    }

    /// Split into (errors, warnings).
    pub fn into_parts(self) -> (Vec<ValidationIssue>, Vec<ValidationIssue>) {
        (self.errors, self.warnings)
    }
}
