//! Date helpers: lenient ISO-8601 parsing for `afterDate`, and the RFC 3339 /
//! RFC 2822 renderings used in responses and feeds.

use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Parse an ISO-8601 date or date-time. Accepts `2024-01-01`,
/// `2024-01-01T00:00:00` (with optional fraction, `T` or space separator)
/// and full RFC 3339 with `Z` or an offset. Naive values are taken as UTC.
pub fn parse_iso8601(s: &str) -> Option<OffsetDateTime> {
    let s = s.trim();
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt);
    }
    let naive_t = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");
    let naive_space = format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]");
    let naive_minutes = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    for fmt in [naive_t, naive_space, naive_minutes] {
        if let Ok(dt) = PrimitiveDateTime::parse(s, fmt) {
            return Some(dt.assume_utc());
        }
    }
    let date_only = format_description!("[year]-[month]-[day]");
    Date::parse(s, date_only)
        .ok()
        .map(|d| PrimitiveDateTime::new(d, Time::MIDNIGHT).assume_utc())
}

/// RFC 3339 timestamp for "now", e.g. `2024-05-01T12:00:00.123Z`.
pub fn now_rfc3339() -> String {
    rfc3339(OffsetDateTime::now_utc())
}

pub fn rfc3339(dt: OffsetDateTime) -> String {
    dt.format(&Rfc3339).unwrap_or_else(|_| dt.unix_timestamp().to_string())
}

/// RFC 2822 date for a unix timestamp (seconds, fractional allowed), as RSS wants.
pub fn rfc2822_from_epoch(secs: f64) -> Option<String> {
    if !secs.is_finite() {
        return None;
    }
    let dt = OffsetDateTime::from_unix_timestamp(secs.trunc() as i64).ok()?;
    rfc2822(dt)
}

pub fn rfc2822(dt: OffsetDateTime) -> Option<String> {
    dt.format(&Rfc2822).ok()
}
