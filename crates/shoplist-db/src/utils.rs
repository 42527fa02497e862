//! Timestamp column helpers

use chrono::{DateTime, Utc};

/// Timestamps are stored as RFC 3339 text
fn parse_stored(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a required timestamp column, falling back to now
///
/// Rows are always written with `to_rfc3339`, so the fallback only covers
/// hand-edited databases.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    parse_stored(s).unwrap_or_else(Utc::now)
}

/// Parse a nullable timestamp column; unparseable values read as absent
pub fn parse_optional_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.as_deref().and_then(parse_stored)
}
