//! Timestamp utilities

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};

/// Get current UTC timestamp, truncated to the stored millisecond precision
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Render a timestamp in the fixed-width form used for storage and the wire
///
/// Millisecond precision with a `Z` suffix keeps the text form ordered the
/// same way as the instants themselves, so the store can sort on it.
pub fn to_storage(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp
pub fn from_storage(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a client-supplied creation timestamp
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
/// Sub-millisecond digits are dropped to match what the store keeps.
pub fn parse_client_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Some(ts) = from_storage(s) {
        return Some(ts.trunc_subsecs(3));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Today's date as `YYYY-MM-DD`, the form the client stamps on new ratings
pub fn today() -> String {
    now().format("%Y-%m-%d").to_string()
}
