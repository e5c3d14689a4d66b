//! ISO 8601 text for report timestamps.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

use crate::ReportError;

/// Formats a UTC time as `2021-01-20T00:00:00.300000+00:00`.
///
/// The fraction is omitted when the microseconds are zero.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    if time.nanosecond() / 1_000 == 0 {
        time.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
    } else {
        time.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
    }
}

/// Parses an RFC 3339 timestamp; text without an offset is read as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, ReportError> {
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Ok(time.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ReportError::data(format!("invalid timestamp '{text}'")))
}
