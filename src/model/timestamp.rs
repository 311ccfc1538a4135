//! Conversion between stored timestamps and local wall-clock time.
//!
//! All reporting happens in local calendar days, so the model works with `NaiveDateTime` values
//! that are already in local time. The datastore keeps RFC 3339 strings with an offset.

use crate::error::Res;
use anyhow::{bail, Context};
use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone};

/// Parses a stored or user-provided timestamp into local wall-clock time.
///
/// Accepted forms:
/// - RFC 3339 with an offset, e.g. `2024-03-01T14:05:00-05:00` (converted to local time)
/// - A naive date-time, e.g. `2024-03-01T14:05:00` or `2024-03-01 14:05` (taken as local)
/// - A bare date, e.g. `2024-03-01` (local midnight)
pub fn parse_timestamp(s: &str) -> Res<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive);
        }
    }
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_opt(0, 0, 0)
            .with_context(|| format!("Invalid midnight for '{s}'")),
        Err(_) => bail!("Unable to parse '{s}' as a date or timestamp"),
    }
}

/// Formats local wall-clock time as RFC 3339 with the local offset, for storage.
pub fn format_timestamp(local: &NaiveDateTime) -> String {
    let resolved = match Local.from_local_datetime(local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Inside a DST gap; the wall-clock time does not exist, store it as UTC.
        LocalResult::None => Local.from_utc_datetime(local),
    };
    resolved.to_rfc3339()
}
