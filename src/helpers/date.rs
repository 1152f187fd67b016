//! Date formatting helpers (Brazilian Portuguese)

use chrono::{DateTime, Datelike, FixedOffset, Timelike};

use crate::error::{Error, Result};

/// Abbreviated pt-BR month names, indexed by zero-based month.
const MONTHS_ABBR: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Display template for a formatted date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTemplate {
    /// "25 mar 2021"
    Short,
    /// "25 mar 2021, às 14:30"
    LongWithTime,
}

/// Format an ISO-8601 timestamp with the default short template.
pub fn format_date(iso: &str) -> Result<String> {
    format_date_with(iso, DateTemplate::Short)
}

/// Format an ISO-8601 timestamp for display.
///
/// The content API emits RFC 3339 timestamps as well as a `+0000` offset
/// variant; both are accepted. Anything else is an `InvalidDate`.
pub fn format_date_with(iso: &str, template: DateTemplate) -> Result<String> {
    let date = parse_iso(iso)?;
    let month = MONTHS_ABBR[date.month0() as usize];

    match template {
        DateTemplate::Short => Ok(format!("{} {} {}", date.day(), month, date.year())),
        DateTemplate::LongWithTime => Ok(format!(
            "{} {} {}, às {}:{:02}",
            date.day(),
            month,
            date.year(),
            date.hour(),
            date.minute(),
        )),
    }
}

/// Parse an ISO-8601 timestamp, keeping its original offset.
pub fn parse_iso(iso: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(iso)
        .or_else(|_| DateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map_err(|_| Error::InvalidDate(iso.to_string()))
}
