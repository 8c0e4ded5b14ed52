//! Flexible date handling for upstream payloads.
//!
//! The upstream source emits dates in several shapes depending on the record's
//! age: ISO `YYYY-MM-DD`, display-form `DD/MM/YYYY`, `DD-MM-YYYY`, or a full
//! RFC 3339 timestamp. Everything is parsed to a calendar date up front so the
//! rest of the engine never compares date strings lexicographically.

use chrono::NaiveDate;

/// Display format used throughout the normalized view model.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Parse an upstream date string, trying each known shape in order.
/// Returns None for empty or unrecognizable input.
pub fn parse_flexible(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Timestamp forms first: a date-only parse would reject them outright.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.date());
    }

    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    None
}

/// Format a parsed date for display (`DD/MM/YYYY`).
pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Parse and re-format in one step, falling back to the raw string when the
/// input is unparsable. Display code never shows an empty date for a record
/// that carried one.
pub fn reformat_or_raw(raw: &str) -> String {
    match parse_flexible(raw) {
        Some(date) => format_display(date),
        None => raw.trim().to_string(),
    }
}
