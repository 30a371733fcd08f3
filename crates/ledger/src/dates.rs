//! Calendar Date Normalization

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};

/// Date-only layouts tried in order. Numeric slashed forms are day-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y%m%d",
];

/// Date-time layouts, fractional seconds optional; the time of day is discarded
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parse a ledger date cell into a calendar date
///
/// Returns `None` when no supported layout matches.
pub fn normalize_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }

    // Year-month only, e.g. "2024-03"
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok()
}

/// First day of every month from `start`'s month through `end`'s month, inclusive
pub fn month_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let Some(mut current) = start.with_day(1) else {
        return months;
    };
    if start.day() != 1 {
        // Month-start frequency begins at the first month start on or after `start`
        current = match current.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => return months,
        };
    }

    while current <= end {
        months.push(current);
        current = match current.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    months
}
