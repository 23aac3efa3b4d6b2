//! Literal date parsing shared by periods and frequency resolution.
//!
//! Every value is reduced to a calendar date ("date stamp"); time-of-day
//! information is truncated.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

use crate::errors::{BudgetError, Result};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Values that can be reduced to a calendar date.
pub trait DateStamp {
    fn to_date_stamp(&self) -> Result<NaiveDate>;
}

impl DateStamp for NaiveDate {
    fn to_date_stamp(&self) -> Result<NaiveDate> {
        Ok(*self)
    }
}

impl DateStamp for NaiveDateTime {
    fn to_date_stamp(&self) -> Result<NaiveDate> {
        Ok(self.date())
    }
}

impl<Tz: TimeZone> DateStamp for DateTime<Tz> {
    fn to_date_stamp(&self) -> Result<NaiveDate> {
        Ok(self.date_naive())
    }
}

impl DateStamp for str {
    fn to_date_stamp(&self) -> Result<NaiveDate> {
        parse_date_stamp(self)
            .ok_or_else(|| BudgetError::validation("date", self, "unrecognized date format"))
    }
}

impl DateStamp for &str {
    fn to_date_stamp(&self) -> Result<NaiveDate> {
        (**self).to_date_stamp()
    }
}

impl DateStamp for String {
    fn to_date_stamp(&self) -> Result<NaiveDate> {
        self.as_str().to_date_stamp()
    }
}

impl DateStamp for &String {
    fn to_date_stamp(&self) -> Result<NaiveDate> {
        self.as_str().to_date_stamp()
    }
}

/// Parses a literal date or datetime, returning `None` when no known format
/// matches the whole (trimmed) input.
pub fn parse_date_stamp(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Some(stamp.date_naive());
    }
    if let Some(date) = parse_compact(value) {
        return Some(date);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|stamp| stamp.date())
        })
}

/// `YYYYMMDD` without separators.
fn parse_compact(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// ISO-8601 rendering used by the text forms and reports.
pub fn format_date_stamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Inclusive, ascending list of every date in `[start, end]`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}
