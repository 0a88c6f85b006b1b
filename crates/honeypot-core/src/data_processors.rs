use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{AnalyticsError, Result};

/// Cell contents that mean "no value" in CSVs exported from pandas.
const NULL_MARKERS: &[&str] = &["nan", "null", "none"];

// ── Cell ──────────────────────────────────────────────────────────────────────

/// Outcome of typing a single CSV cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<T> {
    /// Blank, or one of the pandas null markers.
    Empty,
    Value(T),
    /// Non-empty text that does not fit the target type.
    Invalid,
}

impl<T> Cell<T> {
    /// Collapse to an `Option`, treating [`Cell::Invalid`] as missing.
    pub fn value(self) -> Option<T> {
        match self {
            Cell::Value(v) => Some(v),
            Cell::Empty | Cell::Invalid => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Cell::Invalid)
    }
}

// ── FieldParser ───────────────────────────────────────────────────────────────

/// Converts raw CSV cells into typed field values.
pub struct FieldParser;

impl FieldParser {
    /// Trimmed text, or `None` when the cell is blank or a null marker.
    pub fn text(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if Self::is_null(trimmed) {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// An integer that fits `T`.
    ///
    /// Accepts float spellings of integral values (`"22.0"`), which is how
    /// pandas writes integer columns that contain gaps.
    pub fn integer<T: TryFrom<i64>>(raw: &str) -> Cell<T> {
        let trimmed = raw.trim();
        if Self::is_null(trimmed) {
            return Cell::Empty;
        }

        let whole = match trimmed.parse::<i64>() {
            Ok(v) => Some(v),
            Err(_) => trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .filter(|f| *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64),
        };

        match whole.and_then(|v| T::try_from(v).ok()) {
            Some(v) => Cell::Value(v),
            None => Cell::Invalid,
        }
    }

    /// A finite floating-point number.
    pub fn float(raw: &str) -> Cell<f64> {
        let trimmed = raw.trim();
        if Self::is_null(trimmed) {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Value(v),
            _ => Cell::Invalid,
        }
    }

    fn is_null(trimmed: &str) -> bool {
        trimmed.is_empty()
            || NULL_MARKERS
                .iter()
                .any(|marker| trimmed.eq_ignore_ascii_case(marker))
    }
}

// ── TimestampParser ───────────────────────────────────────────────────────────

/// Default `strftime` patterns, tried in order after RFC 3339.
///
/// Two-digit-year patterns come before their four-digit counterparts so
/// that `"3/3/13 21:53"` is read as 2013 rather than year 13.
pub const DEFAULT_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d",
    "%m/%d/%Y",
];

/// Parses the `datetime` column into wall-clock timestamps.
///
/// Offsets in RFC 3339 input are discarded rather than applied: the
/// timestamp keeps the local time written in the log.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    formats: Vec<String>,
}

impl TimestampParser {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// Parse `raw`, failing with [`AnalyticsError::TimestampParse`] when no
    /// format matches.
    pub fn parse(&self, raw: &str) -> Result<NaiveDateTime> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(AnalyticsError::TimestampParse(raw.to_string()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.naive_local());
        }

        for fmt in &self.formats {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(naive);
            }
            // Date-only patterns need NaiveDate.
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                    return Ok(naive);
                }
            }
        }

        debug!("TimestampParser: no format matched \"{}\"", s);
        Err(AnalyticsError::TimestampParse(raw.to_string()))
    }
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self::new(
            DEFAULT_TIMESTAMP_FORMATS
                .iter()
                .map(|f| (*f).to_string())
                .collect(),
        )
    }
}
