//! Tolerant timestamp normalization.
//!
//! Every accepted representation collapses to UTC epoch milliseconds as `f64`.
//! Unparseable input yields `f64::NAN`; layout callers substitute the scope's
//! `min_time` so malformed entities land at the start of the axis.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::datetime_to_epoch_millis;

/// Values whose magnitude falls below this are read as epoch seconds.
pub const EPOCH_SECONDS_CUTOFF: f64 = 1e12;

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Raw timestamp attribute as delivered by upstream data import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Number(f64),
    Text(String),
}

impl RawTimestamp {
    #[must_use]
    pub fn parse(&self) -> f64 {
        parse_timestamp(self)
    }
}

impl From<f64> for RawTimestamp {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for RawTimestamp {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for RawTimestamp {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawTimestamp {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Number(datetime_to_epoch_millis(value))
    }
}

#[must_use]
pub fn parse_timestamp(raw: &RawTimestamp) -> f64 {
    match raw {
        RawTimestamp::Number(value) => normalize_numeric(*value),
        RawTimestamp::Text(text) => parse_text(text),
    }
}

fn normalize_numeric(value: f64) -> f64 {
    if !value.is_finite() {
        return f64::NAN;
    }

    if value.fract() == 0.0 && (1000.0..=9999.0).contains(&value) {
        return year_start_millis(value as i32);
    }

    if value.abs() < EPOCH_SECONDS_CUTOFF {
        value * 1000.0
    } else {
        value
    }
}

fn parse_text(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }

    if let Ok(numeric) = trimmed.parse::<f64>() {
        return normalize_numeric(numeric);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return datetime_to_epoch_millis(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return datetime_to_epoch_millis(parsed.and_utc());
        }
    }

    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date_start_millis(date);
        }
    }

    // Year-month only, e.g. "1999-03".
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d") {
        return date_start_millis(date);
    }

    f64::NAN
}

fn year_start_millis(year: i32) -> f64 {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .map_or(f64::NAN, datetime_to_epoch_millis)
}

fn date_start_millis(date: NaiveDate) -> f64 {
    date.and_hms_opt(0, 0, 0)
        .map_or(f64::NAN, |naive| datetime_to_epoch_millis(naive.and_utc()))
}
