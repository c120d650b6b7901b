use chrono::{DateTime, TimeZone, Utc};

use crate::error::{TimelineError, TimelineResult};

pub const MILLIS_PER_DAY: f64 = 86_400_000.0;
pub const MILLIS_PER_YEAR: f64 = 365.25 * MILLIS_PER_DAY;

#[must_use]
pub fn datetime_to_epoch_millis(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64
}

/// Converts epoch milliseconds back into a UTC datetime.
///
/// Returns `None` for non-finite or out-of-range instants.
#[must_use]
pub fn epoch_millis_to_datetime(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    let rounded = millis.floor();
    if rounded > (i64::MAX as f64) || rounded < (i64::MIN as f64) {
        return None;
    }
    Utc.timestamp_millis_opt(rounded as i64).single()
}

pub fn ensure_finite(value: f64, field_name: &str) -> TimelineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TimelineError::InvalidData(format!(
            "{field_name} must be finite"
        )))
    }
}

pub fn ensure_non_negative(value: f64, field_name: &str) -> TimelineResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(TimelineError::InvalidData(format!(
            "{field_name} must be finite and >= 0"
        )))
    }
}

pub fn ensure_positive(value: f64, field_name: &str) -> TimelineResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TimelineError::InvalidData(format!(
            "{field_name} must be finite and > 0"
        )))
    }
}
