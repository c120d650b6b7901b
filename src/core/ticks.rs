use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{
    MILLIS_PER_DAY, MILLIS_PER_YEAR, datetime_to_epoch_millis, epoch_millis_to_datetime,
};

/// Hard cap on generated (non-endpoint) ticks per plan.
pub const MAX_GENERATED_TICKS: usize = 512;

const DAILY_MAX_SPAN_DAYS: f64 = 10.0;
const MONTHLY_MAX_SPAN_DAYS: f64 = 365.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickGranularity {
    Daily,
    Monthly,
    Yearly { step: u32 },
}

impl TickGranularity {
    #[must_use]
    pub fn for_range(range_ms: f64) -> Self {
        let days = range_ms / MILLIS_PER_DAY;
        if days <= DAILY_MAX_SPAN_DAYS {
            return Self::Daily;
        }
        if days <= MONTHLY_MAX_SPAN_DAYS {
            return Self::Monthly;
        }

        let years = range_ms / MILLIS_PER_YEAR;
        let step = if years <= 20.0 {
            1
        } else if years <= 50.0 {
            5
        } else if years <= 100.0 {
            10
        } else if years <= 500.0 {
            50
        } else {
            100
        };
        Self::Yearly { step }
    }

    #[must_use]
    pub fn label_pattern(self) -> TickLabelPattern {
        match self {
            Self::Daily => TickLabelPattern::MonthDay,
            Self::Monthly => TickLabelPattern::MonthYear,
            Self::Yearly { step } if step >= 100 => TickLabelPattern::Century,
            Self::Yearly { step } if step >= 10 => TickLabelPattern::Decade,
            Self::Yearly { .. } => TickLabelPattern::Year,
        }
    }

    /// Endpoints are labeled one granularity finer than the divisions.
    #[must_use]
    pub fn endpoint_pattern(self) -> TickLabelPattern {
        match self {
            Self::Daily | Self::Monthly => TickLabelPattern::MonthDay,
            Self::Yearly { .. } => TickLabelPattern::MonthYear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickLabelPattern {
    Century,
    Decade,
    Year,
    MonthYear,
    MonthDay,
}

impl TickLabelPattern {
    #[must_use]
    pub fn format(self, time: DateTime<Utc>) -> String {
        let year = time.year();
        match self {
            Self::Century => (year.div_euclid(100) * 100).to_string(),
            Self::Decade => (year.div_euclid(10) * 10).to_string(),
            Self::Year => year.to_string(),
            Self::MonthYear => format!("{}/{}", time.month(), year),
            Self::MonthDay => format!("{}/{}", time.month(), time.day()),
        }
    }

    #[must_use]
    pub fn format_millis(self, millis: f64) -> String {
        epoch_millis_to_datetime(millis).map_or_else(|| "nan".to_owned(), |time| self.format(time))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedTick {
    pub time: f64,
    pub label: String,
    pub endpoint: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickPlan {
    pub granularity: TickGranularity,
    pub ticks: Vec<PlannedTick>,
}

/// Enumerates calendar-aligned ticks for `[min_time, max_time]` (epoch millis).
///
/// Both endpoints are always present. A division whose endpoint-pattern label
/// equals the final endpoint's label is dropped so the two never overlap.
#[must_use]
pub fn plan_ticks(min_time: f64, max_time: f64) -> TickPlan {
    let granularity = TickGranularity::for_range(max_time - min_time);
    let endpoint_pattern = granularity.endpoint_pattern();
    let division_pattern = granularity.label_pattern();

    let mut ticks = vec![PlannedTick {
        time: min_time,
        label: endpoint_pattern.format_millis(min_time),
        endpoint: true,
    }];
    let final_label = endpoint_pattern.format_millis(max_time);

    if let (Some(start), Some(_)) = (
        epoch_millis_to_datetime(min_time),
        epoch_millis_to_datetime(max_time),
    ) {
        let mut cursor = first_boundary_after(start, granularity);
        let mut generated = 0;
        while let Some(boundary) = cursor {
            let time = datetime_to_epoch_millis(boundary);
            if time >= max_time || generated >= MAX_GENERATED_TICKS {
                break;
            }
            if time > min_time && endpoint_pattern.format(boundary) != final_label {
                ticks.push(PlannedTick {
                    time,
                    label: division_pattern.format(boundary),
                    endpoint: false,
                });
                generated += 1;
            }
            cursor = next_boundary(boundary, granularity);
        }
    }

    ticks.push(PlannedTick {
        time: max_time,
        label: final_label,
        endpoint: true,
    });

    TickPlan { granularity, ticks }
}

fn first_boundary_after(start: DateTime<Utc>, granularity: TickGranularity) -> Option<DateTime<Utc>> {
    let aligned = match granularity {
        TickGranularity::Daily => utc_date(start.year(), start.month(), start.day()),
        TickGranularity::Monthly => utc_date(start.year(), start.month(), 1),
        TickGranularity::Yearly { step } => {
            let step = step.max(1) as i32;
            utc_date(start.year().div_euclid(step) * step, 1, 1)
        }
    }?;

    if aligned > start {
        Some(aligned)
    } else {
        next_boundary(aligned, granularity)
    }
}

fn next_boundary(current: DateTime<Utc>, granularity: TickGranularity) -> Option<DateTime<Utc>> {
    match granularity {
        TickGranularity::Daily => current.checked_add_signed(Duration::days(1)),
        TickGranularity::Monthly => {
            let (year, month) = if current.month() == 12 {
                (current.year() + 1, 1)
            } else {
                (current.year(), current.month() + 1)
            };
            utc_date(year, month, 1)
        }
        TickGranularity::Yearly { step } => utc_date(current.year() + step.max(1) as i32, 1, 1),
    }
}

fn utc_date(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Utc.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single()
}
