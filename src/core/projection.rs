//! Timestamp → axis coordinate mapping.
//!
//! Seeding derives the time span and axis geometry from raw data, collision
//! fan-out separates entities sharing a rounded coordinate, and restore
//! fitting infers the geometry back from coordinates saved earlier.

use std::collections::HashMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::baseline::Baseline;
use crate::core::graph::NodeId;
use crate::core::types::BoundingBox;

/// Synthetic span assigned to degenerate (single instant) datasets.
pub const MIN_TIME_SPAN: f64 = 1.0;

const RATIO_VARIANCE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub min_time: f64,
    pub max_time: f64,
    pub range: f64,
}

impl TimeSpan {
    fn from_bounds(min_time: f64, max_time: f64) -> Self {
        if max_time - min_time < MIN_TIME_SPAN {
            let center = (min_time + max_time) / 2.0;
            let half = MIN_TIME_SPAN / 2.0;
            return Self {
                min_time: center - half,
                max_time: center + half,
                range: MIN_TIME_SPAN,
            };
        }
        Self {
            min_time,
            max_time,
            range: max_time - min_time,
        }
    }

    #[must_use]
    pub fn contains(&self, instant: f64) -> bool {
        instant >= self.min_time && instant <= self.max_time
    }
}

fn raw_bounds(instants: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut bounds: Option<(f64, f64)> = None;
    for instant in instants.into_iter().filter(|value| value.is_finite()) {
        bounds = Some(match bounds {
            Some((min, max)) => (min.min(instant), max.max(instant)),
            None => (instant, instant),
        });
    }
    bounds
}

/// Raw `[min, max]` of the finite instants, widened by `margin_ratio` of the span.
#[must_use]
pub fn seed_time_span(instants: impl IntoIterator<Item = f64>, margin_ratio: f64) -> TimeSpan {
    match raw_bounds(instants) {
        Some((min, max)) => widen(min, max, margin_ratio),
        None => TimeSpan::from_bounds(0.0, MIN_TIME_SPAN),
    }
}

fn widen(min: f64, max: f64, margin_ratio: f64) -> TimeSpan {
    let margin = (max - min) * margin_ratio;
    TimeSpan::from_bounds(min - margin, max + margin)
}

/// Keeps `span` unless some instant falls outside of it.
#[must_use]
pub fn extend_time_span(
    span: TimeSpan,
    instants: impl IntoIterator<Item = f64>,
    margin_ratio: f64,
) -> TimeSpan {
    match raw_bounds(instants) {
        Some((min, max)) if !span.contains(min) || !span.contains(max) => {
            widen(span.min_time.min(min), span.max_time.max(max), margin_ratio)
        }
        _ => span,
    }
}

/// Horizontal placement of the projection region plus the axis center line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisGeometry {
    pub start_x: f64,
    pub width: f64,
    pub center_y: f64,
}

#[must_use]
pub fn seed_geometry(region: BoundingBox, padding: f64, min_width: f64) -> AxisGeometry {
    AxisGeometry {
        start_x: region.x1 + padding,
        width: (region.width() - 2.0 * padding).max(min_width),
        center_y: region.center().y,
    }
}

/// One entity mapped onto the axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub id: NodeId,
    pub instant: f64,
    pub base_x: f64,
    pub offset: f64,
}

impl Placement {
    #[must_use]
    pub fn x(&self) -> f64 {
        self.base_x + self.offset
    }
}

/// Offset assigned to the `collision_index`-th entity sharing a rounded x.
///
/// Alternates `+step, -step, +2*step, -2*step, ...`.
#[must_use]
pub fn collision_offset(collision_index: usize, step: f64) -> f64 {
    if collision_index == 0 {
        return 0.0;
    }
    let magnitude = step * collision_index.div_ceil(2) as f64;
    if collision_index % 2 == 1 {
        magnitude
    } else {
        -magnitude
    }
}

/// Projects `items` in time order and fans out rounded-x collisions.
///
/// Returns placements in time order together with the largest absolute offset.
#[must_use]
pub fn place_with_collisions(
    items: &[(NodeId, f64)],
    baseline: &Baseline,
    step: f64,
) -> (Vec<Placement>, f64) {
    let mut ordered: Vec<(NodeId, f64)> = items
        .iter()
        .map(|(id, instant)| {
            let instant = if instant.is_finite() {
                *instant
            } else {
                baseline.min_time
            };
            (id.clone(), instant)
        })
        .collect();
    ordered.sort_by(|left, right| left.1.total_cmp(&right.1));

    let mut occupancy: HashMap<OrderedFloat<f64>, usize> = HashMap::with_capacity(ordered.len());
    let mut max_offset: f64 = 0.0;
    let placements = ordered
        .into_iter()
        .map(|(id, instant)| {
            let base_x = baseline.project(instant);
            let slot = occupancy.entry(OrderedFloat(base_x.round())).or_insert(0);
            let offset = collision_offset(*slot, step);
            *slot += 1;
            max_offset = max_offset.max(offset.abs());
            Placement {
                id,
                instant,
                base_x,
                offset,
            }
        })
        .collect();

    (placements, max_offset)
}

/// Outcome of inferring axis geometry from saved coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RestoreFit {
    Fitted { start_x: f64, width: f64 },
    Insufficient,
    NonMonotonic { slope: f64 },
}

/// Fits `x = start_x + width * ratio` over `(ratio, x)` samples.
///
/// A single sample (or samples that all share one ratio) keeps
/// `reference_width` and solves for the origin only.
#[must_use]
pub fn fit_restore_geometry(samples: &[(f64, f64)], reference_width: f64) -> RestoreFit {
    let samples: Vec<(f64, f64)> = samples
        .iter()
        .copied()
        .filter(|(ratio, x)| ratio.is_finite() && x.is_finite())
        .collect();
    if samples.is_empty() {
        return RestoreFit::Insufficient;
    }

    let count = samples.len() as f64;
    let mean_ratio = samples.iter().map(|(ratio, _)| ratio).sum::<f64>() / count;
    let mean_x = samples.iter().map(|(_, x)| x).sum::<f64>() / count;
    let variance: f64 = samples
        .iter()
        .map(|(ratio, _)| (ratio - mean_ratio).powi(2))
        .sum();

    if samples.len() == 1 || variance <= RATIO_VARIANCE_EPSILON {
        if !reference_width.is_finite() || reference_width <= 0.0 {
            return RestoreFit::Insufficient;
        }
        return RestoreFit::Fitted {
            start_x: mean_x - mean_ratio * reference_width,
            width: reference_width,
        };
    }

    let covariance: f64 = samples
        .iter()
        .map(|(ratio, x)| (ratio - mean_ratio) * (x - mean_x))
        .sum();
    let slope = covariance / variance;
    if !slope.is_finite() || slope <= 0.0 {
        return RestoreFit::NonMonotonic { slope };
    }

    RestoreFit::Fitted {
        start_x: mean_x - slope * mean_ratio,
        width: slope,
    }
}

/// Bar extent covering the projection region, the collision fan-out and
/// every placed coordinate, padded by `margin`.
#[must_use]
pub fn bar_extent(
    start_x: f64,
    width: f64,
    max_offset: f64,
    placed_xs: impl IntoIterator<Item = f64>,
    margin: f64,
) -> (f64, f64) {
    let mut low = start_x - max_offset;
    let mut high = start_x + width + max_offset;
    for x in placed_xs.into_iter().filter(|value| value.is_finite()) {
        low = low.min(x);
        high = high.max(x);
    }
    let bar_start = low - margin;
    (bar_start, high + margin - bar_start)
}
