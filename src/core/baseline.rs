use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::projection::{AxisGeometry, TimeSpan};
use crate::core::scope::ScopeKey;
use crate::core::types::BoundingBox;

/// Axis geometry persisted per scope between layout passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub start_x: f64,
    pub width: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub range: f64,
    pub center_y: f64,
    pub max_offset: f64,
    pub bar_start: f64,
    pub bar_length: f64,
    #[serde(default)]
    pub container_bounds: Option<BoundingBox>,
    /// Set when geometry came from fitting previously saved positions.
    #[serde(default)]
    pub restored: bool,
}

impl Baseline {
    /// Fresh baseline whose bar covers exactly the projection region.
    #[must_use]
    pub fn from_parts(span: TimeSpan, geometry: AxisGeometry) -> Self {
        Self {
            start_x: geometry.start_x,
            width: geometry.width,
            min_time: span.min_time,
            max_time: span.max_time,
            range: span.range,
            center_y: geometry.center_y,
            max_offset: 0.0,
            bar_start: geometry.start_x,
            bar_length: geometry.width,
            container_bounds: None,
            restored: false,
        }
    }

    #[must_use]
    pub fn time_span(&self) -> TimeSpan {
        TimeSpan {
            min_time: self.min_time,
            max_time: self.max_time,
            range: self.range,
        }
    }

    pub fn set_time_span(&mut self, span: TimeSpan) {
        self.min_time = span.min_time;
        self.max_time = span.max_time;
        self.range = span.range;
    }

    #[must_use]
    pub fn end_x(&self) -> f64 {
        self.start_x + self.width
    }

    #[must_use]
    pub fn bar_end(&self) -> f64 {
        self.bar_start + self.bar_length
    }

    #[must_use]
    pub fn ratio_of(&self, instant: f64) -> f64 {
        let instant = if instant.is_finite() {
            instant
        } else {
            self.min_time
        };
        (instant - self.min_time) / self.range
    }

    /// Axis coordinate of `instant`; `NaN` instants map to `min_time`.
    #[must_use]
    pub fn project(&self, instant: f64) -> f64 {
        self.start_x + self.ratio_of(instant) * self.width
    }

    /// `true` when the bar spans the whole projection region.
    #[must_use]
    pub fn bar_contains_projection(&self) -> bool {
        self.bar_start <= self.start_x && self.bar_end() >= self.end_x()
    }

    /// Grows the bar so it covers `[start, end]`, never shrinking it.
    pub fn union_bar_extent(&mut self, start: f64, end: f64) {
        let union_start = self.bar_start.min(start);
        let union_end = self.bar_end().max(end);
        self.bar_start = union_start;
        self.bar_length = union_end - union_start;
    }

    /// Moves the axis rigidly with its container.
    pub fn shift(&mut self, dx: f64, dy: f64) {
        self.start_x += dx;
        self.bar_start += dx;
        self.center_y += dy;
        self.container_bounds = self
            .container_bounds
            .map(|bounds| bounds.translated(dx, dy));
    }
}

/// Scope-keyed baseline cache owned by one engine session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineStore {
    entries: IndexMap<ScopeKey, Baseline>,
}

impl BaselineStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, scope: &ScopeKey) -> Option<&Baseline> {
        self.entries.get(scope)
    }

    pub fn get_mut(&mut self, scope: &ScopeKey) -> Option<&mut Baseline> {
        self.entries.get_mut(scope)
    }

    pub fn insert(&mut self, scope: ScopeKey, baseline: Baseline) -> Option<Baseline> {
        self.entries.insert(scope, baseline)
    }

    pub fn remove(&mut self, scope: &ScopeKey) -> Option<Baseline> {
        self.entries.shift_remove(scope)
    }

    pub fn shift(&mut self, scope: &ScopeKey, dx: f64, dy: f64) -> bool {
        match self.entries.get_mut(scope) {
            Some(baseline) => {
                baseline.shift(dx, dy);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ScopeKey, &Baseline)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
