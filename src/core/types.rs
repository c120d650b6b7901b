use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

/// Edge tolerance used when comparing host-supplied bounds between passes.
pub const BOUNDS_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned box in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> TimelineResult<Self> {
        if !x1.is_finite() || !y1.is_finite() || !x2.is_finite() || !y2.is_finite() {
            return Err(TimelineError::InvalidData(
                "bounding box coordinates must be finite".to_owned(),
            ));
        }

        Ok(Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        })
    }

    #[must_use]
    pub fn width(self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    #[must_use]
    pub fn height(self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }

    #[must_use]
    pub fn expanded_to_include(self, point: Point, half_extent: f64) -> Self {
        Self {
            x1: self.x1.min(point.x - half_extent),
            y1: self.y1.min(point.y - half_extent),
            x2: self.x2.max(point.x + half_extent),
            y2: self.y2.max(point.y + half_extent),
        }
    }

    /// Returns `true` when any edge moved by more than `tolerance`.
    #[must_use]
    pub fn differs_from(self, other: Self, tolerance: f64) -> bool {
        (self.x1 - other.x1).abs() > tolerance
            || (self.y1 - other.y1).abs() > tolerance
            || (self.x2 - other.x2).abs() > tolerance
            || (self.y2 - other.y2).abs() > tolerance
    }

    /// Returns `true` when width or height changed by more than `tolerance`.
    #[must_use]
    pub fn resized_from(self, other: Self, tolerance: f64) -> bool {
        (self.width() - other.width()).abs() > tolerance
            || (self.height() - other.height()).abs() > tolerance
    }
}
