use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{BoundingBox, NodeId, Point, ScaffoldId, ScopeKey};

/// Pointer lifecycle events forwarded by the host for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragEvent {
    Grab,
    Drag,
    /// Any programmatic or animated position change.
    Position,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisLockState {
    /// No locked coordinate; the entity moves freely on both axes.
    Free,
    /// x is pinned to `locked_x`; only y may change.
    Locked,
}

impl AxisLockState {
    #[must_use]
    pub fn from_locked_x(locked_x: Option<f64>) -> Self {
        match locked_x {
            Some(value) if value.is_finite() => Self::Locked,
            _ => Self::Free,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConstraintDecision {
    Unconstrained,
    Suppressed,
    AlreadyPinned,
    Snap { x: f64 },
}

/// Coordinates closer than this to `locked_x` are considered pinned.
pub const PIN_EPSILON: f64 = 1e-6;

/// Transient per-entity snap suppression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragConstraintState {
    suppressed: HashSet<NodeId>,
}

impl DragConstraintState {
    /// Lets the next constrained event for `id` through without snapping.
    pub fn suppress_once(&mut self, id: NodeId) {
        self.suppressed.insert(id);
    }

    #[must_use]
    pub fn is_suppressed(&self, id: &NodeId) -> bool {
        self.suppressed.contains(id)
    }

    pub fn clear(&mut self, id: &NodeId) {
        self.suppressed.remove(id);
    }

    /// Decides what happens to `x` for one event; consumes a suppression flag.
    pub fn resolve(&mut self, id: &NodeId, x: f64, locked_x: Option<f64>) -> ConstraintDecision {
        let locked_x = match AxisLockState::from_locked_x(locked_x) {
            AxisLockState::Free => return ConstraintDecision::Unconstrained,
            AxisLockState::Locked => locked_x.unwrap_or(x),
        };
        if (x - locked_x).abs() <= PIN_EPSILON {
            return ConstraintDecision::AlreadyPinned;
        }
        if self.suppressed.remove(id) {
            return ConstraintDecision::Suppressed;
        }
        ConstraintDecision::Snap { x: locked_x }
    }
}

/// Pre-drag state of one scaffolding element moved along with a container.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldDragRecord {
    pub id: ScaffoldId,
    pub position: Point,
    pub parent: Option<NodeId>,
    pub locked: bool,
}

/// Value object created on container grab and consumed on release.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDragSession {
    pub container: NodeId,
    pub bounds_before: Option<BoundingBox>,
    pub center_before: Point,
    pub unlocked_entities: Vec<NodeId>,
    pub scaffolding: Vec<ScaffoldDragRecord>,
    pub scopes: SmallVec<[ScopeKey; 2]>,
}

impl ContainerDragSession {
    #[must_use]
    pub fn new(container: NodeId, bounds_before: Option<BoundingBox>, center_before: Point) -> Self {
        Self {
            container,
            bounds_before,
            center_before,
            unlocked_entities: Vec::new(),
            scaffolding: Vec::new(),
            scopes: SmallVec::new(),
        }
    }

    pub fn track_scope(&mut self, scope: ScopeKey) {
        if !self.scopes.contains(&scope) {
            self.scopes.push(scope);
        }
    }

    /// Net center displacement since grab.
    #[must_use]
    pub fn offset_to(&self, center_after: Point) -> (f64, f64) {
        (
            center_after.x - self.center_before.x,
            center_after.y - self.center_before.y,
        )
    }

    /// `true` when the release geometry warrants moving scaffolding.
    #[must_use]
    pub fn moved(&self, bounds_after: Option<BoundingBox>, center_after: Point, tolerance: f64) -> bool {
        let (dx, dy) = self.offset_to(center_after);
        let offset_detected = dx.abs() > tolerance || dy.abs() > tolerance;
        let bounds_changed = match (self.bounds_before, bounds_after) {
            (Some(before), Some(after)) => after.differs_from(before, tolerance),
            (None, None) => false,
            _ => true,
        };
        offset_detected || bounds_changed
    }
}
