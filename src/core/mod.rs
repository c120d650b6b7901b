pub mod baseline;
pub mod graph;
pub mod primitives;
pub mod projection;
pub mod scaffolding;
pub mod scope;
pub mod ticks;
pub mod timestamp;
pub mod types;

pub use baseline::{Baseline, BaselineStore};
pub use graph::{GraphModel, Node, NodeId, NodeKind};
pub use projection::{
    AxisGeometry, Placement, RestoreFit, TimeSpan, bar_extent, collision_offset,
    extend_time_span, fit_restore_geometry, place_with_collisions, seed_geometry,
    seed_time_span,
};
pub use scaffolding::{
    BarGeometry, Connector, ElementStyle, ScaffoldElement, ScaffoldId, ScaffoldKind,
    ScaffoldingIndex, StylePatch,
};
pub use scope::{ScopeKey, resolve_scope};
pub use ticks::{PlannedTick, TickGranularity, TickLabelPattern, TickPlan, plan_ticks};
pub use timestamp::{RawTimestamp, parse_timestamp};
pub use types::{BOUNDS_TOLERANCE, BoundingBox, Point};
