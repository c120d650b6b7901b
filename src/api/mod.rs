mod deferred;
mod drag_coordinator;
mod engine;
mod engine_config;
mod engine_core;
mod layout_coordinator;
mod layout_request;
mod render_frame_builder;
mod scaffolding_builder;
mod snapshot;
mod validation;

pub use deferred::{DeferredQueue, DeferredTask, DeferredTaskKind};
pub use drag_coordinator::ContainerReleaseOutcome;
pub use engine::TimelineEngine;
pub use engine_config::{BarStyle, BarStyleOverride, ScaffoldStyleConfig, TimelineEngineConfig};
pub use layout_request::{
    EntityPlacement, GeometrySource, LayoutMode, LayoutOutcome, LayoutRequest,
};
pub use snapshot::{
    EntitySnapshot, ScaffoldPositionSnapshot, ScopeBaselineSnapshot,
    TIMELINE_SNAPSHOT_JSON_SCHEMA_V1, TimelineSnapshot, TimelineSnapshotJsonContractV1,
};
