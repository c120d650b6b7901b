//! timeline-rs: temporal axis layout and scaffolding engine.
//!
//! Positions timestamped graph entities along a per-scope time axis, keeps
//! the axis bar, anchors, ticks and connectors in sync with that layout, and
//! preserves manual arrangements across refreshes, container drags and
//! save/restore cycles.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{LayoutRequest, TimelineEngine, TimelineEngineConfig};
pub use error::{TimelineError, TimelineResult};
