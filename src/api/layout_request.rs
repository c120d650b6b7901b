use serde::{Deserialize, Serialize};

use crate::core::{Baseline, BoundingBox, NodeId, ScopeKey, TickPlan};

use super::BarStyleOverride;

/// Parameters for one timeline layout invocation.
///
/// `Default` lays out the whole graph in the root scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    #[serde(default)]
    pub entities: Option<Vec<NodeId>>,
    #[serde(default)]
    pub scope: Option<ScopeKey>,
    #[serde(default)]
    pub bounds: Option<BoundingBox>,
    #[serde(default)]
    pub padding: Option<f64>,
    #[serde(default)]
    pub min_bar_width: Option<f64>,
    #[serde(default)]
    pub bar_style: Option<BarStyleOverride>,
    #[serde(default)]
    pub restoring: bool,
    #[serde(default)]
    pub force_rebuild: bool,
}

impl LayoutRequest {
    #[must_use]
    pub fn whole_graph() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_scope(scope: ScopeKey) -> Self {
        Self {
            scope: Some(scope),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_entities(entities: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            entities: Some(entities.into_iter().collect()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: ScopeKey) -> Self {
        self.scope = Some(scope);
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }

    #[must_use]
    pub fn with_min_bar_width(mut self, min_bar_width: f64) -> Self {
        self.min_bar_width = Some(min_bar_width);
        self
    }

    #[must_use]
    pub fn with_bar_style(mut self, bar_style: BarStyleOverride) -> Self {
        self.bar_style = Some(bar_style);
        self
    }

    #[must_use]
    pub fn restoring(mut self, restoring: bool) -> Self {
        self.restoring = restoring;
        self
    }

    /// Discards all scope state and reseeds from raw data.
    #[must_use]
    pub fn force_rebuild(mut self, force_rebuild: bool) -> Self {
        self.force_rebuild = force_rebuild;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    FirstBuild,
    Incremental,
    Restore,
    ForcedRebuild,
}

/// How the axis origin/width were obtained in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GeometrySource {
    Seeded,
    Reused,
    /// Container bounds were resized beyond tolerance.
    Recomputed,
    /// Container was translated; axis moved rigidly.
    Shifted { dx: f64, dy: f64 },
    Fitted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPlacement {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub offset: f64,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOutcome {
    pub scope: ScopeKey,
    pub mode: LayoutMode,
    pub geometry: GeometrySource,
    pub placements: Vec<EntityPlacement>,
    pub baseline: Baseline,
    pub ticks: TickPlan,
}

impl LayoutOutcome {
    #[must_use]
    pub fn placement(&self, id: &NodeId) -> Option<&EntityPlacement> {
        self.placements.iter().find(|placement| &placement.id == id)
    }
}
