use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{Baseline, NodeId, Point, ScaffoldId, ScopeKey};
use crate::error::{TimelineError, TimelineResult};
use crate::render::Renderer;

use super::TimelineEngine;

pub const TIMELINE_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: NodeId,
    pub position: Point,
    #[serde(default)]
    pub locked_x: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldPositionSnapshot {
    pub id: ScaffoldId,
    pub scope: ScopeKey,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeBaselineSnapshot {
    pub scope: ScopeKey,
    pub baseline: Baseline,
}

/// Persisted timeline state: entity coordinates, scaffolding positions and
/// per-scope baselines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    #[serde(default)]
    pub entities: Vec<EntitySnapshot>,
    #[serde(default)]
    pub scaffolding: Vec<ScaffoldPositionSnapshot>,
    #[serde(default)]
    pub baselines: Vec<ScopeBaselineSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: TimelineSnapshot,
}

impl TimelineSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> TimelineResult<String> {
        let payload = TimelineSnapshotJsonContractV1 {
            schema_version: TIMELINE_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            TimelineError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Accepts either a bare snapshot or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> TimelineResult<Self> {
        if let Ok(payload) = serde_json::from_str::<TimelineSnapshotJsonContractV1>(input) {
            if payload.schema_version != TIMELINE_SNAPSHOT_JSON_SCHEMA_V1 {
                return Err(TimelineError::InvalidData(format!(
                    "unsupported snapshot schema version: {}",
                    payload.schema_version
                )));
            }
            return Ok(payload.snapshot);
        }
        serde_json::from_str::<TimelineSnapshot>(input).map_err(|e| {
            TimelineError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.scaffolding.is_empty() && self.baselines.is_empty()
    }
}

impl<R: Renderer> TimelineEngine<R> {
    /// Captures what a persistence collaborator needs to restore the timeline.
    #[must_use]
    pub fn snapshot(&self) -> TimelineSnapshot {
        let entities = self
            .core
            .graph
            .nodes()
            .filter(|node| node.is_temporal())
            .map(|node| EntitySnapshot {
                id: node.id.clone(),
                position: node.position,
                locked_x: node.numeric_locked_x(),
            })
            .collect();
        let scaffolding = self
            .core
            .session
            .scaffolding
            .elements()
            .map(|element| ScaffoldPositionSnapshot {
                id: element.id.clone(),
                scope: element.scope.clone(),
                position: element.position,
            })
            .collect();
        let baselines = self
            .core
            .session
            .baselines
            .iter()
            .map(|(scope, baseline)| ScopeBaselineSnapshot {
                scope: scope.clone(),
                baseline: *baseline,
            })
            .collect();

        TimelineSnapshot {
            entities,
            scaffolding,
            baselines,
        }
    }

    /// Loads saved coordinates and baselines; every scope carrying a baseline
    /// is marked restoring until `finish_restore` runs for it.
    ///
    /// Returns the number of entities updated. Unknown ids are skipped.
    pub fn apply_snapshot(&mut self, snapshot: &TimelineSnapshot) -> usize {
        for entry in &snapshot.baselines {
            self.begin_restore(entry.scope.clone());
            self.core
                .session
                .baselines
                .insert(entry.scope.clone(), entry.baseline);
        }

        let mut applied = 0;
        for entry in &snapshot.entities {
            let Some(node) = self.core.graph.get_mut(&entry.id) else {
                warn!(id = %entry.id, "snapshot references unknown entity");
                continue;
            };
            node.position = entry.position;
            node.locked_x = entry.locked_x.filter(|value| value.is_finite());
            applied += 1;
        }

        for entry in &snapshot.scaffolding {
            if let Some(element) = self.core.session.scaffolding.get_mut(&entry.id) {
                element.position = entry.position;
            }
        }

        debug!(
            entities = applied,
            baselines = snapshot.baselines.len(),
            "applied timeline snapshot"
        );
        applied
    }
}
