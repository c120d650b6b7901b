use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};

use crate::core::{BaselineStore, GraphModel, NodeId, ScaffoldingIndex, ScopeKey};
use crate::interaction::{ContainerDragSession, DragConstraintState};

use super::{BarStyle, DeferredQueue, TimelineEngineConfig};

/// Scope-keyed side tables owned by one graph session.
///
/// Everything here is cleared per scope on teardown; nothing is global.
#[derive(Debug, Default)]
pub(super) struct TimelineSession {
    pub(super) baselines: BaselineStore,
    pub(super) scaffolding: ScaffoldingIndex,
    /// Entities laid out by the last pass of each scope.
    pub(super) applied: IndexMap<ScopeKey, IndexSet<NodeId>>,
    pub(super) bar_styles: HashMap<ScopeKey, BarStyle>,
    pub(super) restoring_scopes: HashSet<ScopeKey>,
    pub(super) host_restoring: bool,
    pub(super) constraints: DragConstraintState,
    pub(super) drag_sessions: HashMap<NodeId, ContainerDragSession>,
    pub(super) deferred: DeferredQueue,
}

impl TimelineSession {
    pub(super) fn is_restoring(&self, scope: &ScopeKey) -> bool {
        self.host_restoring || self.restoring_scopes.contains(scope)
    }

    pub(super) fn clear_scope(&mut self, scope: &ScopeKey) {
        self.baselines.remove(scope);
        self.scaffolding.remove_scope(scope);
        self.applied.shift_remove(scope);
        self.deferred.cancel_scope(scope);
    }
}

/// Internal engine state used by the public facade (`TimelineEngine`).
#[derive(Debug)]
pub(super) struct EngineCore {
    pub(super) config: TimelineEngineConfig,
    pub(super) graph: GraphModel,
    pub(super) session: TimelineSession,
}
