use tracing::{debug, trace, warn};

use crate::core::{
    Baseline, BoundingBox, GraphModel, Node, NodeId, ScaffoldElement, ScaffoldId,
    ScaffoldingIndex, ScopeKey, StylePatch,
};
use crate::error::{TimelineError, TimelineResult};
use crate::render::Renderer;

use super::engine_core::{EngineCore, TimelineSession};
use super::{DeferredTaskKind, LayoutOutcome, LayoutRequest, TimelineEngineConfig};

/// Main orchestration facade consumed by host applications.
///
/// `TimelineEngine` owns the graph model, the scope-keyed timeline state
/// (baselines, scaffolding, applied registry, pending retries) and the
/// renderer that scaffolding frames are handed to.
pub struct TimelineEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) core: EngineCore,
}

impl<R: Renderer> TimelineEngine<R> {
    pub fn new(
        renderer: R,
        config: TimelineEngineConfig,
        viewport_extent: BoundingBox,
    ) -> TimelineResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            renderer,
            core: EngineCore {
                config,
                graph: GraphModel::new(viewport_extent),
                session: TimelineSession::default(),
            },
        })
    }

    #[must_use]
    pub fn config(&self) -> &TimelineEngineConfig {
        &self.core.config
    }

    #[must_use]
    pub fn graph(&self) -> &GraphModel {
        &self.core.graph
    }

    /// Direct graph access for host-driven edits (positions, bounds).
    pub fn graph_mut(&mut self) -> &mut GraphModel {
        &mut self.core.graph
    }

    pub fn insert_node(&mut self, node: Node) {
        trace!(id = %node.id, "insert node");
        self.core.graph.insert(node);
    }

    /// Removes a node and any anchor/connector targeting it.
    pub fn remove_node(&mut self, id: &NodeId) -> TimelineResult<Node> {
        let removed = self
            .core
            .graph
            .remove(id)
            .ok_or_else(|| TimelineError::UnknownNode(id.clone()))?;

        let session = &mut self.core.session;
        for (scope, entities) in &mut session.applied {
            if entities.shift_remove(id) {
                session.scaffolding.remove(&ScaffoldId::anchor(scope, id));
            }
        }
        session.constraints.clear(id);
        debug!(id = %id, "removed node");
        Ok(removed)
    }

    pub fn set_viewport_extent(&mut self, extent: BoundingBox) {
        self.core.graph.set_viewport_extent(extent);
    }

    #[must_use]
    pub fn baseline(&self, scope: &ScopeKey) -> Option<&Baseline> {
        self.core.session.baselines.get(scope)
    }

    #[must_use]
    pub fn scaffolding(&self) -> &ScaffoldingIndex {
        &self.core.session.scaffolding
    }

    #[must_use]
    pub fn scaffold(&self, id: &ScaffoldId) -> Option<&ScaffoldElement> {
        self.core.session.scaffolding.get(id)
    }

    /// Entities laid out by the most recent pass of `scope`.
    #[must_use]
    pub fn participants(&self, scope: &ScopeKey) -> Vec<NodeId> {
        self.core
            .session
            .applied
            .get(scope)
            .map(|entities| entities.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Applies an external editor's style edit to a scaffolding element.
    ///
    /// The edit is remembered and reapplied across rebuilds, except for the
    /// Bar whose color and class always come from the bar style.
    pub fn apply_scaffold_style(&mut self, id: &ScaffoldId, patch: StylePatch) -> TimelineResult<()> {
        if self.core.session.scaffolding.apply_override(id, patch) {
            trace!(id = %id, "scaffold style override");
            Ok(())
        } else {
            Err(TimelineError::UnknownScaffold(id.clone()))
        }
    }

    /// Removes every trace of `scope`: baseline, scaffolding, applied flags,
    /// stored bar style and pending retries.
    pub fn teardown_scope(&mut self, scope: &ScopeKey) {
        let session = &mut self.core.session;
        session.clear_scope(scope);
        session.bar_styles.remove(scope);
        session.restoring_scopes.remove(scope);
        debug!(scope = %scope, "timeline scope torn down");
    }

    /// Host-level "is currently restoring" flag.
    pub fn set_host_restoring(&mut self, restoring: bool) {
        self.core.session.host_restoring = restoring;
    }

    /// Marks `scope` as restoring; must precede loading its saved data.
    pub fn begin_restore(&mut self, scope: ScopeKey) {
        debug!(scope = %scope, "begin restore");
        self.core.session.restoring_scopes.insert(scope);
    }

    /// Runs the post-restore pass for `scope`, then clears its flag.
    pub fn finish_restore(&mut self, scope: &ScopeKey) -> TimelineResult<Option<LayoutOutcome>> {
        let outcome = if self.core.session.restoring_scopes.contains(scope) {
            self.layout(LayoutRequest::for_scope(scope.clone()).restoring(true))?
        } else {
            None
        };
        self.core.session.restoring_scopes.remove(scope);
        debug!(scope = %scope, "finish restore");
        Ok(outcome)
    }

    #[must_use]
    pub fn is_restoring(&self, scope: &ScopeKey) -> bool {
        self.core.session.is_restoring(scope)
    }

    #[must_use]
    pub fn pending_tasks(&self, scope: &ScopeKey) -> usize {
        self.core.session.deferred.pending_for(scope)
    }

    /// Runs deferred tasks due at `now_ms`; returns the number of Bars unlocked.
    pub fn run_deferred(&mut self, now_ms: u64) -> usize {
        let due = self.core.session.deferred.take_due(now_ms);
        let mut unlocked = 0;
        for task in due {
            match task.kind {
                DeferredTaskKind::BarUnlockRetry { attempts_remaining } => {
                    let session = &mut self.core.session;
                    if session.is_restoring(&task.scope) {
                        if attempts_remaining > 1 {
                            session.deferred.schedule(
                                task.scope.clone(),
                                self.core.config.unlock_retry_interval_ms,
                                DeferredTaskKind::BarUnlockRetry {
                                    attempts_remaining: attempts_remaining - 1,
                                },
                            );
                            trace!(scope = %task.scope, attempts_remaining, "bar unlock deferred");
                            continue;
                        }
                        warn!(scope = %task.scope, "restore still pending, unlocking bar anyway");
                    }
                    if let Some(bar) = session.scaffolding.get_mut(&ScaffoldId::bar(&task.scope)) {
                        bar.locked = false;
                        unlocked += 1;
                        debug!(scope = %task.scope, "bar unlocked after restore");
                    }
                }
            }
        }
        unlocked
    }

    pub fn render(&mut self) -> TimelineResult<()> {
        let frame = self.build_render_frame();
        self.renderer.render(&frame)
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
