use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{NodeId, ScopeKey};
use crate::error::{TimelineError, TimelineResult};
use crate::interaction::{ConstraintDecision, ContainerDragSession, DragEvent, ScaffoldDragRecord};
use crate::render::Renderer;

use super::{LayoutRequest, TimelineEngine};

/// Result of consuming a container drag session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerReleaseOutcome {
    pub container: NodeId,
    pub dx: f64,
    pub dy: f64,
    pub moved: bool,
    /// Scopes whose baseline was shifted and re-laid out.
    pub refreshed_scopes: Vec<ScopeKey>,
}

impl<R: Renderer> TimelineEngine<R> {
    /// Applies the axis constraint to one pointer/position event of an entity.
    ///
    /// A locked entity whose x drifted from `locked_x` snaps back on x only.
    pub fn on_entity_event(&mut self, id: &NodeId, event: DragEvent) -> TimelineResult<ConstraintDecision> {
        let node = self.core.graph.require_mut(id)?;
        if node.is_container() {
            return Ok(ConstraintDecision::Unconstrained);
        }
        let decision = self
            .core
            .session
            .constraints
            .resolve(id, node.position.x, node.locked_x);
        if let ConstraintDecision::Snap { x } = decision {
            trace!(id = %id, event = ?event, from = node.position.x, to = x, "snap to locked x");
            node.position.x = x;
        }
        Ok(decision)
    }

    /// Lets the next constrained event of `id` keep its x.
    pub fn suppress_next_snap(&mut self, id: &NodeId) -> TimelineResult<()> {
        self.core.graph.require(id)?;
        self.core.session.constraints.suppress_once(id.clone());
        Ok(())
    }

    /// Starts a container drag: descendants lose their axis lock and the
    /// matching scaffolding is nested under the container.
    pub fn grab_container(&mut self, container: &NodeId) -> TimelineResult<()> {
        let node = self.core.graph.require(container)?;
        if !node.is_container() {
            return Err(TimelineError::NotAContainer(container.clone()));
        }
        let bounds_before = self.core.graph.container_bounds(container);
        let center_before = bounds_before.map_or(node.position, |bounds| bounds.center());
        let mut session = ContainerDragSession::new(container.clone(), bounds_before, center_before);

        let descendants = self.core.graph.descendants_of(container);
        for id in &descendants {
            if let Some(node) = self.core.graph.get_mut(id) {
                if node.is_temporal() {
                    node.locked_x = None;
                    session.unlocked_entities.push(id.clone());
                }
            }
        }

        let scopes = self.scopes_moving_with(container, &descendants);
        let index = &mut self.core.session.scaffolding;
        let matching: Vec<_> = index
            .elements()
            .filter(|element| {
                scopes.contains(&element.scope) || element.parent.as_ref() == Some(container)
            })
            .map(|element| element.id.clone())
            .collect();
        for id in matching {
            if let Some(element) = index.get_mut(&id) {
                session.scaffolding.push(ScaffoldDragRecord {
                    id,
                    position: element.position,
                    parent: element.parent.clone(),
                    locked: element.locked,
                });
                element.parent = Some(container.clone());
                element.locked = false;
            }
        }
        for scope in scopes {
            if self.core.session.baselines.get(&scope).is_some() {
                session.track_scope(scope);
            }
        }

        debug!(
            container = %container,
            unlocked = session.unlocked_entities.len(),
            scaffolding = session.scaffolding.len(),
            scopes = session.scopes.len(),
            "container grab"
        );
        if self
            .core
            .session
            .drag_sessions
            .insert(container.clone(), session)
            .is_some()
        {
            warn!(container = %container, "replacing unreleased container drag session");
        }
        Ok(())
    }

    /// Moves a grabbed container, its descendants and the nested scaffolding.
    pub fn drag_container(&mut self, container: &NodeId, dx: f64, dy: f64) -> TimelineResult<()> {
        if !self.core.session.drag_sessions.contains_key(container) {
            return Err(TimelineError::NoDragSession(container.clone()));
        }
        self.core.graph.translate_container(container, dx, dy)?;

        let index = &mut self.core.session.scaffolding;
        let nested: Vec<_> = index
            .elements()
            .filter(|element| element.parent.as_ref() == Some(container))
            .map(|element| element.id.clone())
            .collect();
        for id in nested {
            if let Some(element) = index.get_mut(&id) {
                element.position = element.position.translated(dx, dy);
            }
        }
        Ok(())
    }

    /// Ends a container drag: re-locks descendants at their new x and, when
    /// the container actually moved, carries scaffolding and baselines along.
    pub fn release_container(&mut self, container: &NodeId) -> TimelineResult<ContainerReleaseOutcome> {
        let session = self
            .core
            .session
            .drag_sessions
            .remove(container)
            .ok_or_else(|| TimelineError::NoDragSession(container.clone()))?;

        for id in self.core.graph.descendants_of(container) {
            if let Some(node) = self.core.graph.get_mut(&id) {
                if node.is_temporal() {
                    node.locked_x = Some(node.position.x);
                }
            }
        }

        let bounds_after = self.core.graph.container_bounds(container);
        let center_after = bounds_after.map_or_else(
            || {
                self.core
                    .graph
                    .get(container)
                    .map_or(session.center_before, |node| node.position)
            },
            |bounds| bounds.center(),
        );
        let moved = session.moved(bounds_after, center_after, self.core.config.bounds_tolerance);
        let (dx, dy) = session.offset_to(center_after);

        let index = &mut self.core.session.scaffolding;
        for record in &session.scaffolding {
            let Some(element) = index.get_mut(&record.id) else {
                continue;
            };
            if moved {
                element.position = record.position.translated(dx, dy);
            }
            element.parent.clone_from(&record.parent);
            element.locked = record.locked;
        }

        let mut refreshed_scopes = Vec::new();
        if moved {
            for scope in &session.scopes {
                self.core.session.baselines.shift(scope, dx, dy);
            }
            for scope in session.scopes {
                self.layout(LayoutRequest::for_scope(scope.clone()))?;
                refreshed_scopes.push(scope);
            }
        }

        debug!(container = %container, dx, dy, moved, "container release");
        Ok(ContainerReleaseOutcome {
            container: container.clone(),
            dx,
            dy,
            moved,
            refreshed_scopes,
        })
    }

    /// Scopes whose scaffolding travels with `container`: its own, those of
    /// nested containers, and root while it holds root participants.
    fn scopes_moving_with(&self, container: &NodeId, descendants: &[NodeId]) -> Vec<ScopeKey> {
        let graph = &self.core.graph;
        let applied = &self.core.session.applied;
        let mut scopes: Vec<ScopeKey> = Vec::new();
        let mut consider = |scope: &ScopeKey| {
            if !scopes.contains(scope) {
                scopes.push(scope.clone());
            }
        };

        for scope in applied.keys().chain(self.core.session.baselines.iter().map(|(scope, _)| scope)) {
            match scope {
                ScopeKey::Container(owner) if owner == container => consider(scope),
                ScopeKey::Container(owner) if graph.is_descendant_of(owner, container) => {
                    consider(scope);
                }
                ScopeKey::Root => {
                    let holds_root_participants = applied
                        .get(&ScopeKey::Root)
                        .is_some_and(|entities| descendants.iter().any(|id| entities.contains(id)));
                    if holds_root_participants {
                        consider(scope);
                    }
                }
                ScopeKey::Container(_) => {}
            }
        }
        scopes
    }
}
