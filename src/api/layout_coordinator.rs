use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace, warn};

use crate::core::{
    Baseline, BoundingBox, NodeId, Point, RestoreFit, ScaffoldId, ScopeKey, bar_extent,
    extend_time_span, fit_restore_geometry, place_with_collisions, plan_ticks, resolve_scope,
    seed_geometry, seed_time_span,
};
use crate::error::TimelineResult;
use crate::render::Renderer;

use super::validation::validate_layout_request;
use super::{
    DeferredTaskKind, EntityPlacement, GeometrySource, LayoutMode, LayoutOutcome, LayoutRequest,
    TimelineEngine,
};

#[derive(Debug, Clone)]
struct Participant {
    instant: f64,
    position: Point,
    locked_x: Option<f64>,
    pinned: bool,
    previously_applied: bool,
}

/// Axis geometry chosen for one pass before entities are placed.
#[derive(Debug, Clone, Copy)]
struct BaselinePass {
    baseline: Baseline,
    source: GeometrySource,
    /// Grow the previously recorded bar instead of replacing it.
    union_bar: bool,
}

#[derive(Debug, Clone, Copy)]
struct RegionParams {
    region: BoundingBox,
    padding: f64,
    min_bar_width: f64,
    margin_ratio: f64,
}

impl<R: Renderer> TimelineEngine<R> {
    /// Places the temporal entities selected by `request` along their
    /// scope's axis and refreshes that scope's scaffolding.
    ///
    /// Returns `Ok(None)` when nothing participates; the scope is torn down.
    pub fn layout(&mut self, request: LayoutRequest) -> TimelineResult<Option<LayoutOutcome>> {
        validate_layout_request(&request)?;

        let scope = match &request.entities {
            Some(entities) => resolve_scope(request.scope.as_ref(), entities, &self.core.graph),
            None => request.scope.clone().unwrap_or(ScopeKey::Root),
        };
        let candidates = match &request.entities {
            Some(entities) => entities.clone(),
            None => self.default_participants(&scope),
        };
        let participants = self.collect_participants(&scope, &candidates);
        if participants.is_empty() {
            debug!(scope = %scope, "no temporal participants, tearing scope down");
            self.teardown_scope(&scope);
            return Ok(None);
        }

        let stored = self.core.session.baselines.get(&scope).copied();
        let mode = if request.force_rebuild {
            LayoutMode::ForcedRebuild
        } else if request.restoring || self.core.session.is_restoring(&scope) {
            LayoutMode::Restore
        } else if stored.is_some() {
            LayoutMode::Incremental
        } else {
            LayoutMode::FirstBuild
        };

        let preserved_overrides = if mode == LayoutMode::ForcedRebuild {
            let overrides = self.core.session.scaffolding.snapshot_overrides(&scope);
            self.core.session.clear_scope(&scope);
            overrides
        } else {
            Vec::new()
        };

        let container_bounds = self.scope_container_bounds(&scope);
        let params = RegionParams {
            region: container_bounds
                .or(request.bounds)
                .unwrap_or_else(|| self.core.graph.viewport_extent()),
            padding: request.padding.unwrap_or(self.core.config.padding),
            min_bar_width: request
                .min_bar_width
                .unwrap_or(self.core.config.min_bar_width),
            margin_ratio: self.core.config.time_margin_ratio,
        };

        let pass = match (mode, stored) {
            (LayoutMode::Incremental, Some(stored)) => incremental_pass(
                stored,
                &participants,
                params,
                container_bounds,
                self.core.config.bounds_tolerance,
            ),
            (LayoutMode::Restore, stored) => restore_pass(stored, &participants, params),
            _ => seed_pass(&participants, params),
        };

        let placements = self.place_participants(mode, &pass, &participants);
        let mut baseline = pass.baseline;
        let max_offset = placements
            .iter()
            .map(|placement| placement.offset.abs())
            .fold(0.0_f64, f64::max);
        let (bar_start, bar_length) = bar_extent(
            baseline.start_x,
            baseline.width,
            max_offset,
            placements.iter().map(|placement| placement.x),
            self.core.config.bar_margin,
        );
        if pass.union_bar {
            baseline.union_bar_extent(bar_start, bar_start + bar_length);
            baseline.max_offset = baseline.max_offset.max(max_offset);
        } else {
            baseline.bar_start = bar_start;
            baseline.bar_length = bar_length;
            baseline.max_offset = max_offset;
        }

        for placement in &placements {
            let node = self.core.graph.require_mut(&placement.id)?;
            node.position = Point::new(placement.x, placement.y);
            node.locked_x = Some(placement.x);
        }
        baseline.container_bounds = self.scope_container_bounds(&scope);

        let ticks = plan_ticks(baseline.min_time, baseline.max_time);
        self.core.session.baselines.insert(scope.clone(), baseline);
        self.core.session.applied.insert(
            scope.clone(),
            placements
                .iter()
                .map(|placement| placement.id.clone())
                .collect::<IndexSet<_>>(),
        );

        let bar_style = self.resolve_bar_style(&scope, request.bar_style.as_ref());
        self.build_scaffolding(&scope, &baseline, &bar_style, &placements, &ticks);
        if mode == LayoutMode::ForcedRebuild {
            self.core
                .session
                .scaffolding
                .restore_overrides(preserved_overrides);
        }
        if mode == LayoutMode::Restore {
            self.lock_bar_until_restored(&scope);
        }

        debug!(
            scope = %scope,
            mode = ?mode,
            geometry = ?pass.source,
            participants = placements.len(),
            start_x = baseline.start_x,
            width = baseline.width,
            ticks = ticks.ticks.len(),
            "timeline layout pass"
        );

        Ok(Some(LayoutOutcome {
            scope,
            mode,
            geometry: pass.source,
            placements,
            baseline,
            ticks,
        }))
    }

    /// Temporal entities a request without an explicit subset lays out.
    fn default_participants(&self, scope: &ScopeKey) -> Vec<NodeId> {
        let graph = &self.core.graph;
        match scope {
            ScopeKey::Root => {
                let session = &self.core.session;
                // Containers known from a stored baseline or a pending restore
                // claim their descendants until their own pass records them.
                let pending: Vec<&NodeId> = session
                    .baselines
                    .iter()
                    .map(|(scope, _)| scope)
                    .chain(session.restoring_scopes.iter())
                    .filter(|scope| !session.applied.contains_key(*scope))
                    .filter_map(|scope| scope.container_id())
                    .collect();
                let claimed = |id: &NodeId| {
                    session
                        .applied
                        .iter()
                        .any(|(owner, entities)| !owner.is_root() && entities.contains(id))
                        || pending
                            .iter()
                            .any(|container| graph.is_descendant_of(id, container))
                };
                graph
                    .nodes()
                    .filter(|node| node.is_temporal() && !claimed(&node.id))
                    .map(|node| node.id.clone())
                    .collect()
            }
            ScopeKey::Container(container) => graph
                .descendants_of(container)
                .into_iter()
                .filter(|id| graph.get(id).is_some_and(|node| node.is_temporal()))
                .collect(),
        }
    }

    fn collect_participants(
        &self,
        scope: &ScopeKey,
        candidates: &[NodeId],
    ) -> IndexMap<NodeId, Participant> {
        let applied = self.core.session.applied.get(scope);
        let mut participants = IndexMap::with_capacity(candidates.len());
        for id in candidates {
            let Some(node) = self.core.graph.get(id) else {
                trace!(id = %id, "skipping unknown layout candidate");
                continue;
            };
            if !node.is_temporal() {
                continue;
            }
            participants.entry(id.clone()).or_insert_with(|| Participant {
                instant: node.instant(),
                position: node.position,
                locked_x: node.numeric_locked_x(),
                pinned: node.pinned,
                previously_applied: applied.is_some_and(|entities| entities.contains(id)),
            });
        }
        participants
    }

    fn scope_container_bounds(&self, scope: &ScopeKey) -> Option<BoundingBox> {
        scope
            .container_id()
            .and_then(|container| self.core.graph.container_bounds(container))
    }

    fn place_participants(
        &self,
        mode: LayoutMode,
        pass: &BaselinePass,
        participants: &IndexMap<NodeId, Participant>,
    ) -> Vec<EntityPlacement> {
        let items: Vec<(NodeId, f64)> = participants
            .iter()
            .map(|(id, participant)| (id.clone(), participant.instant))
            .collect();
        let (projected, _) =
            place_with_collisions(&items, &pass.baseline, self.core.config.collision_step);

        let keep_locked = matches!(pass.source, GeometrySource::Fitted);
        let reset_y = matches!(mode, LayoutMode::FirstBuild | LayoutMode::ForcedRebuild);
        let entity_y = pass.baseline.center_y - self.core.config.entity_offset_y;

        projected
            .into_iter()
            .filter_map(|placement| {
                let participant = participants.get(&placement.id)?;
                let (x, offset) = match (participant.pinned, keep_locked, participant.locked_x) {
                    (true, _, _) => (participant.position.x, 0.0),
                    (false, true, Some(locked_x)) => (locked_x, 0.0),
                    _ => (placement.x(), placement.offset),
                };
                let assign_y = !participant.pinned
                    && (reset_y
                        || (!participant.previously_applied && participant.locked_x.is_none()));
                let y = if assign_y {
                    entity_y
                } else {
                    participant.position.y
                };
                Some(EntityPlacement {
                    id: placement.id,
                    x,
                    y,
                    offset,
                    pinned: participant.pinned,
                })
            })
            .collect()
    }

    /// Locks the scope's Bar and (re)schedules its unlock retry.
    fn lock_bar_until_restored(&mut self, scope: &ScopeKey) {
        let session = &mut self.core.session;
        if let Some(bar) = session.scaffolding.get_mut(&ScaffoldId::bar(scope)) {
            bar.locked = true;
        }
        session.deferred.cancel_scope(scope);
        session.deferred.schedule(
            scope.clone(),
            self.core.config.unlock_retry_interval_ms,
            DeferredTaskKind::BarUnlockRetry {
                attempts_remaining: self.core.config.unlock_retry_max_attempts,
            },
        );
    }
}

fn seed_pass(participants: &IndexMap<NodeId, Participant>, params: RegionParams) -> BaselinePass {
    let span = seed_time_span(
        participants.values().map(|participant| participant.instant),
        params.margin_ratio,
    );
    let geometry = seed_geometry(params.region, params.padding, params.min_bar_width);
    BaselinePass {
        baseline: Baseline::from_parts(span, geometry),
        source: GeometrySource::Seeded,
        union_bar: false,
    }
}

fn incremental_pass(
    stored: Baseline,
    participants: &IndexMap<NodeId, Participant>,
    params: RegionParams,
    container_bounds: Option<BoundingBox>,
    tolerance: f64,
) -> BaselinePass {
    let mut baseline = stored;
    baseline.set_time_span(extend_time_span(
        stored.time_span(),
        participants.values().map(|participant| participant.instant),
        params.margin_ratio,
    ));

    match (stored.container_bounds, container_bounds) {
        (Some(previous), Some(current)) if current.resized_from(previous, tolerance) => {
            let geometry = seed_geometry(current, params.padding, params.min_bar_width);
            baseline.start_x = geometry.start_x;
            baseline.width = geometry.width;
            baseline.center_y = geometry.center_y;
            baseline.restored = false;
            BaselinePass {
                baseline,
                source: GeometrySource::Recomputed,
                union_bar: true,
            }
        }
        (Some(previous), Some(current)) if current.differs_from(previous, tolerance) => {
            let (dx, dy) = (current.x1 - previous.x1, current.y1 - previous.y1);
            baseline.shift(dx, dy);
            BaselinePass {
                baseline,
                source: GeometrySource::Shifted { dx, dy },
                union_bar: true,
            }
        }
        _ => BaselinePass {
            baseline,
            source: GeometrySource::Reused,
            union_bar: true,
        },
    }
}

fn restore_pass(
    stored: Option<Baseline>,
    participants: &IndexMap<NodeId, Participant>,
    params: RegionParams,
) -> BaselinePass {
    let seeded = seed_geometry(params.region, params.padding, params.min_bar_width);
    let span = stored.map_or_else(
        || {
            seed_time_span(
                participants.values().map(|participant| participant.instant),
                params.margin_ratio,
            )
        },
        |baseline| baseline.time_span(),
    );
    let reference_width = stored.map_or(seeded.width, |baseline| baseline.width);
    let center_y = stored.map_or(seeded.center_y, |baseline| baseline.center_y);

    let samples: Vec<(f64, f64)> = participants
        .values()
        .filter(|participant| !participant.pinned && participant.instant.is_finite())
        .filter_map(|participant| {
            participant
                .locked_x
                .map(|x| ((participant.instant - span.min_time) / span.range, x))
        })
        .collect();

    match fit_restore_geometry(&samples, reference_width) {
        RestoreFit::Fitted { start_x, width } => {
            let mut baseline = Baseline::from_parts(span, seeded);
            baseline.start_x = start_x;
            baseline.width = width;
            baseline.center_y = center_y;
            baseline.restored = true;
            BaselinePass {
                baseline,
                source: GeometrySource::Fitted,
                union_bar: false,
            }
        }
        RestoreFit::Insufficient => {
            debug!("no restorable coordinates, seeding axis");
            seed_pass(participants, params)
        }
        RestoreFit::NonMonotonic { slope } => {
            warn!(slope, samples = samples.len(), "restore fit is not increasing, seeding axis");
            seed_pass(participants, params)
        }
    }
}
