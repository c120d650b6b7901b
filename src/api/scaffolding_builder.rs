use std::collections::HashSet;

use tracing::trace;

use crate::core::{
    BarGeometry, Baseline, Connector, ElementStyle, NodeId, Point, ScaffoldElement, ScaffoldId,
    ScaffoldKind, ScaffoldingIndex, ScopeKey, TickPlan,
};
use crate::render::Renderer;

use super::{BarStyle, BarStyleOverride, EntityPlacement, ScaffoldStyleConfig, TimelineEngine};

impl<R: Renderer> TimelineEngine<R> {
    /// Caller override over the scope's stored style (or the configured
    /// default); the result becomes the scope's stored style.
    pub(super) fn resolve_bar_style(
        &mut self,
        scope: &ScopeKey,
        style_override: Option<&BarStyleOverride>,
    ) -> BarStyle {
        let base = self
            .core
            .session
            .bar_styles
            .get(scope)
            .cloned()
            .unwrap_or_else(|| self.core.config.bar_style.clone());
        let resolved = match style_override {
            Some(style_override) => base.with_override(style_override),
            None => base,
        };
        self.core
            .session
            .bar_styles
            .insert(scope.clone(), resolved.clone());
        resolved
    }

    /// Brings the Bar, Anchors, Connectors and Ticks of `scope` in line with
    /// the current pass. Elements of other scopes are never touched.
    pub(super) fn build_scaffolding(
        &mut self,
        scope: &ScopeKey,
        baseline: &Baseline,
        bar_style: &BarStyle,
        placements: &[EntityPlacement],
        ticks: &TickPlan,
    ) {
        let style = &self.core.config.scaffold_style;
        let index = &mut self.core.session.scaffolding;

        upsert_bar(index, scope, baseline, bar_style);

        let participating: HashSet<&NodeId> = placements.iter().map(|placement| &placement.id).collect();
        for entity in index.anchored_entities(scope) {
            if !participating.contains(&entity) {
                trace!(scope = %scope, entity = %entity, "removing stale anchor");
                index.remove(&ScaffoldId::anchor(scope, &entity));
            }
        }
        for placement in placements {
            upsert_anchor(index, style, scope, &placement.id, Point::new(placement.x, baseline.center_y));
        }

        let tick_ids: HashSet<ScaffoldId> = ticks
            .ticks
            .iter()
            .map(|tick| ScaffoldId::tick(scope, tick.time))
            .collect();
        let stale_ticks: Vec<ScaffoldId> = index
            .elements_in_scope(scope)
            .filter(|element| matches!(element.kind, ScaffoldKind::Tick { .. }))
            .filter(|element| !tick_ids.contains(&element.id))
            .map(|element| element.id.clone())
            .collect();
        for id in &stale_ticks {
            index.remove(id);
        }
        for tick in &ticks.ticks {
            let id = ScaffoldId::tick(scope, tick.time);
            let (locked, parent) = carried_state(index, &id, true);
            index.upsert(ScaffoldElement {
                id,
                scope: scope.clone(),
                kind: ScaffoldKind::Tick {
                    time: tick.time,
                    label: tick.label.clone(),
                    endpoint: tick.endpoint,
                },
                position: Point::new(baseline.project(tick.time), baseline.center_y),
                style: ElementStyle {
                    color: style.tick_color,
                    class_name: style.tick_class.clone(),
                    visible: true,
                },
                locked,
                grabbable: false,
                selectable: false,
                parent,
            });
        }
    }
}

/// Lock and parent state survive updates of an existing element.
fn carried_state(index: &ScaffoldingIndex, id: &ScaffoldId, default_locked: bool) -> (bool, Option<NodeId>) {
    index
        .get(id)
        .map_or((default_locked, None), |element| (element.locked, element.parent.clone()))
}

fn upsert_bar(index: &mut ScaffoldingIndex, scope: &ScopeKey, baseline: &Baseline, bar_style: &BarStyle) {
    let id = ScaffoldId::bar(scope);
    let (locked, parent) = carried_state(index, &id, false);
    index.upsert(ScaffoldElement {
        id,
        scope: scope.clone(),
        kind: ScaffoldKind::Bar(BarGeometry {
            width: baseline.bar_length,
            height: bar_style.height,
        }),
        position: Point::new(
            baseline.bar_start + baseline.bar_length / 2.0,
            baseline.center_y,
        ),
        style: ElementStyle {
            color: bar_style.color,
            class_name: bar_style.class_name.clone(),
            visible: true,
        },
        locked,
        grabbable: false,
        selectable: true,
        parent,
    });
}

fn upsert_anchor(
    index: &mut ScaffoldingIndex,
    style: &ScaffoldStyleConfig,
    scope: &ScopeKey,
    entity: &NodeId,
    position: Point,
) {
    let id = ScaffoldId::anchor(scope, entity);
    let (locked, parent) = carried_state(index, &id, true);
    index.upsert(ScaffoldElement {
        id: id.clone(),
        scope: scope.clone(),
        kind: ScaffoldKind::Anchor {
            entity: entity.clone(),
        },
        position,
        style: ElementStyle {
            color: style.connector_color,
            class_name: style.anchor_class.clone(),
            visible: false,
        },
        locked,
        grabbable: false,
        selectable: false,
        parent,
    });
    index.upsert_connector(Connector {
        id: ScaffoldId::connector(scope, entity),
        scope: scope.clone(),
        anchor: id,
        target: entity.clone(),
        style: ElementStyle {
            color: style.connector_color,
            class_name: style.connector_class.clone(),
            visible: true,
        },
    });
}
