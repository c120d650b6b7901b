//! Scaffolding elements (bar, anchors, ticks) and their connectors.
//!
//! Ids are deterministic per scope and role so an element recreated by a
//! rebuild keeps the identity external editors attached overrides to.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::graph::NodeId;
use crate::core::scope::ScopeKey;
use crate::core::types::Point;
use crate::render::Color;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScaffoldId(String);

impl ScaffoldId {
    #[must_use]
    pub fn bar(scope: &ScopeKey) -> Self {
        Self(format!("timeline-bar:{scope}"))
    }

    #[must_use]
    pub fn anchor(scope: &ScopeKey, entity: &NodeId) -> Self {
        Self(format!("timeline-anchor:{scope}:{entity}"))
    }

    #[must_use]
    pub fn tick(scope: &ScopeKey, time: f64) -> Self {
        Self(format!("timeline-tick:{scope}:{}", time.round() as i64))
    }

    #[must_use]
    pub fn connector(scope: &ScopeKey, entity: &NodeId) -> Self {
        Self(format!("timeline-connector:{scope}:{entity}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScaffoldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bar size; the element position is the bar center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScaffoldKind {
    Bar(BarGeometry),
    Anchor { entity: NodeId },
    Tick { time: f64, label: String, endpoint: bool },
}

impl ScaffoldKind {
    #[must_use]
    pub fn is_bar(&self) -> bool {
        matches!(self, Self::Bar(_))
    }

    #[must_use]
    pub fn anchored_entity(&self) -> Option<&NodeId> {
        match self {
            Self::Anchor { entity } => Some(entity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub color: Color,
    pub class_name: String,
    pub visible: bool,
}

/// Partial style edit applied by an external editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePatch {
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub class_name: Option<String>,
}

impl StylePatch {
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Later patch fields win.
    #[must_use]
    pub fn merged(mut self, newer: &StylePatch) -> Self {
        if newer.color.is_some() {
            self.color = newer.color;
        }
        if newer.class_name.is_some() {
            self.class_name.clone_from(&newer.class_name);
        }
        self
    }

    pub fn apply_to(&self, style: &mut ElementStyle) {
        if let Some(color) = self.color {
            style.color = color;
        }
        if let Some(class_name) = &self.class_name {
            style.class_name.clone_from(class_name);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldElement {
    pub id: ScaffoldId,
    pub scope: ScopeKey,
    pub kind: ScaffoldKind,
    pub position: Point,
    pub style: ElementStyle,
    pub locked: bool,
    pub grabbable: bool,
    pub selectable: bool,
    /// Container the element is temporarily nested under during a drag.
    #[serde(default)]
    pub parent: Option<NodeId>,
}

/// Directed visual link from an anchor to its entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub id: ScaffoldId,
    pub scope: ScopeKey,
    pub anchor: ScaffoldId,
    pub target: NodeId,
    pub style: ElementStyle,
}

/// Scope-tagged store of scaffolding with lookups by scope and by entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaffoldingIndex {
    elements: IndexMap<ScaffoldId, ScaffoldElement>,
    connectors: IndexMap<ScaffoldId, Connector>,
    anchors_by_entity: HashMap<(ScopeKey, NodeId), ScaffoldId>,
    overrides: HashMap<ScaffoldId, StylePatch>,
}

impl ScaffoldingIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &ScaffoldId) -> Option<&ScaffoldElement> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &ScaffoldId) -> Option<&mut ScaffoldElement> {
        self.elements.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ScaffoldId) -> bool {
        self.elements.contains_key(id) || self.connectors.contains_key(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &ScaffoldElement> {
        self.elements.values()
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.values()
    }

    #[must_use]
    pub fn connector(&self, id: &ScaffoldId) -> Option<&Connector> {
        self.connectors.get(id)
    }

    pub fn elements_in_scope<'a>(
        &'a self,
        scope: &'a ScopeKey,
    ) -> impl Iterator<Item = &'a ScaffoldElement> + 'a {
        self.elements
            .values()
            .filter(move |element| &element.scope == scope)
    }

    pub fn connectors_in_scope<'a>(
        &'a self,
        scope: &'a ScopeKey,
    ) -> impl Iterator<Item = &'a Connector> + 'a {
        self.connectors
            .values()
            .filter(move |connector| &connector.scope == scope)
    }

    #[must_use]
    pub fn bar(&self, scope: &ScopeKey) -> Option<&ScaffoldElement> {
        self.elements.get(&ScaffoldId::bar(scope))
    }

    #[must_use]
    pub fn anchor_for(&self, scope: &ScopeKey, entity: &NodeId) -> Option<&ScaffoldElement> {
        self.anchors_by_entity
            .get(&(scope.clone(), entity.clone()))
            .and_then(|id| self.elements.get(id))
    }

    /// Entities currently anchored in `scope`.
    #[must_use]
    pub fn anchored_entities(&self, scope: &ScopeKey) -> SmallVec<[NodeId; 8]> {
        self.elements_in_scope(scope)
            .filter_map(|element| element.kind.anchored_entity().cloned())
            .collect()
    }

    /// Scope whose anchor currently targets `entity`, if any.
    #[must_use]
    pub fn scope_anchoring(&self, entity: &NodeId) -> Option<&ScopeKey> {
        self.anchors_by_entity
            .keys()
            .find(|(_, anchored)| anchored == entity)
            .map(|(scope, _)| scope)
    }

    /// Inserts or replaces an element; any recorded override is reapplied.
    pub fn upsert(&mut self, mut element: ScaffoldElement) {
        if let Some(patch) = self.overrides.get(&element.id) {
            if !element.kind.is_bar() {
                patch.apply_to(&mut element.style);
            }
        }
        if let ScaffoldKind::Anchor { entity } = &element.kind {
            self.anchors_by_entity
                .insert((element.scope.clone(), entity.clone()), element.id.clone());
        }
        self.elements.insert(element.id.clone(), element);
    }

    pub fn upsert_connector(&mut self, mut connector: Connector) {
        if let Some(patch) = self.overrides.get(&connector.id) {
            patch.apply_to(&mut connector.style);
        }
        self.connectors.insert(connector.id.clone(), connector);
    }

    /// Removes an element together with connectors sourced at it and the
    /// overrides recorded for either.
    pub fn remove(&mut self, id: &ScaffoldId) -> Option<ScaffoldElement> {
        let removed = self.elements.shift_remove(id)?;
        if let ScaffoldKind::Anchor { entity } = &removed.kind {
            self.anchors_by_entity
                .remove(&(removed.scope.clone(), entity.clone()));
        }
        self.overrides.remove(id);
        let overrides = &mut self.overrides;
        self.connectors.retain(|connector_id, connector| {
            let keep = &connector.anchor != id;
            if !keep {
                overrides.remove(connector_id);
            }
            keep
        });
        Some(removed)
    }

    /// Records an editor override and applies it to the live element.
    ///
    /// Returns `false` when `id` names no element or connector.
    pub fn apply_override(&mut self, id: &ScaffoldId, patch: StylePatch) -> bool {
        if let Some(element) = self.elements.get_mut(id) {
            patch.apply_to(&mut element.style);
        } else if let Some(connector) = self.connectors.get_mut(id) {
            patch.apply_to(&mut connector.style);
        } else {
            return false;
        }
        let merged = self
            .overrides
            .remove(id)
            .unwrap_or_default()
            .merged(&patch);
        self.overrides.insert(id.clone(), merged);
        true
    }

    /// Overrides recorded for elements and connectors of `scope`.
    #[must_use]
    pub fn snapshot_overrides(&self, scope: &ScopeKey) -> Vec<(ScaffoldId, StylePatch)> {
        self.overrides
            .iter()
            .filter(|(id, _)| {
                self.elements.get(*id).map(|element| &element.scope) == Some(scope)
                    || self.connectors.get(*id).map(|connector| &connector.scope) == Some(scope)
            })
            .map(|(id, patch)| (id.clone(), patch.clone()))
            .collect()
    }

    /// Re-registers overrides captured by `snapshot_overrides`.
    pub fn restore_overrides(&mut self, snapshot: Vec<(ScaffoldId, StylePatch)>) {
        for (id, patch) in snapshot {
            if let Some(element) = self.elements.get_mut(&id) {
                if !element.kind.is_bar() {
                    patch.apply_to(&mut element.style);
                }
            } else if let Some(connector) = self.connectors.get_mut(&id) {
                patch.apply_to(&mut connector.style);
            }
            self.overrides.insert(id, patch);
        }
    }

    /// Drops every element, connector and override of `scope`.
    pub fn remove_scope(&mut self, scope: &ScopeKey) -> usize {
        let ids: Vec<ScaffoldId> = self
            .elements_in_scope(scope)
            .map(|element| element.id.clone())
            .chain(self.connectors_in_scope(scope).map(|connector| connector.id.clone()))
            .collect();
        for id in &ids {
            self.overrides.remove(id);
        }
        let before = self.elements.len() + self.connectors.len();
        self.elements.retain(|_, element| &element.scope != scope);
        self.connectors.retain(|_, connector| &connector.scope != scope);
        self.anchors_by_entity.retain(|(owner, _), _| owner != scope);
        before - self.elements.len() - self.connectors.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
