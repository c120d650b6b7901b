use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::timestamp::{RawTimestamp, parse_timestamp};
use crate::core::types::{BoundingBox, Point};
use crate::error::{TimelineError, TimelineResult};

/// Half extent used when deriving container bounds from child positions.
const DEFAULT_NODE_HALF_EXTENT: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Entity,
    Container,
}

/// Graph node as seen by the timeline engine.
///
/// `cluster`, `node_type` and `group` are carried for sibling layouts and
/// never read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub position: Point,
    #[serde(default, alias = "time")]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default)]
    pub locked_x: Option<f64>,
    #[serde(default)]
    pub pinned: bool,
    /// Host-supplied bounding box for containers.
    #[serde(default)]
    pub bounds: Option<BoundingBox>,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

impl Node {
    #[must_use]
    pub fn entity(id: impl Into<String>, position: Point) -> Self {
        Self {
            id: NodeId::new(id),
            kind: NodeKind::Entity,
            parent: None,
            position,
            timestamp: None,
            locked_x: None,
            pinned: false,
            bounds: None,
            cluster: None,
            node_type: None,
            group: None,
        }
    }

    #[must_use]
    pub fn container(id: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Container,
            ..Self::entity(id, Point::default())
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<RawTimestamp>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(NodeId::new(parent));
        self
    }

    #[must_use]
    pub fn with_locked_x(mut self, locked_x: f64) -> Self {
        self.locked_x = Some(locked_x);
        self
    }

    #[must_use]
    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.position = bounds.center();
        self.bounds = Some(bounds);
        self
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.kind == NodeKind::Container
    }

    /// Entities with a timestamp attribute, parseable or not.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        self.kind == NodeKind::Entity && self.timestamp.is_some()
    }

    /// Parsed instant in epoch millis, `NaN` when absent or malformed.
    #[must_use]
    pub fn instant(&self) -> f64 {
        self.timestamp.as_ref().map_or(f64::NAN, parse_timestamp)
    }

    #[must_use]
    pub fn numeric_locked_x(&self) -> Option<f64> {
        self.locked_x.filter(|value| value.is_finite())
    }
}

/// In-memory node store and viewport extent supplied by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphModel {
    nodes: IndexMap<NodeId, Node>,
    viewport_extent: BoundingBox,
}

impl GraphModel {
    #[must_use]
    pub fn new(viewport_extent: BoundingBox) -> Self {
        Self {
            nodes: IndexMap::new(),
            viewport_extent,
        }
    }

    #[must_use]
    pub fn viewport_extent(&self) -> BoundingBox {
        self.viewport_extent
    }

    pub fn set_viewport_extent(&mut self, extent: BoundingBox) {
        self.viewport_extent = extent;
    }

    /// Inserts or replaces a node.
    pub fn insert(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.id.clone(), node)
    }

    pub fn remove(&mut self, id: &NodeId) -> Option<Node> {
        self.nodes.shift_remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn require(&self, id: &NodeId) -> TimelineResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| TimelineError::UnknownNode(id.clone()))
    }

    pub fn require_mut(&mut self, id: &NodeId) -> TimelineResult<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| TimelineError::UnknownNode(id.clone()))
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_position(&mut self, id: &NodeId, position: Point) -> TimelineResult<()> {
        let node = self.require_mut(id)?;
        node.position = position;
        Ok(())
    }

    /// Walks the parent chain; a cycle in host data terminates the walk.
    #[must_use]
    pub fn is_descendant_of(&self, id: &NodeId, ancestor: &NodeId) -> bool {
        let mut current = self.nodes.get(id).and_then(|node| node.parent.as_ref());
        let mut hops = 0;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.nodes.len() {
                return false;
            }
            current = self.nodes.get(parent).and_then(|node| node.parent.as_ref());
        }
        false
    }

    #[must_use]
    pub fn descendants_of(&self, ancestor: &NodeId) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|id| self.is_descendant_of(id, ancestor))
            .cloned()
            .collect()
    }

    /// Explicit container bounds, else the extent of its descendant entities.
    #[must_use]
    pub fn container_bounds(&self, id: &NodeId) -> Option<BoundingBox> {
        let node = self.nodes.get(id)?;
        if !node.is_container() {
            return None;
        }
        if let Some(bounds) = node.bounds {
            return Some(bounds);
        }

        let mut derived: Option<BoundingBox> = None;
        for child in self.nodes.values() {
            if child.is_container()
                || !child.position.is_finite()
                || !self.is_descendant_of(&child.id, id)
            {
                continue;
            }
            let half = DEFAULT_NODE_HALF_EXTENT;
            derived = Some(match derived {
                Some(bounds) => bounds.expanded_to_include(child.position, half),
                None => BoundingBox {
                    x1: child.position.x - half,
                    y1: child.position.y - half,
                    x2: child.position.x + half,
                    y2: child.position.y + half,
                },
            });
        }
        derived
    }

    /// Translates a container together with all of its descendants.
    pub fn translate_container(&mut self, id: &NodeId, dx: f64, dy: f64) -> TimelineResult<()> {
        let container = self.require(id)?;
        if !container.is_container() {
            return Err(TimelineError::NotAContainer(id.clone()));
        }

        for descendant in self.descendants_of(id) {
            if let Some(node) = self.nodes.get_mut(&descendant) {
                node.position = node.position.translated(dx, dy);
                node.bounds = node.bounds.map(|bounds| bounds.translated(dx, dy));
            }
        }
        let container = self.require_mut(id)?;
        container.position = container.position.translated(dx, dy);
        container.bounds = container.bounds.map(|bounds| bounds.translated(dx, dy));
        Ok(())
    }
}
