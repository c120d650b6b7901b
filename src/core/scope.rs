use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::graph::{GraphModel, NodeId};

/// Unit of timeline independence: the whole graph or one container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScopeKey {
    Root,
    Container(NodeId),
}

impl ScopeKey {
    #[must_use]
    pub fn container(id: impl Into<String>) -> Self {
        Self::Container(NodeId::new(id))
    }

    #[must_use]
    pub fn container_id(&self) -> Option<&NodeId> {
        match self {
            Self::Root => None,
            Self::Container(id) => Some(id),
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("root"),
            Self::Container(id) => write!(f, "container:{id}"),
        }
    }
}

/// Maps a layout invocation to its scope.
///
/// An explicit scope always wins. Otherwise the temporal entities of the set
/// must all share one container parent for that container to become the
/// scope; anything else resolves to `Root`.
#[must_use]
pub fn resolve_scope(explicit: Option<&ScopeKey>, entities: &[NodeId], graph: &GraphModel) -> ScopeKey {
    if let Some(scope) = explicit {
        return scope.clone();
    }

    let mut shared: Option<&NodeId> = None;
    let mut seen_any = false;
    for id in entities {
        let Some(node) = graph.get(id) else {
            continue;
        };
        if !node.is_temporal() {
            continue;
        }
        let parent = node
            .parent
            .as_ref()
            .filter(|parent| graph.get(parent).is_some_and(|p| p.is_container()));
        match (seen_any, shared, parent) {
            (false, _, Some(parent)) => shared = Some(parent),
            (false, _, None) => return ScopeKey::Root,
            (true, Some(current), Some(parent)) if current == parent => {}
            (true, _, _) => return ScopeKey::Root,
        }
        seen_any = true;
    }

    shared.map_or(ScopeKey::Root, |id| ScopeKey::Container(id.clone()))
}
