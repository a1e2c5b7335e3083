//! Path segments: the ways a route travels along.

use crate::identifiers::*;
use crate::models::types::Tags;

/// Values of the `junction` key that mark a closed junction loop.
pub const CLOSED_JUNCTIONS: &[&str] = &["roundabout", "circular"];

/// How a segment may join its neighbours, decided once at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    /// Joins at its first or last node.
    Ordinary,
    /// Closed junction loop, joins at any of its nodes.
    Ring,
}

/// One way of a route, as an ordered chain of node ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSegment {
    id: WayId,
    nodes: Vec<NodeId>,
    is_roundabout: bool,
    kind: SegmentKind,
}

impl PathSegment {
    /// Build a segment. A closed way becomes a [`SegmentKind::Ring`] only when
    /// it is also classified as a closed junction.
    pub fn new(id: WayId, nodes: Vec<NodeId>, is_roundabout: bool) -> Result<Self> {
        if nodes.is_empty() {
            return Err(ModelError::EmptySegment(id));
        }

        let is_loop = nodes.first() == nodes.last();
        let kind = if is_loop && is_roundabout && nodes.len() > 1 {
            SegmentKind::Ring
        } else {
            SegmentKind::Ordinary
        };

        Ok(Self {
            id,
            nodes,
            is_roundabout,
            kind,
        })
    }

    /// Build a segment from raw way data, classifying it from its `junction` tag.
    pub fn from_tags(id: WayId, nodes: Vec<NodeId>, tags: &Tags) -> Result<Self> {
        Self::new(id, nodes, is_closed_junction(tags))
    }

    pub fn id(&self) -> WayId {
        self.id
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn first_node(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn last_node(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// True when the first and last node are the same.
    pub fn is_loop(&self) -> bool {
        self.first_node() == self.last_node()
    }

    pub fn is_roundabout(&self) -> bool {
        self.is_roundabout
    }
}

/// Check if tags classify a way as a closed junction loop
pub fn is_closed_junction(tags: &Tags) -> bool {
    tags.get("junction")
        .map(|v| CLOSED_JUNCTIONS.contains(&v.as_str()))
        .unwrap_or(false)
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Way {0} has no nodes")]
    EmptySegment(WayId),
}

pub type Result<T> = std::result::Result<T, ModelError>;
