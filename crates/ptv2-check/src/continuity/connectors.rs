//! Nodes at which a segment may join its neighbours.

use hashbrown::HashSet;

use crate::identifiers::NodeId;
use crate::models::{PathSegment, SegmentKind};

/// Rings longer than this are hashed before intersecting two of them.
const RING_HASH_THRESHOLD: usize = 32;

/// Connector set of one segment, borrowed from the segment's node list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorSet<'a> {
    /// First and last node of an ordinary segment. Both are the same node for
    /// a closed way without junction classification.
    Endpoints(NodeId, NodeId),
    /// Every node of a ring, without the closing duplicate.
    Ring(&'a [NodeId]),
}

impl<'a> ConnectorSet<'a> {
    pub fn of(segment: &'a PathSegment) -> Self {
        match segment.kind() {
            SegmentKind::Ordinary => Self::Endpoints(segment.first_node(), segment.last_node()),
            SegmentKind::Ring => {
                let nodes = segment.nodes();
                Self::Ring(&nodes[..nodes.len() - 1])
            }
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        match self {
            Self::Endpoints(first, last) => *first == node || *last == node,
            Self::Ring(nodes) => nodes.contains(&node),
        }
    }

    /// True when both sets share at least one node.
    pub fn intersects(&self, other: &ConnectorSet<'_>) -> bool {
        match (self, other) {
            (Self::Endpoints(first, last), _) => other.contains(*first) || other.contains(*last),
            (Self::Ring(_), ConnectorSet::Endpoints(..)) => other.intersects(self),
            (Self::Ring(a), ConnectorSet::Ring(b)) => {
                let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
                if large.len() > RING_HASH_THRESHOLD {
                    let lookup: HashSet<NodeId> = large.iter().copied().collect();
                    small.iter().any(|n| lookup.contains(n))
                } else {
                    small.iter().any(|n| large.contains(n))
                }
            }
        }
    }

    /// Distinct connector nodes, in segment order.
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            Self::Endpoints(first, last) if first == last => vec![*first],
            Self::Endpoints(first, last) => vec![*first, *last],
            Self::Ring(nodes) => {
                let mut seen = HashSet::with_capacity(nodes.len());
                nodes.iter().copied().filter(|n| seen.insert(*n)).collect()
            }
        }
    }
}

impl PathSegment {
    pub fn connectors(&self) -> ConnectorSet<'_> {
        ConnectorSet::of(self)
    }
}
