//! Route relations and their members.

use hashbrown::HashMap;

use crate::identifiers::*;

/// Tag storage type
pub type Tags = HashMap<String, String>;

/// Values of the `route` key that describe public transport services.
pub const PUBLIC_TRANSPORT_ROUTES: &[&str] = &[
    "train",
    "subway",
    "light_rail",
    "tram",
    "monorail",
    "funicular",
    "bus",
    "trolleybus",
    "coach",
    "share_taxi",
    "minibus",
    "ferry",
];

// ============================================================================
// Members
// ============================================================================

/// The element a relation member points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementRef {
    Node(NodeId),
    Way(WayId),
    Relation(RelationId),
}

/// Role of a member within a PTv2 route, decided once from the role string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberRole {
    /// `stop`, `stop_entry_only`, `stop_exit_only`
    Stop,
    /// `platform`, `platform_entry_only`, `platform_exit_only`
    Platform,
    /// Empty role, or the legacy `forward` / `backward`
    Path,
    Other(String),
}

impl MemberRole {
    pub fn parse(role: &str) -> Self {
        match role {
            "" | "forward" | "backward" => Self::Path,
            "stop" | "stop_entry_only" | "stop_exit_only" => Self::Stop,
            "platform" | "platform_entry_only" | "platform_exit_only" => Self::Platform,
            other => Self::Other(other.to_string()),
        }
    }

    /// Stops and platforms take part in route membership but never in continuity.
    pub fn is_stop_or_platform(&self) -> bool {
        matches!(self, Self::Stop | Self::Platform)
    }
}

impl From<&str> for MemberRole {
    fn from(role: &str) -> Self {
        Self::parse(role)
    }
}

/// Relation member
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub reference: ElementRef,
    pub role: MemberRole,
}

impl Member {
    pub fn new(reference: ElementRef, role: impl Into<MemberRole>) -> Self {
        Self {
            reference,
            role: role.into(),
        }
    }

    pub fn node(id: i64, role: &str) -> Self {
        Self::new(ElementRef::Node(NodeId(id)), role)
    }

    pub fn way(id: i64, role: &str) -> Self {
        Self::new(ElementRef::Way(WayId(id)), role)
    }
}

// ============================================================================
// Relations
// ============================================================================

/// A route relation snapshot
#[derive(Clone, Debug, Default)]
pub struct RouteRelation {
    pub id: RelationId,
    pub members: Vec<Member>,
    pub tags: Tags,
}

impl RouteRelation {
    pub fn new(id: RelationId, members: Vec<Member>, tags: Tags) -> Self {
        Self { id, members, tags }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Way ids referenced by this relation, in member order.
    pub fn way_ids(&self) -> impl Iterator<Item = WayId> + '_ {
        self.members.iter().filter_map(|m| match m.reference {
            ElementRef::Way(id) => Some(id),
            _ => None,
        })
    }
}

/// Check if tags describe a public transport route following the PTv2 scheme
pub fn is_ptv2_route(tags: &Tags) -> bool {
    let is_route = tags.get("type").map(|v| v == "route").unwrap_or(false);
    let is_v2 = tags
        .get("public_transport:version")
        .map(|v| v == "2")
        .unwrap_or(false);
    let is_pt = tags
        .get("route")
        .map(|v| PUBLIC_TRANSPORT_ROUTES.contains(&v.as_str()))
        .unwrap_or(false);
    is_route && is_v2 && is_pt
}
