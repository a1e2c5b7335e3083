//! Resolution of relation members against a dataset snapshot.

use crate::continuity::MemberObject;
use crate::identifiers::*;
use crate::models::{ElementRef, PathSegment, RouteRelation};

/// Lookup of the elements a route relation may reference.
///
/// Implementations can be an in-memory index, a database or anything else that
/// answers by id. Sources are only read, so one source can serve many checks
/// running on different threads.
pub trait ElementSource {
    fn segment(&self, id: WayId) -> Option<&PathSegment>;

    fn contains_node(&self, id: NodeId) -> bool;

    fn contains_way(&self, id: WayId) -> bool {
        self.segment(id).is_some()
    }
}

/// Resolve one member.
///
/// Node members and stop/platform ways become points, other ways become path
/// segments. Relation members and missing targets are unresolved.
pub fn resolve_member<'a, S>(
    reference: ElementRef,
    is_stop_or_platform: bool,
    source: &'a S,
) -> Option<MemberObject<'a>>
where
    S: ElementSource + ?Sized,
{
    match reference {
        ElementRef::Node(id) => source
            .contains_node(id)
            .then_some(MemberObject::Point(reference)),
        ElementRef::Way(id) if is_stop_or_platform => source
            .contains_way(id)
            .then_some(MemberObject::Point(reference)),
        ElementRef::Way(id) => source.segment(id).map(MemberObject::Segment),
        ElementRef::Relation(_) => None,
    }
}

/// Resolve every member of `relation`, keeping member order.
pub fn resolve_members<'a, S>(relation: &RouteRelation, source: &'a S) -> Vec<Option<MemberObject<'a>>>
where
    S: ElementSource + ?Sized,
{
    relation
        .members
        .iter()
        .map(|m| resolve_member(m.reference, m.role.is_stop_or_platform(), source))
        .collect()
}

/// Number of node and way members whose target is absent from `source`.
///
/// This is the reference-integrity counterpart of the gap check: missing
/// members never count as gaps.
pub fn missing_members<S>(relation: &RouteRelation, source: &S) -> usize
where
    S: ElementSource + ?Sized,
{
    relation
        .members
        .iter()
        .filter(|m| match m.reference {
            ElementRef::Node(id) => !source.contains_node(id),
            ElementRef::Way(id) => !source.contains_way(id),
            ElementRef::Relation(_) => false,
        })
        .count()
}
