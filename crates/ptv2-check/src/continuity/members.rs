//! Selection of the path segments of a route.

use crate::models::{ElementRef, PathSegment, RouteRelation};

/// A relation member resolved against the dataset snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberObject<'a> {
    /// A way the route travels along.
    Segment(&'a PathSegment),
    /// A stop or platform, whether mapped as a node or as a way.
    Point(ElementRef),
}

/// Resolved path segments of `relation`, in member order.
///
/// `resolved` runs parallel to `relation.members`; `None` marks a member whose
/// target is missing from the snapshot. Points and unresolved members are
/// skipped without breaking adjacency, and a way listed twice is yielded twice.
/// Entries past the end of either list are ignored.
pub fn path_segments<'r, 'a: 'r>(
    relation: &'r RouteRelation,
    resolved: &'r [Option<MemberObject<'a>>],
) -> impl Iterator<Item = &'a PathSegment> + 'r {
    relation
        .members
        .iter()
        .zip(resolved)
        .filter_map(|(_, object)| match object {
            Some(MemberObject::Segment(segment)) => Some(*segment),
            _ => None,
        })
}
