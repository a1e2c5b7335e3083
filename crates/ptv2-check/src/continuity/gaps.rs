//! Gap detection over the segments of a route.

use crate::continuity::members::{path_segments, MemberObject};
use crate::identifiers::WayId;
use crate::models::{PathSegment, RouteRelation};

/// A break between two consecutive segments of a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GapPosition {
    /// Index of the segment before the gap, counted over path segments only.
    pub index: usize,
    pub after: WayId,
    pub before: WayId,
}

/// True when two segments share a connector node.
pub fn is_connected(a: &PathSegment, b: &PathSegment) -> bool {
    a.connectors().intersects(&b.connectors())
}

/// Number of consecutive segment pairs of `relation` that share no connector node.
///
/// Never fails: routes with fewer than two resolved segments have no gaps.
pub fn find_gaps(relation: &RouteRelation, resolved: &[Option<MemberObject<'_>>]) -> usize {
    let segments: Vec<&PathSegment> = path_segments(relation, resolved).collect();
    if segments.len() < 2 {
        return 0;
    }

    segments
        .windows(2)
        .filter(|pair| !is_connected(pair[0], pair[1]))
        .count()
}

/// Every gap of `relation`, in route order. Its length equals [`find_gaps`].
pub fn gap_positions(
    relation: &RouteRelation,
    resolved: &[Option<MemberObject<'_>>],
) -> Vec<GapPosition> {
    let segments: Vec<&PathSegment> = path_segments(relation, resolved).collect();

    let gaps: Vec<GapPosition> = segments
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| !is_connected(pair[0], pair[1]))
        .map(|(index, pair)| GapPosition {
            index,
            after: pair[0].id(),
            before: pair[1].id(),
        })
        .collect();

    for gap in &gaps {
        log::trace!(
            "Relation {}: gap between way {} and way {}",
            relation.id,
            gap.after,
            gap.before
        );
    }

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::*;
    use crate::models::{ElementRef, Member, Tags};

    fn way(id: i64, nodes: &[i64]) -> PathSegment {
        PathSegment::new(WayId(id), nodes.iter().copied().map(NodeId).collect(), false).unwrap()
    }

    fn roundabout(id: i64, nodes: &[i64]) -> PathSegment {
        PathSegment::new(WayId(id), nodes.iter().copied().map(NodeId).collect(), true).unwrap()
    }

    /// Two platform nodes followed by the given ways, like a typical PTv2 bus route.
    fn route_with<'a>(ways: &[&'a PathSegment]) -> (RouteRelation, Vec<Option<MemberObject<'a>>>) {
        let mut members = vec![Member::node(1, "platform"), Member::node(2, "platform")];
        members.extend(ways.iter().map(|w| Member::way(w.id().get(), "")));
        let relation = RouteRelation::new(RelationId(1), members, Tags::new());
        let points = vec![
            Some(MemberObject::Point(ElementRef::Node(NodeId(1)))),
            Some(MemberObject::Point(ElementRef::Node(NodeId(2)))),
        ];
        (relation, points)
    }

    fn count(ways: &[&PathSegment]) -> usize {
        let (relation, mut resolved) = route_with(ways);
        resolved.extend(ways.iter().map(|w| Some(MemberObject::Segment(*w))));
        find_gaps(&relation, &resolved)
    }

    #[test]
    fn test_three_ways_no_gaps() {
        let w1 = way(1, &[1, 2, 3, 4]);
        let w2 = way(2, &[4, 5, 6, 7]);
        let w3 = way(3, &[7, 8, 9]);
        assert_eq!(count(&[&w1, &w2, &w3]), 0);
    }

    #[test]
    fn test_gap_between_first_and_second() {
        let w1 = way(1, &[1, 2, 3, 4]);
        let w2 = way(2, &[5, 6, 7]);
        let w3 = way(3, &[7, 8, 9]);
        assert_eq!(count(&[&w1, &w2, &w3]), 1);
    }

    #[test]
    fn test_roundabout_in_the_middle() {
        let w1 = way(1, &[1, 2, 3, 4]);
        let w2 = roundabout(2, &[4, 5, 6, 7, 4]);
        let w3 = way(3, &[7, 8, 9]);
        assert_eq!(count(&[&w1, &w2, &w3]), 0);
    }

    #[test]
    fn test_disconnected_roundabout_in_the_middle() {
        let w1 = way(1, &[1, 2, 3, 4]);
        let w2 = roundabout(2, &[12, 5, 6, 13, 12]);
        let w3 = way(3, &[7, 8, 9]);
        assert_eq!(count(&[&w1, &w2, &w3]), 2);
    }

    #[test]
    fn test_disconnected_roundabout_first() {
        let w1 = roundabout(1, &[1, 2, 3, 1]);
        let w2 = way(2, &[4, 5, 6, 13, 7]);
        let w3 = way(3, &[7, 8, 9]);
        assert_eq!(count(&[&w1, &w2, &w3]), 1);
    }

    #[test]
    fn test_closed_way_without_junction_touching_interior() {
        let w1 = way(1, &[1, 2, 3, 4]);
        let w2 = way(2, &[10, 4, 11, 7, 10]);
        let w3 = way(3, &[7, 8, 9]);
        assert_eq!(count(&[&w1, &w2, &w3]), 2);

        let w2 = roundabout(2, &[10, 4, 11, 7, 10]);
        assert_eq!(count(&[&w1, &w2, &w3]), 0);
    }

    #[test]
    fn test_direction_is_irrelevant() {
        let w1 = way(1, &[4, 3, 2, 1]);
        let w2 = way(2, &[7, 6, 5, 4]);
        let w3 = way(3, &[9, 8, 7]);
        assert_eq!(count(&[&w1, &w2, &w3]), 0);

        let w1 = way(1, &[1, 2]);
        let w2 = way(2, &[3, 2]);
        assert_eq!(count(&[&w1, &w2]), 0);
    }

    #[test]
    fn test_every_gap_counted() {
        let ways: Vec<PathSegment> = (0..6).map(|i| way(i, &[i * 10, i * 10 + 1])).collect();
        let refs: Vec<&PathSegment> = ways.iter().collect();
        assert_eq!(count(&refs), 5);
    }

    #[test]
    fn test_fewer_than_two_segments() {
        assert_eq!(count(&[]), 0);

        let w1 = way(1, &[1, 2]);
        assert_eq!(count(&[&w1]), 0);

        let (relation, resolved) = route_with(&[]);
        assert_eq!(find_gaps(&relation, &resolved), 0);
        assert_eq!(find_gaps(&relation, &[]), 0);
    }

    #[test]
    fn test_unresolved_member_does_not_break_adjacency() {
        let w1 = way(1, &[1, 2]);
        let w3 = way(3, &[2, 3]);
        let relation = RouteRelation::new(
            RelationId(1),
            vec![Member::way(1, ""), Member::way(2, ""), Member::way(3, "")],
            Tags::new(),
        );
        let resolved = vec![
            Some(MemberObject::Segment(&w1)),
            None,
            Some(MemberObject::Segment(&w3)),
        ];
        assert_eq!(find_gaps(&relation, &resolved), 0);
    }

    #[test]
    fn test_gap_positions() {
        let w1 = way(1, &[1, 2, 3, 4]);
        let w2 = roundabout(2, &[12, 5, 6, 13, 12]);
        let w3 = way(3, &[7, 8, 9]);
        let (relation, mut resolved) = route_with(&[&w1, &w2, &w3]);
        resolved.extend([&w1, &w2, &w3].iter().map(|w| Some(MemberObject::Segment(*w))));

        let gaps = gap_positions(&relation, &resolved);
        assert_eq!(gaps.len(), find_gaps(&relation, &resolved));
        assert_eq!(
            gaps,
            vec![
                GapPosition { index: 0, after: WayId(1), before: WayId(2) },
                GapPosition { index: 1, after: WayId(2), before: WayId(3) },
            ]
        );
    }
}
