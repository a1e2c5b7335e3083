//! Per-relation check results.

use crate::continuity::{gap_positions, path_segments, GapPosition};
use crate::identifiers::RelationId;
use crate::models::RouteRelation;
use crate::resolve::{missing_members, resolve_members, ElementSource};

/// Outcome of checking one route relation
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteCheck {
    pub relation: RelationId,
    /// Resolved path segments the continuity check looked at
    pub segments: usize,
    pub gaps: Vec<GapPosition>,
    /// Node and way members missing from the snapshot (not counted as gaps)
    pub missing_members: usize,
}

impl RouteCheck {
    pub fn run<S>(relation: &RouteRelation, source: &S) -> Self
    where
        S: ElementSource + ?Sized,
    {
        let resolved = resolve_members(relation, source);

        Self {
            relation: relation.id,
            segments: path_segments(relation, &resolved).count(),
            gaps: gap_positions(relation, &resolved),
            missing_members: missing_members(relation, source),
        }
    }

    pub fn gap_count(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_continuous(&self) -> bool {
        self.gaps.is_empty()
    }
}
