use geo::MultiLineString;
use hashbrown::HashMap;
use ptv2_check::{
    path_segments, resolve_members, ElementSource, GapPosition, NodeId, PathSegment,
    RouteCheck, RouteRelation, WayId,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::geometry::segments_multilinestring;
use crate::pbf::NodeCache;

/// Read-only view of the extracted data that route relations resolve against
pub struct RouteNetwork<'a> {
    pub segments: &'a HashMap<WayId, PathSegment>,
    pub nodes: &'a NodeCache,
}

impl ElementSource for RouteNetwork<'_> {
    fn segment(&self, id: WayId) -> Option<&PathSegment> {
        self.segments.get(&id)
    }

    fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(id.get())
    }
}

impl RouteNetwork<'_> {
    /// Lines of the resolved path segments of `relation`
    pub fn route_lines(&self, relation: &RouteRelation) -> MultiLineString<f64> {
        let resolved = resolve_members(relation, self);
        segments_multilinestring(path_segments(relation, &resolved), self.nodes)
    }
}

/// One line of the route report
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteReport {
    pub relation_id: i64,
    pub name: String,
    #[serde(rename = "ref")]
    pub ref_: String,
    pub route: String,
    pub segments: usize,
    pub gaps: usize,
    pub gap_positions: Vec<GapPosition>,
    pub missing_members: usize,
}

impl RouteReport {
    pub fn new(relation: &RouteRelation, check: RouteCheck) -> Self {
        let tag = |key: &str| relation.tag(key).unwrap_or("").to_string();
        Self {
            relation_id: check.relation.get(),
            name: tag("name"),
            ref_: tag("ref"),
            route: tag("route"),
            segments: check.segments,
            gaps: check.gap_count(),
            gap_positions: check.gaps,
            missing_members: check.missing_members,
        }
    }
}

/// Check every relation in parallel. Reports are sorted by relation id.
pub fn check_routes(relations: &[RouteRelation], network: &RouteNetwork<'_>) -> Vec<RouteReport> {
    let mut reports: Vec<RouteReport> = relations
        .par_iter()
        .map(|relation| RouteReport::new(relation, RouteCheck::run(relation, network)))
        .collect();
    reports.sort_by_key(|r| r.relation_id);
    reports
}

/// Statistics for route checks
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RouteStats {
    pub relations_checked: usize,
    pub relations_with_gaps: usize,
    pub total_gaps: usize,
    pub relations_with_missing_members: usize,
}

impl RouteStats {
    pub fn from_reports(reports: &[RouteReport]) -> Self {
        Self {
            relations_checked: reports.len(),
            relations_with_gaps: reports.iter().filter(|r| r.gaps > 0).count(),
            total_gaps: reports.iter().map(|r| r.gaps).sum(),
            relations_with_missing_members: reports
                .iter()
                .filter(|r| r.missing_members > 0)
                .count(),
        }
    }

    pub fn log_summary(&self) {
        log::info!("=== PTv2 Route Summary ===");
        log::info!("Relations checked: {}", self.relations_checked);
        log::info!("Relations with gaps: {}", self.relations_with_gaps);
        log::info!("Total gaps: {}", self.total_gaps);
        if self.relations_with_missing_members > 0 {
            log::warn!(
                "Relations with members missing from the input: {}",
                self.relations_with_missing_members
            );
        }
    }
}
