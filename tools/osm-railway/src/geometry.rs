use geo::{Coord, LineString, MultiLineString, Point};
use ptv2_check::{NodeId, PathSegment, WayId};

use crate::pbf::NodeCache;

/// Problems that make a single feature unusable. Callers skip and log them.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("Node {0} has an invalid location")]
    InvalidLocation(NodeId),

    #[error("Way {way} references node {node} without a location")]
    MissingNode { way: WayId, node: NodeId },

    #[error("Way {0} has fewer than two distinct locations")]
    TooFewPoints(WayId),
}

/// Check if a coordinate lies within WGS84 bounds
pub fn is_valid_location(coord: &Coord<f64>) -> bool {
    coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y)
}

pub fn node_point(id: NodeId, coord: Coord<f64>) -> Result<Point<f64>, GeometryError> {
    if !is_valid_location(&coord) {
        return Err(GeometryError::InvalidLocation(id));
    }
    Ok(Point::from(coord))
}

/// Build a way's line, dropping consecutive duplicate locations
pub fn way_linestring(
    id: WayId,
    node_refs: &[NodeId],
    nodes: &NodeCache,
) -> Result<LineString<f64>, GeometryError> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(node_refs.len());

    for &node in node_refs {
        let coord = nodes
            .get(node.get())
            .copied()
            .filter(is_valid_location)
            .ok_or(GeometryError::MissingNode { way: id, node })?;
        if coords.last() != Some(&coord) {
            coords.push(coord);
        }
    }

    if coords.len() < 2 {
        return Err(GeometryError::TooFewPoints(id));
    }

    Ok(LineString::new(coords))
}

/// Lines of all segments that can be built, logging the ones that cannot
pub fn segments_multilinestring<'a>(
    segments: impl IntoIterator<Item = &'a PathSegment>,
    nodes: &NodeCache,
) -> MultiLineString<f64> {
    let lines = segments
        .into_iter()
        .filter_map(|segment| match way_linestring(segment.id(), segment.nodes(), nodes) {
            Ok(line) => Some(line),
            Err(err) => {
                log::debug!("{}", err);
                None
            }
        })
        .collect();
    MultiLineString::new(lines)
}
