use anyhow::{Context, Result};
use geo::Coord;
use hashbrown::{HashMap, HashSet};
use indicatif::{ProgressBar, ProgressStyle};
use osmpbf::{Element, ElementReader, RelMemberType};
use ptv2_check::{
    is_ptv2_route, ElementRef, Member, NodeId, PathSegment, RelationId, RouteRelation, Tags, WayId,
};
use std::path::Path;

use crate::classify::{classify_node, classify_way, Layer, Options};
use crate::geometry::is_valid_location;

/// Node ID to coordinate mapping
pub struct NodeCache {
    nodes: HashMap<i64, Coord<f64>>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, id: i64, coord: Coord<f64>) {
        self.nodes.insert(id, coord);
    }

    pub fn get(&self, id: i64) -> Option<&Coord<f64>> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// A node that belongs to at least one output layer
#[derive(Clone, Debug)]
pub struct TaggedNode {
    pub id: NodeId,
    pub coord: Coord<f64>,
    pub tags: Tags,
    /// Milliseconds since the epoch of the last edit
    pub timestamp: Option<i64>,
    pub layers: Vec<Layer>,
}

/// A way with node references (before coordinate resolution)
#[derive(Clone, Debug)]
pub struct WayRef {
    pub id: WayId,
    pub node_refs: Vec<NodeId>,
    pub tags: Tags,
    pub timestamp: Option<i64>,
    pub layer: Layer,
}

/// All extracted elements from PBF
pub struct ExtractedElements {
    pub nodes: NodeCache,
    pub tagged_nodes: Vec<TaggedNode>,
    pub layer_ways: Vec<WayRef>,
    pub route_relations: Vec<RouteRelation>,
    pub route_segments: HashMap<WayId, PathSegment>,
    /// Nodes expected to lie on a track (signals, switches, stop positions, ...)
    pub must_on_track: usize,
}

fn collect_tags<'a>(tags: impl Iterator<Item = (&'a str, &'a str)>) -> Tags {
    tags.map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb
}

/// Convert a relation into a route relation if it is a PTv2 route
fn route_relation(rel: &osmpbf::Relation) -> Option<RouteRelation> {
    let tags = collect_tags(rel.tags());
    if !is_ptv2_route(&tags) {
        return None;
    }

    let members = rel
        .members()
        .map(|m| {
            let reference = match m.member_type {
                RelMemberType::Node => ElementRef::Node(NodeId(m.member_id)),
                RelMemberType::Way => ElementRef::Way(WayId(m.member_id)),
                RelMemberType::Relation => ElementRef::Relation(RelationId(m.member_id)),
            };
            Member::new(reference, m.role().unwrap_or(""))
        })
        .collect();

    Some(RouteRelation::new(RelationId(rel.id()), members, tags))
}

/// Read PTv2 route relations (first pass), sorted by relation id
pub fn extract_routes(path: &Path) -> Result<Vec<RouteRelation>> {
    log::info!("Reading route relations from {}", path.display());

    let reader = ElementReader::from_path(path)
        .with_context(|| format!("Failed to open PBF file: {}", path.display()))?;

    let pb = spinner();
    pb.set_message("Scanning relations...");

    let mut routes = Vec::new();
    let mut relation_count = 0u64;

    reader.for_each(|element| {
        if let Element::Relation(rel) = element {
            if let Some(route) = route_relation(&rel) {
                routes.push(route);
            }
            relation_count += 1;
            if relation_count % 100_000 == 0 {
                pb.set_message(format!("Processed {} relations...", relation_count));
            }
        }
    })?;

    // Route checks report in relation id order
    routes.sort_by_key(|r| r.id);

    pb.finish_with_message(format!(
        "Processed {} relations, {} PTv2 routes",
        relation_count,
        routes.len()
    ));

    Ok(routes)
}

/// Node and way state of the second pass
struct Extractor<'a> {
    options: &'a Options,
    route_ways: HashSet<WayId>,
    nodes: NodeCache,
    tagged_nodes: Vec<TaggedNode>,
    layer_ways: Vec<WayRef>,
    route_segments: HashMap<WayId, PathSegment>,
    must_on_track: usize,
    node_count: u64,
    way_count: u64,
}

impl Extractor<'_> {
    fn node(&mut self, id: i64, coord: Coord<f64>, tags: Tags, timestamp: Option<i64>) {
        self.nodes.insert(id, coord);
        self.node_count += 1;

        if tags.is_empty() || !is_valid_location(&coord) {
            return;
        }

        let classification = classify_node(&tags, self.options);
        if classification.must_on_track {
            self.must_on_track += 1;
        }
        if !classification.layers.is_empty() {
            self.tagged_nodes.push(TaggedNode {
                id: NodeId(id),
                coord,
                tags,
                timestamp,
                layers: classification.layers,
            });
        }
    }

    fn way(&mut self, way: &osmpbf::Way) {
        self.way_count += 1;
        let id = WayId(way.id());
        let is_route_way = self.route_ways.contains(&id);
        let wants_layers = self.options.any_stop_layer();
        if !is_route_way && !wants_layers {
            return;
        }

        let tags = collect_tags(way.tags());
        let node_refs: Vec<NodeId> = way.refs().map(NodeId).collect();

        if is_route_way {
            match PathSegment::from_tags(id, node_refs.clone(), &tags) {
                Ok(segment) => {
                    self.route_segments.insert(id, segment);
                }
                Err(err) => log::debug!("Skipping route way: {}", err),
            }
        }

        if let Some(layer) = classify_way(&tags, self.options) {
            self.layer_ways.push(WayRef {
                id,
                node_refs,
                tags,
                timestamp: way.info().milli_timestamp(),
                layer,
            });
        }
    }
}

/// Read nodes and ways (second pass)
pub fn extract_elements(
    path: &Path,
    options: &Options,
    route_relations: Vec<RouteRelation>,
) -> Result<ExtractedElements> {
    log::info!("Reading nodes and ways from {}", path.display());

    let reader = ElementReader::from_path(path)
        .with_context(|| format!("Failed to open PBF file: {}", path.display()))?;

    let pb = spinner();
    pb.set_message("Reading nodes...");

    let route_ways: HashSet<WayId> = route_relations
        .iter()
        .flat_map(|r| r.way_ids())
        .collect();
    log::info!("Route relations reference {} distinct ways", route_ways.len());

    let mut extractor = Extractor {
        options,
        route_ways,
        nodes: NodeCache::with_capacity(10_000_000),
        tagged_nodes: Vec::new(),
        layer_ways: Vec::new(),
        route_segments: HashMap::new(),
        must_on_track: 0,
        node_count: 0,
        way_count: 0,
    };

    reader.for_each(|element| {
        match element {
            Element::Node(node) => {
                let coord = Coord {
                    x: node.lon(),
                    y: node.lat(),
                };
                let timestamp = node.info().milli_timestamp();
                extractor.node(node.id(), coord, collect_tags(node.tags()), timestamp);
            }
            Element::DenseNode(node) => {
                let coord = Coord {
                    x: node.lon(),
                    y: node.lat(),
                };
                let timestamp = node.info().map(|info| info.milli_timestamp());
                extractor.node(node.id(), coord, collect_tags(node.tags()), timestamp);
            }
            Element::Way(way) => {
                extractor.way(&way);
                if extractor.way_count % 100_000 == 0 {
                    pb.set_message(format!(
                        "Processed {} nodes, {} ways...",
                        extractor.node_count, extractor.way_count
                    ));
                }
                return;
            }
            Element::Relation(_) => return,
        }
        if extractor.node_count % 1_000_000 == 0 {
            pb.set_message(format!("Processed {} nodes...", extractor.node_count));
        }
    })?;

    pb.finish_with_message(format!(
        "Processed {} nodes, {} ways",
        extractor.node_count, extractor.way_count
    ));

    log::info!("Node cache: {} nodes", extractor.nodes.len());
    log::info!("Tagged layer nodes: {}", extractor.tagged_nodes.len());
    log::info!("Layer ways: {}", extractor.layer_ways.len());
    log::info!("Route ways: {}", extractor.route_segments.len());

    Ok(ExtractedElements {
        nodes: extractor.nodes,
        tagged_nodes: extractor.tagged_nodes,
        layer_ways: extractor.layer_ways,
        route_relations,
        route_segments: extractor.route_segments,
        must_on_track: extractor.must_on_track,
    })
}
