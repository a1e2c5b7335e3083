use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use geo::{LineString, MultiLineString, Point};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use hashbrown::HashMap;
use ptv2_check::{RouteRelation, Tags};
use serde_json::{json, Map};
use std::path::Path;

use crate::classify::{crossing_barrier, crossing_lights, Layer, Schema};
use crate::geometry::{node_point, way_linestring, GeometryError};
use crate::pbf::{NodeCache, TaggedNode, WayRef};
use crate::routes::RouteReport;

const STOP_FIELDS: &[&str] = &[
    "name",
    "public_transport",
    "railway",
    "highway",
    "operator",
    "network",
];

/// ISO-8601 form of an OSM timestamp, as used in the `lastchange` field
pub fn format_timestamp(milli_timestamp: Option<i64>) -> String {
    milli_timestamp
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_default()
}

fn point_to_geojson(point: &Point<f64>) -> Value {
    Value::Point(vec![point.x(), point.y()])
}

fn linestring_to_geojson(line: &LineString<f64>) -> Value {
    Value::LineString(line.0.iter().map(|c| vec![c.x, c.y]).collect())
}

fn multilinestring_to_geojson(lines: &MultiLineString<f64>) -> Value {
    Value::MultiLineString(
        lines
            .0
            .iter()
            .map(|line| line.0.iter().map(|c| vec![c.x, c.y]).collect())
            .collect(),
    )
}

fn tag_value<'a>(tags: &'a Tags, key: &str) -> &'a str {
    tags.get(key).map(String::as_str).unwrap_or("")
}

/// Attributes of an element feature in `layer`
fn element_properties(
    layer: Layer,
    id: i64,
    timestamp: Option<i64>,
    tags: &Tags,
) -> Map<String, serde_json::Value> {
    let mut properties = Map::new();
    properties.insert(layer.id_field().to_string(), json!(id.to_string()));
    properties.insert("lastchange".to_string(), json!(format_timestamp(timestamp)));

    match layer.schema() {
        Schema::Crossing => {
            properties.insert("barrier".to_string(), json!(crossing_barrier(tags)));
            properties.insert("lights".to_string(), json!(crossing_lights(tags)));
        }
        Schema::Stop { refs, amenity } => {
            for key in STOP_FIELDS {
                properties.insert(key.to_string(), json!(tag_value(tags, key)));
            }
            if refs {
                properties.insert("ref".to_string(), json!(tag_value(tags, "ref")));
                properties.insert("local_ref".to_string(), json!(tag_value(tags, "local_ref")));
            }
            if amenity {
                properties.insert("amenity".to_string(), json!(tag_value(tags, "amenity")));
            }
        }
        Schema::Route => {}
    }

    properties
}

fn feature(value: Value, properties: Map<String, serde_json::Value>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// In-memory GeoJSON layers, written out as one file per layer
pub struct LayerSet {
    layers: HashMap<Layer, Vec<Feature>>,
}

impl LayerSet {
    pub fn new(enabled: impl IntoIterator<Item = Layer>) -> Self {
        Self {
            layers: enabled.into_iter().map(|l| (l, Vec::new())).collect(),
        }
    }

    pub fn len(&self, layer: Layer) -> usize {
        self.layers.get(&layer).map(Vec::len).unwrap_or(0)
    }

    fn push(&mut self, layer: Layer, feature: Feature) {
        match self.layers.get_mut(&layer) {
            Some(features) => features.push(feature),
            None => log::debug!("Layer {} is disabled, dropping feature", layer),
        }
    }

    /// Add a node to `layer`
    pub fn add_node(&mut self, layer: Layer, node: &TaggedNode) -> Result<(), GeometryError> {
        let point = node_point(node.id, node.coord)?;
        let properties = element_properties(layer, node.id.get(), node.timestamp, &node.tags);
        self.push(layer, feature(point_to_geojson(&point), properties));
        Ok(())
    }

    /// Add a way to its layer, resolving node locations from `nodes`
    pub fn add_way(&mut self, way: &WayRef, nodes: &NodeCache) -> Result<(), GeometryError> {
        let line = way_linestring(way.id, &way.node_refs, nodes)?;
        let properties = element_properties(way.layer, way.id.get(), way.timestamp, &way.tags);
        self.push(way.layer, feature(linestring_to_geojson(&line), properties));
        Ok(())
    }

    /// Add a route with gaps to the `ptv2_gaps` layer
    pub fn add_route_gaps(
        &mut self,
        relation: &RouteRelation,
        report: &RouteReport,
        lines: &MultiLineString<f64>,
    ) {
        let mut properties = Map::new();
        properties.insert(
            Layer::Ptv2Gaps.id_field().to_string(),
            json!(relation.id.to_string()),
        );
        properties.insert("name".to_string(), json!(report.name));
        properties.insert("ref".to_string(), json!(report.ref_));
        properties.insert("route".to_string(), json!(report.route));
        properties.insert("segments".to_string(), json!(report.segments));
        properties.insert("gaps".to_string(), json!(report.gaps));
        properties.insert("missing_members".to_string(), json!(report.missing_members));
        self.push(Layer::Ptv2Gaps, feature(multilinestring_to_geojson(lines), properties));
    }

    /// Write every enabled layer to `<dir>/<layer>.geojson`, including empty ones
    pub fn write_all(self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let mut layers: Vec<_> = self.layers.into_iter().collect();
        layers.sort_by_key(|(layer, _)| layer.file_name());

        for (layer, features) in layers {
            let path = dir.join(layer.file_name());
            log::info!("Writing {} features to {}", features.len(), path.display());
            write_features(features, &path)?;
        }

        Ok(())
    }
}

fn write_features(features: Vec<Feature>, output_path: &Path) -> Result<()> {
    let feature_collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    let geojson = GeoJson::from(feature_collection);
    let json_string = serde_json::to_string_pretty(&geojson)
        .context("Failed to serialize GeoJSON")?;

    std::fs::write(output_path, json_string)
        .with_context(|| format!("Failed to write GeoJSON to {}", output_path.display()))?;

    Ok(())
}

/// Write the per-relation route report as JSON
pub fn write_route_report(reports: &[RouteReport], output_path: &Path) -> Result<()> {
    log::info!("Writing {} route reports to {}", reports.len(), output_path.display());

    let json_string =
        serde_json::to_string_pretty(reports).context("Failed to serialize route report")?;

    std::fs::write(output_path, json_string)
        .with_context(|| format!("Failed to write route report to {}", output_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use ptv2_check::{NodeId, WayId};

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(Some(1_500_000_000_000)), "2017-07-14T02:40:00Z");
        assert_eq!(format_timestamp(None), "");
    }

    #[test]
    fn test_crossing_properties() {
        let t = tags(&[("railway", "level_crossing"), ("crossing:light", "yes")]);
        let props = element_properties(Layer::Crossings, 42, None, &t);
        assert_eq!(props["node_id"], json!("42"));
        assert_eq!(props["barrier"], json!("NONE"));
        assert_eq!(props["lights"], json!("yes"));
        assert!(!props.contains_key("name"));
    }

    #[test]
    fn test_stop_properties() {
        let t = tags(&[("railway", "station"), ("name", "Hbf"), ("amenity", "x")]);
        let props = element_properties(Layer::StationsL, 7, None, &t);
        assert_eq!(props["way_id"], json!("7"));
        assert_eq!(props["name"], json!("Hbf"));
        assert_eq!(props["operator"], json!(""));
        assert_eq!(props["amenity"], json!("x"));
        assert!(!props.contains_key("ref"));

        let props = element_properties(Layer::StopsOnlyHighway, 7, None, &t);
        assert!(!props.contains_key("ref"));
        assert!(!props.contains_key("amenity"));
    }

    #[test]
    fn test_layer_set_write_all() {
        let mut layers = LayerSet::new([Layer::Stations, Layer::Platforms, Layer::PlatformsL]);
        let node = TaggedNode {
            id: NodeId(1),
            coord: Coord { x: 8.4, y: 49.0 },
            tags: tags(&[("railway", "station")]),
            timestamp: None,
            layers: vec![Layer::Stations],
        };
        layers.add_node(Layer::Stations, &node).unwrap();
        layers.add_node(Layer::Crossings, &node).unwrap();
        assert_eq!(layers.len(Layer::Stations), 1);
        assert_eq!(layers.len(Layer::Crossings), 0);

        let way = WayRef {
            id: WayId(5),
            node_refs: vec![NodeId(1), NodeId(2)],
            tags: tags(&[("railway", "platform")]),
            timestamp: None,
            layer: Layer::PlatformsL,
        };
        let err = layers.add_way(&way, &NodeCache::new()).unwrap_err();
        assert!(matches!(err, GeometryError::MissingNode { .. }));

        let dir = tempfile::tempdir().unwrap();
        layers.write_all(dir.path()).unwrap();

        let stations = std::fs::read_to_string(dir.path().join("stations.geojson")).unwrap();
        let parsed: GeoJson = stations.parse().unwrap();
        match parsed {
            GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 1),
            _ => panic!("Expected FeatureCollection"),
        }
        assert!(dir.path().join("platforms.geojson").exists());
        assert!(dir.path().join("platforms_l.geojson").exists());
        assert!(!dir.path().join("crossings.geojson").exists());
    }
}
