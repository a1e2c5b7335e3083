use ptv2_check::Tags;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

/// Output layers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Layer {
    #[strum(serialize = "crossings")]
    Crossings,
    #[strum(serialize = "stops")]
    Stops,
    #[strum(serialize = "platforms")]
    Platforms,
    #[strum(serialize = "platforms_l")]
    PlatformsL,
    #[strum(serialize = "stations")]
    Stations,
    #[strum(serialize = "stations_l")]
    StationsL,
    #[strum(serialize = "stops_only_highway")]
    StopsOnlyHighway,
    #[strum(serialize = "ptv2_gaps")]
    Ptv2Gaps,
}

/// Extra attributes a layer carries besides the id and `lastchange`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schema {
    Crossing,
    /// Stop, platform and station layers
    Stop { refs: bool, amenity: bool },
    Route,
}

impl Layer {
    pub fn id_field(self) -> &'static str {
        match self {
            Self::PlatformsL | Self::StationsL => "way_id",
            Self::Ptv2Gaps => "relation_id",
            _ => "node_id",
        }
    }

    pub fn schema(self) -> Schema {
        match self {
            Self::Crossings => Schema::Crossing,
            Self::Stops | Self::Platforms | Self::PlatformsL => Schema::Stop {
                refs: true,
                amenity: false,
            },
            Self::Stations | Self::StationsL => Schema::Stop {
                refs: false,
                amenity: true,
            },
            Self::StopsOnlyHighway => Schema::Stop {
                refs: false,
                amenity: false,
            },
            Self::Ptv2Gaps => Schema::Route,
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.geojson", self)
    }
}

/// Which layers and checks to produce
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub crossings: bool,
    pub stops: bool,
    pub platforms: bool,
    pub stations: bool,
    pub railway_details: bool,
    pub routes: bool,
}

impl Options {
    /// Enable every layer and check
    pub fn all() -> Self {
        Self {
            crossings: true,
            stops: true,
            platforms: true,
            stations: true,
            railway_details: true,
            routes: true,
        }
    }

    pub fn any_stop_layer(&self) -> bool {
        self.stops || self.platforms || self.stations
    }

    pub fn layer_enabled(&self, layer: Layer) -> bool {
        match layer {
            Layer::Crossings => self.crossings,
            Layer::Stops => self.stops,
            Layer::Platforms | Layer::PlatformsL => self.platforms,
            Layer::Stations | Layer::StationsL => self.stations,
            Layer::StopsOnlyHighway => self.stops || self.platforms,
            Layer::Ptv2Gaps => self.routes,
        }
    }

    pub fn enabled_layers(&self) -> Vec<Layer> {
        Layer::iter().filter(|l| self.layer_enabled(*l)).collect()
    }
}

/// Kind of OSM object being classified
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Node,
    Way,
}

/// Result of classifying a node
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub layers: Vec<Layer>,
    /// Node is expected to lie on a track
    pub must_on_track: bool,
}

const TRACK_DETAILS: &[&str] = &[
    "signal",
    "stop",
    "buffer_stop",
    "level_crossing",
    "milestone",
    "derail",
    "isolated_track_section",
    "switch",
    "railway_crossing",
];

const CROSSING_BARRIERS: &[&str] = &["no", "yes", "half", "double_half", "full", "gates"];

const CROSSING_LIGHTS: &[&str] = &["yes", "no"];

fn tag<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str)
}

fn has_tag(tags: &Tags, key: &str, value: &str) -> bool {
    tag(tags, key) == Some(value)
}

/// Classify a tagged node into its output layers
pub fn classify_node(tags: &Tags, options: &Options) -> Classification {
    let railway = tag(tags, "railway");
    let public_transport = tag(tags, "public_transport");

    let must_on_track = (options.railway_details
        && railway.map(|r| TRACK_DETAILS.contains(&r)).unwrap_or(false))
        || public_transport == Some("stop_position");

    let mut layers = Vec::new();
    if let Some(layer) = stop_layer(tags, ObjectKind::Node, options) {
        layers.push(layer);
    }
    if options.crossings && matches!(railway, Some("level_crossing") | Some("crossing")) {
        layers.push(Layer::Crossings);
    }

    Classification {
        layers,
        must_on_track,
    }
}

/// Classify a way; only stations and platforms have line layers
pub fn classify_way(tags: &Tags, options: &Options) -> Option<Layer> {
    if !options.any_stop_layer() {
        return None;
    }
    stop_layer(tags, ObjectKind::Way, options)
}

/// Stations win over platforms, platforms over stops.
fn stop_layer(tags: &Tags, kind: ObjectKind, options: &Options) -> Option<Layer> {
    let railway = tag(tags, "railway");
    let public_transport = tag(tags, "public_transport");

    if options.stations {
        let is_station = public_transport == Some("station")
            || railway.is_some_and(|r| {
                matches!(r, "station" | "halt" | "tram_stop")
                    || has_tag(tags, "amenity", "bus_station")
            });
        if is_station {
            return match kind {
                ObjectKind::Node => Some(Layer::Stations),
                ObjectKind::Way => Some(Layer::StationsL),
            };
        }
    }

    if options.platforms && (public_transport == Some("platform") || railway == Some("platform")) {
        return match kind {
            ObjectKind::Node => Some(Layer::Platforms),
            ObjectKind::Way => Some(Layer::PlatformsL),
        };
    }

    if kind != ObjectKind::Node {
        return None;
    }

    if options.stops && public_transport == Some("stop_position") {
        return Some(Layer::Stops);
    }

    if (options.stops || options.platforms)
        && has_tag(tags, "highway", "bus_stop")
        && !tags.contains_key("public_transport")
    {
        return Some(Layer::StopsOnlyHighway);
    }

    None
}

/// Value of the `barrier` field of a crossing
pub fn crossing_barrier(tags: &Tags) -> &str {
    match tag(tags, "crossing:barrier") {
        None => "NONE",
        Some(v) if CROSSING_BARRIERS.contains(&v) => v,
        Some(_) => "UNKNOWN",
    }
}

/// Value of the `lights` field of a crossing
pub fn crossing_lights(tags: &Tags) -> &str {
    match tag(tags, "crossing:light") {
        None => "NONE",
        Some(v) if CROSSING_LIGHTS.contains(&v) => v,
        Some(_) => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_station_wins_over_platform() {
        let t = tags(&[("public_transport", "station"), ("railway", "platform")]);
        let c = classify_node(&t, &Options::all());
        assert_eq!(c.layers, vec![Layer::Stations]);

        let only_platforms = Options {
            platforms: true,
            ..Options::default()
        };
        let c = classify_node(&t, &only_platforms);
        assert_eq!(c.layers, vec![Layer::Platforms]);
    }

    #[test]
    fn test_bus_station_needs_railway_key() {
        let t = tags(&[("amenity", "bus_station")]);
        assert!(classify_node(&t, &Options::all()).layers.is_empty());

        let t = tags(&[("amenity", "bus_station"), ("railway", "yes")]);
        assert_eq!(classify_node(&t, &Options::all()).layers, vec![Layer::Stations]);
    }

    #[test]
    fn test_way_layers() {
        let t = tags(&[("railway", "platform")]);
        assert_eq!(classify_way(&t, &Options::all()), Some(Layer::PlatformsL));

        let t = tags(&[("railway", "halt")]);
        assert_eq!(classify_way(&t, &Options::all()), Some(Layer::StationsL));

        let t = tags(&[("public_transport", "stop_position")]);
        assert_eq!(classify_way(&t, &Options::all()), None);

        let t = tags(&[("railway", "platform")]);
        assert_eq!(classify_way(&t, &Options::default()), None);
    }

    #[test]
    fn test_stops() {
        let t = tags(&[("public_transport", "stop_position"), ("bus", "yes")]);
        let c = classify_node(&t, &Options::all());
        assert_eq!(c.layers, vec![Layer::Stops]);
        assert!(c.must_on_track);

        let t = tags(&[("highway", "bus_stop")]);
        assert_eq!(
            classify_node(&t, &Options::all()).layers,
            vec![Layer::StopsOnlyHighway]
        );

        let t = tags(&[("highway", "bus_stop"), ("public_transport", "platform")]);
        assert_eq!(classify_node(&t, &Options::all()).layers, vec![Layer::Platforms]);
    }

    #[test]
    fn test_level_crossing_is_crossing_and_track_detail() {
        let t = tags(&[("railway", "level_crossing"), ("crossing:barrier", "half")]);
        let c = classify_node(&t, &Options::all());
        assert_eq!(c.layers, vec![Layer::Crossings]);
        assert!(c.must_on_track);

        let without_details = Options {
            crossings: true,
            ..Options::default()
        };
        assert!(!classify_node(&t, &without_details).must_on_track);
    }

    #[test]
    fn test_crossing_values() {
        assert_eq!(crossing_barrier(&tags(&[])), "NONE");
        assert_eq!(crossing_barrier(&tags(&[("crossing:barrier", "gates")])), "gates");
        assert_eq!(crossing_barrier(&tags(&[("crossing:barrier", "chain")])), "UNKNOWN");
        assert_eq!(crossing_lights(&tags(&[])), "NONE");
        assert_eq!(crossing_lights(&tags(&[("crossing:light", "no")])), "no");
        assert_eq!(crossing_lights(&tags(&[("crossing:light", "flashing")])), "UNKNOWN");
    }

    #[test]
    fn test_layer_names() {
        assert_eq!(Layer::PlatformsL.to_string(), "platforms_l");
        assert_eq!(Layer::StopsOnlyHighway.file_name(), "stops_only_highway.geojson");
        let name: &'static str = Layer::Ptv2Gaps.into();
        assert_eq!(name, "ptv2_gaps");
    }

    #[test]
    fn test_enabled_layers() {
        let options = Options {
            stops: true,
            ..Options::default()
        };
        assert_eq!(
            options.enabled_layers(),
            vec![Layer::Stops, Layer::StopsOnlyHighway]
        );
        assert_eq!(Options::all().enabled_layers().len(), 8);
    }
}
