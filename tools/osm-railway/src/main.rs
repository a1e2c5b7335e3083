use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

mod classify;
mod geometry;
mod output;
mod pbf;
mod routes;

use classify::{Layer, Options};
use output::{write_route_report, LayerSet};
use pbf::{extract_elements, extract_routes};
use routes::{check_routes, RouteNetwork, RouteStats};

#[derive(Parser, Debug)]
#[command(
    name = "osm-railway",
    author,
    version,
    about = "Export railway and public transport features from OpenStreetMap PBF data",
    long_about = "Classifies railway crossings, stops, platforms and stations from an OSM PBF \
                  file into GeoJSON layers, one file per layer.\n\n\
                  With --routes, every public transport route relation tagged \
                  public_transport:version=2 is checked for gaps: consecutive ways of the \
                  route that do not share a node. Roundabouts connect at any of their nodes. \
                  Routes with gaps are written to ptv2_gaps.geojson and all checked routes \
                  to ptv2_report.json.\n\n\
                  Without any layer flag, all layers and checks are produced."
)]
struct Args {
    /// Input OSM PBF file
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the GeoJSON layers
    #[arg(short, long)]
    output: PathBuf,

    /// Export railway crossings
    #[arg(long)]
    crossings: bool,

    /// Export stop positions (and highway=bus_stop nodes without PTv2 tags)
    #[arg(long)]
    stops: bool,

    /// Export platforms
    #[arg(long)]
    platforms: bool,

    /// Export stations
    #[arg(long)]
    stations: bool,

    /// Collect signals, switches and other nodes that must lie on a track
    #[arg(long)]
    railway_details: bool,

    /// Check PTv2 route relations for gaps
    #[arg(long)]
    routes: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> Options {
        let options = Options {
            crossings: self.crossings,
            stops: self.stops,
            platforms: self.platforms,
            stations: self.stations,
            railway_details: self.railway_details,
            routes: self.routes,
        };
        if options == Options::default() {
            Options::all()
        } else {
            options
        }
    }
}

/// Counts of features that made it into the layers
#[derive(Debug, Default)]
struct LayerStats {
    written: Vec<(Layer, usize)>,
    skipped: usize,
    must_on_track: usize,
}

impl LayerStats {
    fn log_summary(&self) {
        log::info!("=== Layer Summary ===");
        for (layer, count) in &self.written {
            log::info!("{}: {}", layer, count);
        }
        if self.must_on_track > 0 {
            log::info!("Nodes that must be on a track: {}", self.must_on_track);
        }
        if self.skipped > 0 {
            log::warn!("Features skipped (invalid geometry): {}", self.skipped);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    log::info!("=== OSM Railway Export ===");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output.display());

    // Validate input file exists
    if !args.input.exists() {
        bail!("Input file does not exist: {}", args.input.display());
    }

    let options = args.options();
    log::debug!("Options: {:?}", options);

    // Phase 1: Route relations
    let route_relations = if options.routes {
        log::info!("");
        log::info!("Phase 1: Reading PTv2 route relations...");
        extract_routes(&args.input).context("Failed to read route relations from PBF")?
    } else {
        log::info!("Phase 1: Skipping route relations");
        Vec::new()
    };

    // Phase 2: Nodes and ways
    log::info!("");
    log::info!("Phase 2: Reading nodes and ways...");
    let elements = extract_elements(&args.input, &options, route_relations)
        .context("Failed to extract elements from PBF")?;

    // Phase 3: Build layers
    log::info!("");
    log::info!("Phase 3: Building layers...");
    let enabled = options.enabled_layers();
    let mut layers = LayerSet::new(enabled.iter().copied());
    let mut stats = LayerStats {
        must_on_track: elements.must_on_track,
        ..LayerStats::default()
    };

    for node in &elements.tagged_nodes {
        for &layer in &node.layers {
            if let Err(err) = layers.add_node(layer, node) {
                log::debug!("Skipping node: {}", err);
                stats.skipped += 1;
            }
        }
    }

    for way in &elements.layer_ways {
        if let Err(err) = layers.add_way(way, &elements.nodes) {
            log::debug!("Skipping way: {}", err);
            stats.skipped += 1;
        }
    }

    // Phase 4: Route checks
    let mut route_stats = None;
    if options.routes {
        log::info!("");
        log::info!(
            "Phase 4: Checking {} route relations for gaps...",
            elements.route_relations.len()
        );
        let network = RouteNetwork {
            segments: &elements.route_segments,
            nodes: &elements.nodes,
        };
        let reports = check_routes(&elements.route_relations, &network);

        for (relation, report) in elements.route_relations.iter().zip(&reports) {
            if report.gaps > 0 {
                log::debug!(
                    "Relation {} ({}) has {} gaps",
                    report.relation_id,
                    report.name,
                    report.gaps
                );
                layers.add_route_gaps(relation, report, &network.route_lines(relation));
            }
        }

        std::fs::create_dir_all(&args.output).with_context(|| {
            format!("Failed to create output directory {}", args.output.display())
        })?;
        write_route_report(&reports, &args.output.join("ptv2_report.json"))
            .context("Failed to write route report")?;
        route_stats = Some(RouteStats::from_reports(&reports));
    }

    stats.written = enabled.iter().map(|l| (*l, layers.len(*l))).collect();

    // Phase 5: Write output
    log::info!("");
    log::info!("Phase 5: Writing layers...");
    layers
        .write_all(&args.output)
        .context("Failed to write GeoJSON layers")?;

    // Summary
    log::info!("");
    stats.log_summary();
    if let Some(route_stats) = route_stats {
        log::info!("");
        route_stats.log_summary();
    }
    log::info!("");
    log::info!("Output written to: {}", args.output.display());
    log::info!("Done!");

    Ok(())
}
