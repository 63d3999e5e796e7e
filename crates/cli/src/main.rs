//! terrawalk CLI - pedestrian travel time over terrain rasters

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use terrawalk_algorithms::barrier::{cliff_barrier, water_barrier, CliffParams, WaterParams, WaterSource};
use terrawalk_algorithms::graph::{CostLayers, GraphBuilder, GraphParams, TravelGraph};
use terrawalk_algorithms::path::{solve_many, travel_time_surface, SolverParams};
use terrawalk_core::io::{read_geojson, read_geotiff, write_geojson, write_geotiff};
use terrawalk_core::raster::Neighborhood;
use terrawalk_core::{AttributeValue, Error, FeatureCollection, Raster, RasterElement};
use terrawalk_parallel::{num_cpus, ProcessingMode};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "terrawalk")]
#[command(author, version, about = "Pedestrian travel time over terrain rasters", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Derive barrier masks (1 = passable, 0 = impassable)
    Barriers {
        #[command(subcommand)]
        kind: BarrierCommands,
    },
    /// Least-cost walking routes from one origin to one or more destinations
    Route {
        #[command(flatten)]
        layers: LayerArgs,
        /// Output GeoJSON with one LineString per reachable destination
        output: PathBuf,
        /// Origin as x,y in the rasters' CRS
        #[arg(long, value_parser = parse_coord, allow_hyphen_values = true)]
        from: (f64, f64),
        /// Destination as x,y; repeat for several
        #[arg(long, value_parser = parse_coord, allow_hyphen_values = true, required = true)]
        to: Vec<(f64, f64)>,
        #[command(flatten)]
        graph: GraphArgs,
    },
    /// Cumulative travel time in seconds from one origin to every cell
    TravelTime {
        #[command(flatten)]
        layers: LayerArgs,
        /// Output GeoTIFF (NaN where unreachable)
        output: PathBuf,
        /// Origin as x,y in the rasters' CRS
        #[arg(long, value_parser = parse_coord, allow_hyphen_values = true)]
        from: (f64, f64),
        #[command(flatten)]
        graph: GraphArgs,
    },
}

// ─── Barrier subcommands ────────────────────────────────────────────────

#[derive(Subcommand)]
enum BarrierCommands {
    /// Mark cells at or above a slope angle as cliffs
    Cliff {
        /// Input DEM file
        input: PathBuf,
        /// Output mask file
        output: PathBuf,
        /// Slope threshold in degrees
        #[arg(short, long, default_value = "45")]
        threshold: f64,
        /// Worker threads (default: all cores)
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Rasterize waterbody polygons onto the DEM grid
    Water {
        /// Input DEM file (defines the grid)
        input: PathBuf,
        /// Waterbody polygons (GeoJSON)
        polygons: PathBuf,
        /// Output mask file
        output: PathBuf,
        /// Worker threads (default: all cores)
        #[arg(long)]
        threads: Option<usize>,
    },
}

// ─── Shared arguments ───────────────────────────────────────────────────

#[derive(Args)]
struct LayerArgs {
    /// Elevation raster
    dem: PathBuf,
    /// Vegetation density raster
    density: PathBuf,
    /// Surface roughness raster
    roughness: PathBuf,
    /// Cliff mask raster
    cliff: PathBuf,
    /// Water mask raster
    water: PathBuf,
}

#[derive(Args)]
struct GraphArgs {
    /// Worker threads (default: all cores)
    #[arg(long)]
    threads: Option<usize>,
    /// Neighborhood: rook4, queen8, knight16
    #[arg(short, long, default_value = "knight16")]
    neighborhood: String,
}

impl GraphArgs {
    fn params(&self) -> Result<GraphParams> {
        let neighborhood = match self.neighborhood.to_lowercase().as_str() {
            "rook4" | "4" => Neighborhood::Rook4,
            "queen8" | "8" => Neighborhood::Queen8,
            "knight16" | "16" => Neighborhood::Knight16,
            other => bail!("Unknown neighborhood: {}. Use: rook4, queen8, knight16", other),
        };
        Ok(GraphParams {
            neighborhood,
            mode: processing_mode(self.threads),
        })
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn processing_mode(threads: Option<usize>) -> ProcessingMode {
    threads.map_or(ProcessingMode::Parallel, ProcessingMode::ParallelWith)
}

fn parse_coord(s: &str) -> std::result::Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{}'", s))?;
    let num = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{}': {}", v, e))
    };
    Ok((num(x)?, num(y)?))
}

fn read_raster<T: RasterElement>(path: &Path) -> Result<Raster<T>> {
    let pb = spinner(&format!("Reading {}...", path.display()));
    let raster: Raster<T> =
        read_geotiff(path).with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {} ({})", raster.cols(), raster.rows(), path.display());
    Ok(raster)
}

fn write_result<T: RasterElement>(raster: &Raster<T>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

/// Read the five layers and build the travel graph
fn build_graph(args: &LayerArgs, graph: &GraphArgs) -> Result<TravelGraph> {
    let elevation = read_raster::<f64>(&args.dem)?;
    let density = read_raster::<f64>(&args.density)?;
    let roughness = read_raster::<f64>(&args.roughness)?;
    let cliff = read_raster::<u8>(&args.cliff)?;
    let water = read_raster::<u8>(&args.water)?;

    let layers = CostLayers {
        elevation: &elevation,
        density: &density,
        roughness: &roughness,
        cliff: &cliff,
        water: &water,
    };

    info!("Workers: {}", graph.threads.unwrap_or_else(num_cpus));
    let pb = spinner("Building travel graph...");
    let built = GraphBuilder::new(layers)
        .context("Input layers are not congruent")?
        .build(&graph.params()?)
        .context("Failed to build travel graph")?;
    pb.finish_and_clear();

    let summary = built.summary();
    info!(
        "Graph: {} cells, {} edges ({} blocked by barriers, {} degenerate)",
        summary.cells, summary.edges, summary.barrier_edges, summary.degenerate_edges
    );
    Ok(built)
}

fn locate(graph: &TravelGraph, (x, y): (f64, f64), what: &str) -> Result<(usize, usize)> {
    match graph.cell_at(x, y) {
        Some(cell) => Ok(cell),
        None => bail!("{} ({}, {}) is outside the grid", what, x, y),
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let raster = read_raster::<f64>(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len().max(1) as f64
            );
        }

        // ── Barriers ─────────────────────────────────────────────────
        Commands::Barriers { kind } => match kind {
            BarrierCommands::Cliff {
                input,
                output,
                threshold,
                threads,
            } => {
                let dem = read_raster::<f64>(&input)?;
                let start = Instant::now();
                let params = CliffParams {
                    threshold_degrees: threshold,
                    mode: processing_mode(threads),
                };
                let mask = cliff_barrier(&dem, &params).context("Failed to derive cliff barrier")?;
                let elapsed = start.elapsed();
                write_result(&mask, &output)?;
                done("Cliff mask", &output, elapsed);
            }
            BarrierCommands::Water {
                input,
                polygons,
                output,
                threads,
            } => {
                let dem = read_raster::<f64>(&input)?;
                let features = read_geojson(&polygons)
                    .with_context(|| format!("Failed to read polygons {}", polygons.display()))?;
                info!("Polygons: {} features", features.len());

                let start = Instant::now();
                let params = WaterParams {
                    mode: processing_mode(threads),
                };
                let mask = water_barrier(&dem, WaterSource::Polygons(&features), &params)
                    .context("Failed to rasterize water barrier")?;
                let elapsed = start.elapsed();
                write_result(&mask, &output)?;
                done("Water mask", &output, elapsed);
            }
        },

        // ── Routing ──────────────────────────────────────────────────
        Commands::Route {
            layers,
            output,
            from,
            to,
            graph,
        } => {
            let start = Instant::now();
            let travel = build_graph(&layers, &graph)?;
            let origin = locate(&travel, from, "Origin")?;

            let mut queries = Vec::with_capacity(to.len());
            for &dest in &to {
                queries.push((origin, locate(&travel, dest, "Destination")?));
            }

            let pb = spinner(&format!("Solving {} route(s)...", queries.len()));
            let params = SolverParams {
                mode: processing_mode(graph.threads),
            };
            let results = solve_many(&travel, &queries, &params).context("Failed to solve routes")?;
            pb.finish_and_clear();

            let mut routes = FeatureCollection::new();
            routes.crs = travel.crs().cloned();
            for (i, result) in results.into_iter().enumerate() {
                match result {
                    Ok(path) => {
                        info!(
                            "Destination {}: {:.1} s over {:.1} m",
                            i,
                            path.travel_time,
                            path.length()
                        );
                        let mut feature = path.to_feature();
                        feature.set_property("destination", AttributeValue::Int(i as i64));
                        routes.push(feature);
                    }
                    Err(e @ Error::NoPath { .. }) => warn!("Destination {}: {}", i, e),
                    Err(e) => return Err(e).context("Route query failed"),
                }
            }
            let elapsed = start.elapsed();

            write_geojson(&routes, &output).context("Failed to write routes")?;
            done(&format!("{} route(s)", routes.len()), &output, elapsed);
        }

        Commands::TravelTime {
            layers,
            output,
            from,
            graph,
        } => {
            let start = Instant::now();
            let travel = build_graph(&layers, &graph)?;
            let origin = locate(&travel, from, "Origin")?;

            let pb = spinner("Computing travel times...");
            let surface = travel_time_surface(&travel, origin).context("Failed to compute travel times")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            write_result(&surface, &output)?;
            done("Travel time", &output, elapsed);
        }
    }

    Ok(())
}
