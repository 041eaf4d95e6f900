//! PlaceGis CLI - Vector analysis for place and trip tables

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use placegis_algorithms::reproject::{auto_utm_crs, reproject_collection};
use placegis_algorithms::vector::{
    attribute_join, buffer_collection, clip_collection, collection_bounds, convex_hull_feature,
    dissolve, od_lines, spatial_join, BufferParams, ClipRect, JoinKind, OdLineParams,
    SpatialPredicate,
};
use placegis_cloud::blocking::fetch_to_file;
use placegis_cloud::FetchOptions;
use placegis_core::io::{read_geojson, read_points_csv, read_table_csv, write_geojson, CsvOptions};
use placegis_core::{Crs, FeatureCollection};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "placegis")]
#[command(author, version, about = "Vector analysis for place and trip tables", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a dataset (CSV or GeoJSON)
    Info {
        /// Input file
        input: PathBuf,
    },
    /// Build a point layer from a CSV with coordinate columns
    Points {
        /// Input CSV file
        input: PathBuf,
        /// Output GeoJSON file
        output: PathBuf,
        /// Column holding the longitude
        #[arg(long, default_value = "longitude")]
        lon_column: String,
        /// Column holding the latitude
        #[arg(long, default_value = "latitude")]
        lat_column: String,
        /// Column to use as the feature id
        #[arg(long)]
        id_column: Option<String>,
        /// Drop rows without usable coordinates
        #[arg(long)]
        drop_missing: bool,
    },
    /// Reproject a layer to another CRS
    Reproject {
        /// Input GeoJSON file
        input: PathBuf,
        /// Output GeoJSON file
        output: PathBuf,
        /// Target CRS: an EPSG code, "epsg:NNNN", "mercator", or "utm" (auto zone)
        #[arg(short, long)]
        to: String,
    },
    /// Convex hull of a point layer
    Hull {
        /// Input GeoJSON file
        input: PathBuf,
        /// Output GeoJSON file (single polygon feature)
        output: PathBuf,
    },
    /// Attribute join on a shared key column
    Join {
        /// Left layer (GeoJSON or CSV; geometry comes from this side)
        left: PathBuf,
        /// Right table (CSV)
        right: PathBuf,
        /// Output GeoJSON file
        output: PathBuf,
        /// Key column present on both sides
        #[arg(long)]
        on: String,
        /// Join kind: inner, left
        #[arg(long, default_value = "inner")]
        kind: String,
    },
    /// Spatial join: attach polygon attributes to points
    Sjoin {
        /// Point layer (GeoJSON)
        points: PathBuf,
        /// Polygon layer (GeoJSON)
        polygons: PathBuf,
        /// Output GeoJSON file
        output: PathBuf,
        /// Predicate: within, intersects
        #[arg(long, default_value = "within")]
        predicate: String,
        /// Join kind: inner, left
        #[arg(long, default_value = "inner")]
        kind: String,
    },
    /// Buffer point features (projected layers only)
    Buffer {
        /// Input GeoJSON file
        input: PathBuf,
        /// Output GeoJSON file
        output: PathBuf,
        /// Buffer radius in CRS units
        #[arg(short, long)]
        distance: f64,
        /// Segments approximating each circle
        #[arg(short, long, default_value = "32")]
        segments: usize,
    },
    /// Clip a layer to a rectangular extent
    Clip {
        /// Input GeoJSON file
        input: PathBuf,
        /// Output GeoJSON file
        output: PathBuf,
        /// Extent as "minx,miny,maxx,maxy"
        #[arg(short, long)]
        bounds: String,
    },
    /// Dissolve polygon features by an attribute
    Dissolve {
        /// Input GeoJSON file
        input: PathBuf,
        /// Output GeoJSON file
        output: PathBuf,
        /// Attribute column to group by
        #[arg(long)]
        by: String,
    },
    /// Build origin→destination lines from a trips table
    OdLines {
        /// Place layer (GeoJSON with point geometries)
        places: PathBuf,
        /// Trips table (CSV)
        trips: PathBuf,
        /// Output GeoJSON file
        output: PathBuf,
        /// Key column identifying places
        #[arg(long, default_value = "id")]
        place_key: String,
        /// Trips column naming the origin place
        #[arg(long, default_value = "origin_id")]
        origin_column: String,
        /// Trips column naming the destination place
        #[arg(long, default_value = "place_id")]
        dest_column: String,
    },
    /// Download a remote dataset
    Fetch {
        /// Dataset URL
        url: String,
        /// Output file
        output: PathBuf,
        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
        /// Retries on timeout/connect failures
        #[arg(long, default_value = "3")]
        retries: u32,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Read a layer, dispatching on the file extension: `.csv` becomes an
/// attribute-only table, anything else is parsed as GeoJSON.
fn read_layer(path: &Path) -> Result<FeatureCollection> {
    let pb = spinner("Reading dataset...");
    let is_csv = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    let collection = if is_csv {
        read_table_csv(path, &CsvOptions::default())
    } else {
        read_geojson(path)
    }
    .with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} features, {} columns", collection.len(), collection.columns().len());
    Ok(collection)
}

fn read_vector(path: &Path) -> Result<FeatureCollection> {
    let pb = spinner("Reading layer...");
    let collection =
        read_geojson(path).with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} features ({})", collection.len(), collection.crs);
    Ok(collection)
}

fn write_result(collection: &FeatureCollection, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geojson(collection, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_join_kind(s: &str) -> Result<JoinKind> {
    match s.to_lowercase().as_str() {
        "inner" | "i" => Ok(JoinKind::Inner),
        "left" | "l" => Ok(JoinKind::Left),
        _ => anyhow::bail!("Unknown join kind: {}. Use inner or left.", s),
    }
}

fn parse_predicate(s: &str) -> Result<SpatialPredicate> {
    match s.to_lowercase().as_str() {
        "within" | "w" => Ok(SpatialPredicate::Within),
        "intersects" | "int" => Ok(SpatialPredicate::Intersects),
        _ => anyhow::bail!("Unknown predicate: {}. Use within or intersects.", s),
    }
}

fn parse_target_crs(s: &str, collection: &FeatureCollection) -> Result<Crs> {
    let lower = s.to_lowercase();
    if lower == "utm" {
        return auto_utm_crs(collection).context("Cannot pick a UTM zone automatically");
    }
    if lower == "mercator" || lower == "webmercator" {
        return Ok(Crs::web_mercator());
    }
    let code = lower
        .strip_prefix("epsg:")
        .unwrap_or(&lower)
        .parse::<u32>()
        .with_context(|| format!("Invalid CRS: {}", s))?;
    Ok(Crs::from_epsg(code))
}

fn parse_bounds(s: &str) -> Result<ClipRect> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().context("Invalid bounds value"))
        .collect::<Result<Vec<f64>>>()?;
    if parts.len() != 4 {
        anyhow::bail!("Bounds must be 'minx,miny,maxx,maxy', got: {}", s);
    }
    if parts[0] >= parts[2] || parts[1] >= parts[3] {
        anyhow::bail!("Bounds must satisfy minx < maxx and miny < maxy");
    }
    Ok(ClipRect::new(parts[0], parts[1], parts[2], parts[3]))
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let collection = read_layer(&input)?;

            println!("File: {}", input.display());
            println!("Features: {}", collection.len());
            println!(
                "With geometry: {} ({} without)",
                collection.geometry_count(),
                collection.len() - collection.geometry_count()
            );
            println!("CRS: {}", collection.crs);
            if let Some(bb) = collection_bounds(&collection) {
                println!(
                    "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                    bb.min_x, bb.min_y, bb.max_x, bb.max_y
                );
            }
            println!("\nColumns:");
            for (name, nulls) in collection.null_counts() {
                if nulls > 0 {
                    println!("  {} ({} null)", name, nulls);
                } else {
                    println!("  {}", name);
                }
            }
        }

        // ── Points ───────────────────────────────────────────────────
        Commands::Points {
            input,
            output,
            lon_column,
            lat_column,
            id_column,
            drop_missing,
        } => {
            let options = CsvOptions {
                lon_column,
                lat_column,
                id_column,
                ..CsvOptions::default()
            };
            let pb = spinner("Reading CSV...");
            let collection = read_points_csv(&input, &options)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            pb.finish_and_clear();

            let missing = collection.len() - collection.geometry_count();
            if missing > 0 {
                info!("{} rows without usable coordinates", missing);
            }
            let start = Instant::now();
            let collection = if drop_missing {
                collection.drop_missing_geometry()
            } else {
                collection
            };
            let elapsed = start.elapsed();
            write_result(&collection, &output)?;
            done("Point layer", &output, elapsed);
        }

        // ── Reproject ────────────────────────────────────────────────
        Commands::Reproject { input, output, to } => {
            let collection = read_vector(&input)?;
            let target = parse_target_crs(&to, &collection)?;
            let start = Instant::now();
            let result = reproject_collection(&collection, &target)
                .context("Failed to reproject")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            println!("Reprojected {} -> {}", collection.crs, result.crs);
            done("Reprojected layer", &output, elapsed);
        }

        // ── Hull ─────────────────────────────────────────────────────
        Commands::Hull { input, output } => {
            let collection = read_vector(&input)?;
            let start = Instant::now();
            let result = convex_hull_feature(&collection)
                .context("Failed to compute convex hull")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            done("Convex hull", &output, elapsed);
        }

        // ── Join ─────────────────────────────────────────────────────
        Commands::Join {
            left,
            right,
            output,
            on,
            kind,
        } => {
            let kind = parse_join_kind(&kind)?;
            let left_fc = read_layer(&left)?;
            let right_fc = read_layer(&right)?;
            let start = Instant::now();
            let result = attribute_join(&left_fc, &right_fc, &on, kind)
                .context("Failed to join tables")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            println!(
                "Joined {} x {} -> {} features",
                left_fc.len(),
                right_fc.len(),
                result.len()
            );
            done("Attribute join", &output, elapsed);
        }

        // ── Sjoin ────────────────────────────────────────────────────
        Commands::Sjoin {
            points,
            polygons,
            output,
            predicate,
            kind,
        } => {
            let predicate = parse_predicate(&predicate)?;
            let kind = parse_join_kind(&kind)?;
            let points_fc = read_vector(&points)?;
            let polygons_fc = read_vector(&polygons)?;
            let start = Instant::now();
            let result = spatial_join(&points_fc, &polygons_fc, predicate, kind)
                .context("Failed to spatially join layers")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            println!(
                "Matched {} of {} points",
                result.len(),
                points_fc.len()
            );
            done("Spatial join", &output, elapsed);
        }

        // ── Buffer ───────────────────────────────────────────────────
        Commands::Buffer {
            input,
            output,
            distance,
            segments,
        } => {
            let collection = read_vector(&input)?;
            let start = Instant::now();
            let result = buffer_collection(&collection, &BufferParams { distance, segments })
                .context("Failed to buffer points")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            done("Buffers", &output, elapsed);
        }

        // ── Clip ─────────────────────────────────────────────────────
        Commands::Clip {
            input,
            output,
            bounds,
        } => {
            let rect = parse_bounds(&bounds)?;
            let collection = read_vector(&input)?;
            let start = Instant::now();
            let result = clip_collection(&collection, rect);
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            println!("Kept {} of {} features", result.len(), collection.len());
            done("Clipped layer", &output, elapsed);
        }

        // ── Dissolve ─────────────────────────────────────────────────
        Commands::Dissolve { input, output, by } => {
            let collection = read_vector(&input)?;
            let start = Instant::now();
            let result = dissolve(&collection, &by).context("Failed to dissolve")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            println!("{} groups", result.len());
            done("Dissolved layer", &output, elapsed);
        }

        // ── OdLines ──────────────────────────────────────────────────
        Commands::OdLines {
            places,
            trips,
            output,
            place_key,
            origin_column,
            dest_column,
        } => {
            let places_fc = read_vector(&places)?;
            let trips_fc = read_layer(&trips)?;
            let params = OdLineParams {
                place_key,
                origin_column,
                dest_column,
            };
            let start = Instant::now();
            let result = od_lines(&places_fc, &trips_fc, &params)
                .context("Failed to build OD lines")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            println!(
                "Built {} lines from {} trips",
                result.len(),
                trips_fc.len()
            );
            done("OD lines", &output, elapsed);
        }

        // ── Fetch ────────────────────────────────────────────────────
        Commands::Fetch {
            url,
            output,
            timeout,
            retries,
        } => {
            let options = FetchOptions {
                timeout: Duration::from_secs(timeout),
                max_retries: retries,
            };
            let pb = spinner("Downloading...");
            let start = Instant::now();
            let bytes = fetch_to_file(&url, &output, &options)
                .with_context(|| format!("Failed to fetch {}", url))?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();
            println!("Downloaded {} bytes", bytes);
            done("Dataset", &output, elapsed);
        }
    }

    Ok(())
}
