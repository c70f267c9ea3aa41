use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use voyage_core::geo::Point;
use voyage_core::{
    compute_fuel_metrics, plan_route, Cell, FuelModelConfig, GridStore, Mode, RouteCache,
    RouteSnapshot, HUBS,
};
use voyage_cli::terminal::ColorPalette;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Indian Ocean cargo-vessel route planning tools",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Select the output format for CLI responses.
    #[arg(long, value_enum, default_value_t = OutputFormat::default())]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a route between two geographic points using a grid store.
    Route(RouteArgs),
    /// Grid store maintenance.
    Grid {
        #[command(subcommand)]
        command: GridCommand,
    },
    /// Precompute routes between named hubs.
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand, Debug)]
enum GridCommand {
    /// Build a grid store database from a JSON array of cells.
    Import(GridImportArgs),
    /// Print summary statistics for a grid store database.
    Dump(GridDumpArgs),
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Precompute routes between every pair of named hubs.
    Warm(CacheWarmArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
struct RouteArgs {
    /// Path to the grid store database.
    #[arg(long)]
    grid: PathBuf,

    /// Starting point latitude.
    #[arg(long = "from-lat", allow_hyphen_values = true)]
    from_lat: f64,
    /// Starting point longitude.
    #[arg(long = "from-lon", allow_hyphen_values = true)]
    from_lon: f64,
    /// Destination latitude.
    #[arg(long = "to-lat", allow_hyphen_values = true)]
    to_lat: f64,
    /// Destination longitude.
    #[arg(long = "to-lon", allow_hyphen_values = true)]
    to_lon: f64,

    /// Routing mode.
    #[arg(long, value_enum, default_value_t = ModeArg::Optimal)]
    mode: ModeArg,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ModeArg {
    Fuel,
    Optimal,
    Safe,
    Ulcv,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Fuel => Mode::Fuel,
            ModeArg::Optimal => Mode::Optimal,
            ModeArg::Safe => Mode::Safe,
            ModeArg::Ulcv => Mode::Ulcv,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct GridImportArgs {
    /// Path to a JSON file containing an array of cells.
    #[arg(long)]
    input: PathBuf,
    /// Grid resolution in degrees.
    #[arg(long, default_value_t = voyage_core::DEFAULT_RESOLUTION)]
    resolution: f64,
    /// Path to write the resulting grid store database. Overwritten if it
    /// already exists.
    #[arg(long)]
    output: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct GridDumpArgs {
    /// Path to the grid store database.
    #[arg(long)]
    grid: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct CacheWarmArgs {
    /// Path to the grid store database.
    #[arg(long)]
    grid: PathBuf,
    /// Routing modes to precompute. Defaults to all three.
    #[arg(long, value_enum, num_args = 1.., value_delimiter = ',')]
    modes: Vec<ModeArg>,
    /// Optional path to write the precomputed routes as JSON.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct RouteOutput {
    mode: Mode,
    distance_km: f64,
    point_count: usize,
    skipped_segments: usize,
    total_tons: f64,
    duration_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
struct WarmEntry {
    from_hub: String,
    to_hub: String,
    mode: Mode,
    distance_km: f64,
    points: Vec<voyage_core::RoutePoint>,
}

#[derive(Debug, Clone, Serialize)]
struct WarmSummary {
    attempted: usize,
    succeeded: usize,
    failed: usize,
}

impl OutputFormat {
    fn render_route(self, output: &RouteOutput, palette: &ColorPalette) -> Result<()> {
        match self {
            OutputFormat::Text => {
                println!(
                    "{bold}route{reset} ({mode:?}): {blue}{distance:.1} km{reset}, \
                     {point_count} waypoints, {fuel:.2} t fuel, {hours:.1} h",
                    bold = palette.white_bold,
                    reset = palette.reset,
                    mode = output.mode,
                    blue = palette.blue,
                    distance = output.distance_km,
                    point_count = output.point_count,
                    fuel = output.total_tons,
                    hours = output.duration_hours,
                );
                if output.skipped_segments > 0 {
                    println!(
                        "{yellow}warning:{reset} {n} coarse segment(s) skipped",
                        yellow = palette.yellow,
                        reset = palette.reset,
                        n = output.skipped_segments
                    );
                }
            }
            OutputFormat::Json => {
                let mut stdout = io::stdout();
                serde_json::to_writer_pretty(&mut stdout, output)?;
                stdout.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    fn render_grid_stats(self, stats: &voyage_core::GridStats) -> Result<()> {
        match self {
            OutputFormat::Text => {
                println!(
                    "cells: {total} (land: {land}, obstacle: {obstacle}, weathered: {weathered})",
                    total = stats.total_cells,
                    land = stats.land_cells,
                    obstacle = stats.obstacle_cells,
                    weathered = stats.cells_with_weather,
                );
                println!(
                    "resolution: {res} deg, bounds: lat [{lat_min}, {lat_max}], lon [{lon_min}, {lon_max}]",
                    res = stats.resolution,
                    lat_min = stats.bounds.lat_min,
                    lat_max = stats.bounds.lat_max,
                    lon_min = stats.bounds.lon_min,
                    lon_max = stats.bounds.lon_max,
                );
            }
            OutputFormat::Json => {
                let mut stdout = io::stdout();
                serde_json::to_writer_pretty(&mut stdout, stats)?;
                stdout.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    fn render_warm_summary(self, summary: &WarmSummary) -> Result<()> {
        match self {
            OutputFormat::Text => {
                println!(
                    "warmed {succeeded}/{attempted} hub routes ({failed} failed)",
                    succeeded = summary.succeeded,
                    attempted = summary.attempted,
                    failed = summary.failed,
                );
            }
            OutputFormat::Json => {
                let mut stdout = io::stdout();
                serde_json::to_writer_pretty(&mut stdout, summary)?;
                stdout.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let format = cli.global.format;
    let palette = ColorPalette::detect();

    match cli.command {
        Command::Route(args) => handle_route(&args, format, &palette),
        Command::Grid { command } => match command {
            GridCommand::Import(args) => handle_grid_import(&args, format),
            GridCommand::Dump(args) => handle_grid_dump(&args, format),
        },
        Command::Cache { command } => match command {
            CacheCommand::Warm(args) => handle_cache_warm(&args, format),
        },
    }
}

fn handle_route(args: &RouteArgs, format: OutputFormat, palette: &ColorPalette) -> Result<()> {
    let store = open_grid_store(&args.grid)?;
    let start = Point::new(args.from_lat, args.from_lon);
    let end = Point::new(args.to_lat, args.to_lon);
    let mode: Mode = args.mode.into();

    let route = plan_route(&store, start, end, mode)
        .with_context(|| format!("failed to plan route from {start:?} to {end:?}"))?;

    let fuel = compute_fuel_metrics(&FuelModelConfig::default(), route.distance_km, mode, 0.0)
        .context("failed to compute fuel metrics for planned route")?;

    let output = RouteOutput {
        mode,
        distance_km: route.distance_km,
        point_count: route.points.len(),
        skipped_segments: route.skipped_segments,
        total_tons: fuel.total_tons,
        duration_hours: fuel.duration_hours,
    };
    format.render_route(&output, palette)
}

fn handle_grid_import(args: &GridImportArgs, format: OutputFormat) -> Result<()> {
    let contents = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let cells: Vec<Cell> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse cells from {}", args.input.display()))?;

    if cells.is_empty() {
        bail!("input file {} contains no cells", args.input.display());
    }

    let store = GridStore::create_at_path(&args.output, args.resolution, cells)
        .with_context(|| format!("failed to write grid store to {}", args.output.display()))?;

    tracing::info!(path = %args.output.display(), "grid store imported");
    format.render_grid_stats(&store.stats()?)
}

fn handle_grid_dump(args: &GridDumpArgs, format: OutputFormat) -> Result<()> {
    let store = open_grid_store(&args.grid)?;
    format.render_grid_stats(&store.stats()?)
}

fn handle_cache_warm(args: &CacheWarmArgs, format: OutputFormat) -> Result<()> {
    let store = open_grid_store(&args.grid)?;
    let modes: Vec<Mode> = if args.modes.is_empty() {
        vec![Mode::Fuel, Mode::Optimal, Mode::Safe]
    } else {
        args.modes.iter().copied().map(Mode::from).collect()
    };

    let mut cache = RouteCache::default_config();
    let mut entries = Vec::new();
    let mut attempted = 0;
    let mut succeeded = 0;

    for (from_name, from_lat, from_lon) in HUBS {
        for (to_name, to_lat, to_lon) in HUBS {
            if from_name == to_name {
                continue;
            }
            for &mode in &modes {
                attempted += 1;
                let start = Point::new(*from_lat, *from_lon);
                let end = Point::new(*to_lat, *to_lon);
                match plan_route(&store, start, end, mode) {
                    Ok(route) => {
                        succeeded += 1;
                        let key = voyage_core::HubKey {
                            from_hub: from_name.to_string(),
                            to_hub: to_name.to_string(),
                            mode: mode.into(),
                        };
                        let snapshot = RouteSnapshot::from(&route);
                        if args.output.is_some() {
                            entries.push(WarmEntry {
                                from_hub: from_name.to_string(),
                                to_hub: to_name.to_string(),
                                mode,
                                distance_km: snapshot.distance_km,
                                points: snapshot.points.clone(),
                            });
                        }
                        cache.put(key, snapshot);
                    }
                    Err(e) => {
                        tracing::warn!(from = %from_name, to = %to_name, mode = ?mode, error = %e, "hub route warm-up failed");
                    }
                }
            }
        }
    }

    if let Some(output_path) = &args.output {
        let json = serde_json::to_string_pretty(&entries)
            .context("failed to serialize warmed routes")?;
        std::fs::write(output_path, json)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
    }

    let summary = WarmSummary {
        attempted,
        succeeded,
        failed: attempted - succeeded,
    };
    format.render_warm_summary(&summary)?;

    if summary.failed > 0 {
        bail!("{} of {} hub routes could not be computed", summary.failed, summary.attempted);
    }
    Ok(())
}

fn open_grid_store(path: &std::path::Path) -> Result<GridStore> {
    if !path.exists() {
        bail!("grid store not found: {}", path.display());
    }
    GridStore::open(path).with_context(|| format!("failed to open grid store {}", path.display()))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
