use anyhow::{bail, Context, Result};
use clap::Parser;
use headway_transit::prelude::{HaversineShapeResolver, ScheduleGenerator};
use std::path::PathBuf;
use std::time::Duration;

mod config;
mod output;

use config::load_config;
use output::{write_schedule_json, write_shapes_geojson};

#[derive(Parser, Debug)]
#[command(
    name = "timetable-gen",
    author,
    version,
    about = "Generate transit timetables from a JSON route and service description",
    long_about = "Reads stations, routes and operating parameters (service window, headway, \
                  fleet, speed, layover and an optional peak period) from a JSON file and \
                  writes every trip of the resulting schedule with its stop times.\n\n\
                  Shapes are resolved as straight lines between consecutive stops, with \
                  distances measured along the great circle."
)]
struct Args {
    /// Input JSON configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Output JSON file for the generated schedule
    #[arg(short, long)]
    output: PathBuf,

    /// Also output the resolved shapes as GeoJSON to this file
    #[arg(long)]
    shapes_output: Option<PathBuf>,

    /// Time allowed for resolving each direction's shape, in seconds
    #[arg(long, default_value = "30")]
    resolve_timeout_secs: u64,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    log::info!("=== Timetable Generator ===");
    log::info!("Config: {}", args.config.display());
    log::info!("Output: {}", args.output.display());

    if !args.config.exists() {
        bail!("Config file does not exist: {}", args.config.display());
    }
    if args.resolve_timeout_secs == 0 {
        bail!("--resolve-timeout-secs must be at least 1");
    }

    let config = load_config(&args.config)?;
    let (_, request) = config.build().context("Invalid configuration")?;

    let generator = ScheduleGenerator::new(HaversineShapeResolver::new())
        .with_resolve_timeout(Duration::from_secs(args.resolve_timeout_secs));

    let schedule = match generator.generate(&request) {
        Ok(schedule) => schedule,
        Err(err) if err.is_retryable() => {
            return Err(err).context("Shape resolution failed; running again may succeed");
        }
        Err(err) => return Err(err).context("Failed to generate schedule"),
    };

    if schedule.is_empty() {
        log::warn!("No trips generated: every service window is shorter than one headway");
    }

    write_schedule_json(&schedule, &args.output)?;
    if let Some(shapes_path) = &args.shapes_output {
        write_shapes_geojson(&schedule, shapes_path)?;
    }

    log::info!(
        "Done: {} trips operated by {} vehicles",
        schedule.trips().len(),
        schedule.vehicle_count()
    );

    Ok(())
}
