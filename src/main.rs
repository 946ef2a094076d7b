//! This file defines the obreduce binary entry point.

use std::path::Path;

use obreduce::cli;
use obreduce::error::ObReduceError;
use obreduce::filters;
use obreduce::grid::{AnalyticGrid, GridDefinition, PointGrid};
use obreduce::io;
use obreduce::models::PassConfig;
use obreduce::pass;
use obreduce::projection::LambertConformal;
use obreduce::tracing;

/// Application entry point
fn main() {
    let args = cli::parse();
    tracing::init_tracing();
    if let Err(err) = run(&args) {
        ::tracing::error!(error = %err, "superobbing failed");
        std::process::exit(1);
    }
}

fn build_grid(args: &cli::CommandLineArgs) -> Result<GridDefinition, ObReduceError> {
    let projection = LambertConformal::new(args.lat_1, args.lat_2, args.ref_lat, args.ref_lon);
    if let Some(points_path) = &args.grid_points {
        let points = io::read_grid_points(Path::new(points_path))?;
        let grid = PointGrid::from_points(projection, &points, args.cutoff_km)?;
        return Ok(GridDefinition::Points(grid));
    }
    let pair = |values: &Option<Vec<i64>>| values.as_ref().map(|v| (v[0], v[1]));
    let origin = pair(&args.grid_origin).unwrap_or((0, 0));
    let grid = AnalyticGrid::new(projection, args.grid_spacing_km, origin, pair(&args.grid_extent))?;
    Ok(GridDefinition::Analytic(grid))
}

fn run(args: &cli::CommandLineArgs) -> Result<(), ObReduceError> {
    let config: PassConfig = serde_json::from_str(&std::fs::read_to_string(&args.config)?)?;
    config.validate()?;
    let grid = build_grid(args)?;

    let mut observations = io::read_observations(Path::new(&args.input), &args.vertical_field)?;
    ::tracing::info!(count = observations.len(), "read observations");
    if let Some(types) = &args.select_types {
        observations = filters::select_types(observations, types);
    }
    if let Some(max_messages) = args.max_messages_per_station {
        observations = filters::limit_messages_per_station(observations, max_messages);
    }

    let records = pass::run_pass(&observations, &config, &grid)?;
    ::tracing::info!(count = records.len(), "writing superobs");
    io::write_superobs(Path::new(&args.output), &records, &args.vertical_field)?;
    Ok(())
}
