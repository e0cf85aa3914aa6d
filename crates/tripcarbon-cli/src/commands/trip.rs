//! Trip command handler.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use tripcarbon_lib::trip::MAIN_TRIP;
use tripcarbon_lib::{compute_custom_trip, compute_request, Palette, TripOutcome, TripStep};

use crate::commands::build_engine;
use tripcarbon_cli::output::{render, OutputFormat};
use tripcarbon_cli::terminal::ColorPalette;

/// Arguments for the trip command.
#[derive(Debug, Clone)]
pub struct TripCommandArgs {
    pub steps: Vec<TripStep>,
    pub alternative: Vec<TripStep>,
    /// Skip the direct-trip comparison of single-leg trips.
    pub no_compare: bool,
    pub format: OutputFormat,
}

pub fn handle_trip_command(
    data_dir: Option<&Path>,
    config: Option<&Path>,
    args: &TripCommandArgs,
) -> Result<()> {
    let engine = build_engine(data_dir, config)?;

    let outcome = if args.no_compare && args.alternative.is_empty() {
        let trip = compute_custom_trip(&engine, MAIN_TRIP, &args.steps, &Palette::custom())?;
        TripOutcome {
            trips: vec![trip.result],
            geometries: trip.geometries,
        }
    } else {
        let alternative = (!args.alternative.is_empty()).then_some(args.alternative.as_slice());
        compute_request(&engine, &args.steps, alternative)?
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&mut out, &outcome, args.format, &ColorPalette::detect())
        .context("failed to write the report")?;
    Ok(())
}
