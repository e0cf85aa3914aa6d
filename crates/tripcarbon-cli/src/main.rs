mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use tripcarbon_cli::logging::{init_logging, LoggingConfig};
use tripcarbon_cli::output::OutputFormat;
use tripcarbon_lib::TripStep;

use crate::commands::layers::handle_layers_command;
use crate::commands::trip::{handle_trip_command, TripCommandArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Greenhouse-gas estimates for multi-modal trips")]
struct Cli {
    /// Directory holding the reference layers (defaults to TRIPCARBON_DATA_DIR
    /// or the platform data directory).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON file overriding routing settings and emission factors.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log warnings and errors unless RUST_LOG is set.
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the emissions of a trip.
    ///
    /// Steps are `lon,lat` for the origin and `MODE[:PARAM]@lon,lat` for every
    /// following stop, e.g. `--step 2.35,48.85 --step car:2@4.83,45.76`.
    Trip {
        /// Trip step, repeated in travel order.
        #[arg(long = "step", required = true, num_args = 1, allow_hyphen_values = true)]
        steps: Vec<TripStep>,

        /// Step of a second trip to compare against, repeated in travel order.
        #[arg(long = "alternative-step", num_args = 1, allow_hyphen_values = true)]
        alternative: Vec<TripStep>,

        /// Do not compare a single-leg trip with direct train, car, bus and plane.
        #[arg(long)]
        no_compare: bool,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Load the reference layers and list their regions.
    Layers,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env();
    init_logging(&if cli.quiet { logging.quiet() } else { logging });

    match cli.command {
        Command::Trip {
            steps,
            alternative,
            no_compare,
            format,
        } => handle_trip_command(
            cli.data_dir.as_deref(),
            cli.config.as_deref(),
            &TripCommandArgs {
                steps,
                alternative,
                no_compare,
                format,
            },
        ),
        Command::Layers => handle_layers_command(cli.data_dir.as_deref()),
    }
}
