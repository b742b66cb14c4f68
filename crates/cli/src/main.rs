//! ffbench - Force-Feedback Effect Workbench CLI
//!
//! Drives the workbench engine against a simulated device: probe device
//! capabilities, inspect the effect catalog, and replay an editing session.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod output;
mod rig;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ffbench_engine::SetupError;

#[derive(Parser)]
#[command(name = "ffbench")]
#[command(
    about = "Force-Feedback Effect Workbench - negotiate devices, build catalogs, edit live effects"
)]
#[command(version)]
#[command(long_about = "
ffbench exercises the force-feedback workbench engine against a simulated
device: capability negotiation, effect catalog construction, and live
parameter editing with driver write rejections absorbed along the way.

Use --json for machine-readable output suitable for scripting, and -v/-vv
to watch the engine's negotiation and synchronization decisions.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Actuator axes on the simulated wheelbase
    #[arg(
        long,
        global = true,
        env = "FFBENCH_AXES",
        default_value_t = 2,
        value_parser = clap::value_parser!(u8).range(1..=2)
    )]
    axes: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate simulated devices and their capabilities
    Probe,

    /// List the effect catalog for the selected device
    Effects {
        /// Admit periodic effect types into the catalog
        #[arg(long)]
        all: bool,
    },

    /// Replay a scripted editing session and dump the surface state
    Run {
        /// Simulate a driver that rejects gain and direction writes
        #[arg(long)]
        flaky: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "ffbench={log_level},ffbench_engine={log_level},ffbench_driver={log_level}"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Handle errors with appropriate exit codes
    match execute_command(&cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = match e.downcast_ref::<SetupError>() {
                Some(SetupError::NoSuitableDevice) => 2,
                Some(SetupError::EmptyCatalog) => 3,
                Some(SetupError::DeviceConfig { .. }) => 4,
                _ => 1,
            };

            std::process::exit(exit_code);
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Probe => commands::probe::execute(cli.axes, cli.json),
        Commands::Effects { all } => commands::effects::execute(cli.axes, *all, cli.json),
        Commands::Run { flaky } => commands::run::execute(cli.axes, *flaky, cli.json),
    }
}
