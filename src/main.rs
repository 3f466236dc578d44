//! Instrumentor - monitoring instrumentation installer
//!
//! Discovers what runs on the host, selects instrumentation recipes, and
//! installs the infrastructure agent, log forwarding, and integrations,
//! confirming that each one reports data.

use clap::Parser;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

mod cancel;
mod cli;
mod commands;
mod config;
mod discovery;
mod error;
mod execution;
mod install;
mod logs;
mod progress;
mod recipe;
mod status;
mod validation;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    debug!("Instrumentor started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(cli.config_dir, cli.profile, args),
        Commands::Profiles(args) => commands::profiles::run(cli.config_dir, args),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
