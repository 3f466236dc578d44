//! CLI definitions using clap derive API
//!
//! Each command's argument types live in their own submodule:
//! - install: Install command arguments
//! - profiles: Profiles command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod install;
pub mod profiles;

pub use completions::CompletionsArgs;
pub use install::InstallArgs;
pub use profiles::ProfilesArgs;

/// Instrumentor - install monitoring instrumentation on this host
#[derive(Parser, Debug)]
#[command(
    name = "instrumentor",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Install monitoring instrumentation recipes on this host",
    long_about = "Instrumentor discovers what runs on this host, picks matching instrumentation \
                  recipes, installs the infrastructure agent, log forwarding and integrations, \
                  and confirms that data arrives.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  instrumentor install                          \x1b[90m# Install recommended recipes\x1b[0m\n   \
                  instrumentor install -n mysql -n redis        \x1b[90m# Install recipes by name\x1b[0m\n   \
                  instrumentor install -c ./nginx.yml           \x1b[90m# Install a recipe file\x1b[0m\n   \
                  instrumentor install --skip-logging           \x1b[90m# Skip log forwarding\x1b[0m\n   \
                  instrumentor profiles                         \x1b[90m# List configured profiles\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Profile to use from profiles.yaml
    #[arg(long, global = true, env = "INSTRUMENTOR_PROFILE")]
    pub profile: Option<String>,

    /// Configuration directory (defaults to the platform config dir)
    #[arg(long, global = true, env = "INSTRUMENTOR_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install instrumentation recipes
    Install(InstallArgs),

    /// List configured profiles
    Profiles(ProfilesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
