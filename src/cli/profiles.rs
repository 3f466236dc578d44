use clap::Parser;

/// Arguments for the profiles command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List configured profiles:\n    instrumentor profiles\n\n\
                  Use another configuration directory:\n    instrumentor profiles --config-dir ./config")]
pub struct ProfilesArgs {
    /// Print API keys instead of masking them
    #[arg(long)]
    pub show_keys: bool,
}
