use clap::Parser;
use std::path::PathBuf;

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install the recipes recommended for this host:\n    instrumentor install\n\n\
                   Install recipes by name:\n    instrumentor install -n mysql -n redis\n\n\
                   Install from recipe files:\n    instrumentor install -c ./nginx.yml -c https://example.com/redis.yml\n\n\
                   Install integrations only:\n    instrumentor install --skip-infra-install --skip-logging")]
pub struct InstallArgs {
    /// Recipe file to install, as a local path or URL (repeatable)
    #[arg(long = "recipe-path", short = 'c', value_name = "PATH")]
    pub recipe_paths: Vec<String>,

    /// Recipe to install by name (repeatable, ignored when --recipe-path is given)
    #[arg(long = "recipe-name", short = 'n', value_name = "NAME")]
    pub recipe_names: Vec<String>,

    /// Do not probe the host before fetching recipes
    #[arg(long)]
    pub skip_discovery: bool,

    /// Do not install the infrastructure agent
    #[arg(long)]
    pub skip_infra_install: bool,

    /// Do not install log forwarding
    #[arg(long)]
    pub skip_logging: bool,

    /// Do not install integration recipes
    #[arg(long)]
    pub skip_integrations: bool,

    /// Recipe catalog directory (defaults to <config-dir>/recipes)
    #[arg(long, value_name = "DIR", env = "INSTRUMENTOR_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Install status file (defaults to <config-dir>/install-status.json)
    #[arg(long, value_name = "FILE")]
    pub status_file: Option<PathBuf>,
}
