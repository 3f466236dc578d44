//! Install command implementation
//!
//! Resolves the run configuration and wires the concrete collaborators:
//! 1. Resolve the configuration directory and profile
//! 2. Build the install context from the command line
//! 3. Build host discovery, recipe sources, executor, validator, and status file
//! 4. Hand everything to the installer and propagate its outcome

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::cli::InstallArgs;
use crate::config::{self, Profile, ProfileStore};
use crate::discovery::HostDiscoverer;
use crate::error::Result;
use crate::execution::ShellExecutor;
use crate::install::{Collaborators, InquirePrompt, InstallContext, RecipeInstaller};
use crate::logs::GlobFileFilterer;
use crate::recipe::{LocalCatalog, RecipeFileSource};
use crate::status::StatusFile;
use crate::validation::NerdGraphValidator;

const RECIPE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const VALIDATION_ATTEMPTS: u32 = 60;
const VALIDATION_INTERVAL: Duration = Duration::from_secs(5);

/// Run install command
pub fn run(config_dir: Option<PathBuf>, profile: Option<String>, args: InstallArgs) -> Result<()> {
    let dir = config::config_dir(config_dir.as_deref())?;
    let store = ProfileStore::load(&dir.join(config::PROFILES_FILE))?;

    let profile = match store.resolve(profile.as_deref())? {
        Some((name, profile)) => {
            info!(profile = %name, account_id = profile.account_id, "Using profile");
            profile
        }
        None => {
            debug!("No profile configured, installing without account credentials");
            Profile::default()
        }
    };

    let catalog = args
        .catalog
        .clone()
        .unwrap_or_else(|| dir.join(config::CATALOG_DIR));
    let status_file = args
        .status_file
        .clone()
        .unwrap_or_else(|| dir.join(config::STATUS_FILE));
    debug!(catalog = %catalog.display(), status_file = %status_file.display(), "Resolved locations");

    let context = InstallContext::from_args(&args, profile.account_id);
    let collaborators = build_collaborators(profile, catalog, status_file)?;
    let cancel = CancellationToken::from_signals()?;

    RecipeInstaller::new(context, collaborators, cancel).install()
}

fn build_collaborators(
    profile: Profile,
    catalog: PathBuf,
    status_file: PathBuf,
) -> Result<Collaborators> {
    Ok(Collaborators {
        discoverer: Box::new(HostDiscoverer::new()),
        file_filterer: Box::new(GlobFileFilterer::new()),
        recipe_fetcher: Box::new(LocalCatalog::new(catalog)),
        recipe_executor: Box::new(ShellExecutor::new(profile.clone())),
        recipe_validator: Box::new(NerdGraphValidator::new(
            profile,
            VALIDATION_ATTEMPTS,
            VALIDATION_INTERVAL,
        )?),
        recipe_file_fetcher: Box::new(RecipeFileSource::new(RECIPE_FETCH_TIMEOUT)?),
        status_reporter: Box::new(StatusFile::new(status_file)),
        consent: Box::new(InquirePrompt),
    })
}
