//! Main orchestrator for the install workflow
//!
//! Phases run in a fixed order: discovery, recipe acquisition, infrastructure
//! agent, logging, integrations. Each phase decides whether a failure aborts
//! the run (returned as an error) or is logged as a warning so the next
//! recipe can still be attempted.

use tracing::{debug, error, warn};

use crate::cancel::CancellationToken;
use crate::discovery::{Discoverer, DiscoveryManifest};
use crate::error::{InstallError, Result};
use crate::execution::RecipeExecutor;
use crate::logs::FileFilterer;
use crate::progress::Spinner;
use crate::recipe::{
    Recipe, RecipeFetcher, RecipeFile, RecipeFileFetcher, RecipeLocation, RecipeParameters,
};
use crate::status::{RecipeStatusEvent, StatusReporter};
use crate::validation::RecipeValidator;

use super::consent::{self, ConsentPrompt};
use super::context::{AcquisitionMode, InstallContext};
use super::display;

pub const INFRA_AGENT_RECIPE_NAME: &str = "Infrastructure Agent Installer";
pub const LOGGING_RECIPE_NAME: &str = "Logs integration";

const NOT_VALIDATED_MESSAGE: &str = "could not validate recipe data";

/// Everything the installer delegates to
pub struct Collaborators {
    pub discoverer: Box<dyn Discoverer>,
    pub file_filterer: Box<dyn FileFilterer>,
    pub recipe_fetcher: Box<dyn RecipeFetcher>,
    pub recipe_executor: Box<dyn RecipeExecutor>,
    pub recipe_validator: Box<dyn RecipeValidator>,
    pub recipe_file_fetcher: Box<dyn RecipeFileFetcher>,
    pub status_reporter: Box<dyn StatusReporter>,
    pub consent: Box<dyn ConsentPrompt>,
}

/// Drives a complete install run
pub struct RecipeInstaller {
    context: InstallContext,
    collaborators: Collaborators,
    cancel: CancellationToken,
}

impl RecipeInstaller {
    pub fn new(
        context: InstallContext,
        collaborators: Collaborators,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            context,
            collaborators,
            cancel,
        }
    }

    /// Run every enabled phase; an error means the run was aborted
    pub fn install(&self) -> Result<()> {
        display::print_welcome();

        let manifest = if self.context.should_run_discovery() {
            Some(self.discover_fatal()?)
        } else {
            None
        };
        let fallback = DiscoveryManifest::default();
        let host = manifest.as_ref().unwrap_or(&fallback);

        let recipes = self.acquire_recipes(manifest.as_ref())?;

        if self.context.should_install_infra_agent() {
            self.install_infra_agent_fatal(manifest.as_ref(), host)?;
        }

        if self.context.should_install_logging() {
            self.install_logging_fatal(manifest.as_ref(), host, &recipes)?;
        }

        if self.context.should_install_integrations() {
            for recipe in &recipes {
                self.execute_and_validate_warn(host, recipe);
            }
        }

        display::print_success(self.context.account_id);
        Ok(())
    }

    fn discover_fatal(&self) -> Result<DiscoveryManifest> {
        let spinner = Spinner::start("Discovering system information...");
        match self.collaborators.discoverer.discover(&self.cancel) {
            Ok(manifest) => {
                spinner.succeed();
                Ok(manifest)
            }
            Err(e) => {
                spinner.fail();
                Err(InstallError::DiscoveryFailed {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn acquire_recipes(&self, manifest: Option<&DiscoveryManifest>) -> Result<Vec<Recipe>> {
        match self.context.acquisition_mode() {
            AcquisitionMode::Paths(paths) => paths
                .iter()
                .map(|path| self.recipe_from_path_fatal(path))
                .collect(),
            AcquisitionMode::Names(names) => Ok(names
                .iter()
                .filter_map(|name| self.fetch_warn(manifest, name))
                .collect()),
            AcquisitionMode::Recommendations => {
                let recipes = self.fetch_recommendations_fatal(manifest)?;
                self.report_recipes_available(&recipes);
                Ok(recipes)
            }
        }
    }

    fn recipe_from_path_fatal(&self, recipe_path: &str) -> Result<Recipe> {
        let fetcher = &self.collaborators.recipe_file_fetcher;
        let file = match RecipeLocation::parse(recipe_path) {
            RecipeLocation::Url(url) => {
                fetcher
                    .fetch_recipe_file(&url)
                    .map_err(|e| InstallError::RecipeFetchFailed {
                        path: recipe_path.to_string(),
                        reason: e.to_string(),
                    })?
            }
            RecipeLocation::Path(path) => {
                fetcher
                    .load_recipe_file(&path)
                    .map_err(|e| InstallError::RecipeLoadFailed {
                        path: recipe_path.to_string(),
                        reason: e.to_string(),
                    })?
            }
        };

        finalize_recipe(&file)
    }

    fn fetch_recommendations_fatal(
        &self,
        manifest: Option<&DiscoveryManifest>,
    ) -> Result<Vec<Recipe>> {
        let spinner = Spinner::start("Fetching recommended recipes...");
        match self
            .collaborators
            .recipe_fetcher
            .fetch_recommendations(&self.cancel, manifest)
        {
            Ok(recipes) => {
                spinner.succeed();
                Ok(recipes)
            }
            Err(e) => {
                spinner.fail();
                Err(InstallError::RecommendationsFailed {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn install_infra_agent_fatal(
        &self,
        manifest: Option<&DiscoveryManifest>,
        host: &DiscoveryManifest,
    ) -> Result<()> {
        let recipe = self.fetch_fatal(manifest, INFRA_AGENT_RECIPE_NAME)?;
        self.execute_and_validate_fatal(host, &recipe)
    }

    fn install_logging_fatal(
        &self,
        manifest: Option<&DiscoveryManifest>,
        host: &DiscoveryManifest,
        recipes: &[Recipe],
    ) -> Result<()> {
        let recipe = self.fetch_fatal(manifest, LOGGING_RECIPE_NAME)?;

        let log_matches = self
            .collaborators
            .file_filterer
            .filter(&self.cancel, recipes)
            .map_err(|e| InstallError::LogFilterFailed {
                reason: e.to_string(),
            })?;

        let logging = consent::accept_log_matches(self.collaborators.consent.as_ref(), log_matches);
        debug!(accepted = logging.logs.len(), "Collected log files to watch");

        let recipe = recipe.with_parameters(RecipeParameters {
            discovered_log_files: Some(logging),
        });
        self.execute_and_validate_fatal(host, &recipe)
    }

    fn fetch_warn(&self, manifest: Option<&DiscoveryManifest>, name: &str) -> Option<Recipe> {
        match self
            .collaborators
            .recipe_fetcher
            .fetch_recipe(&self.cancel, manifest, name)
        {
            Ok(Some(recipe)) => Some(recipe),
            Ok(None) => {
                warn!("Recipe {} not found. Skipping installation.", name);
                None
            }
            Err(e) => {
                warn!("Could not install {}. Error retrieving recipe: {}", name, e);
                None
            }
        }
    }

    fn fetch_fatal(&self, manifest: Option<&DiscoveryManifest>, name: &str) -> Result<Recipe> {
        self.collaborators
            .recipe_fetcher
            .fetch_recipe(&self.cancel, manifest, name)
            .map_err(|e| InstallError::RecipeRetrievalFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| InstallError::RecipeNotFound {
                name: name.to_string(),
            })
    }

    /// Execute a recipe, then confirm its data arrived
    ///
    /// `Ok(false)` means the recipe ran but validation did not confirm data;
    /// callers turn that into a fatal error or a warning.
    fn execute_and_validate(&self, host: &DiscoveryManifest, recipe: &Recipe) -> Result<bool> {
        if let Err(e) = self
            .collaborators
            .recipe_executor
            .execute(&self.cancel, host, recipe)
        {
            let message = format!("encountered an error while executing {}: {}", recipe.name, e);
            self.report_recipe_failed(&RecipeStatusEvent::new(recipe, message.clone(), ""));
            return Err(InstallError::InstallFailed {
                name: recipe.name.clone(),
                reason: message,
            });
        }

        if !recipe.has_validation() {
            debug!("Skipping validation due to missing validation query.");
            return Ok(true);
        }

        match self
            .collaborators
            .recipe_validator
            .validate(&self.cancel, host, recipe)
        {
            Err(e) => {
                let message = format!(
                    "encountered an error while validating receipt of data for {}: {}",
                    recipe.name, e
                );
                self.report_recipe_failed(&RecipeStatusEvent::new(recipe, message.clone(), ""));
                Err(InstallError::InstallFailed {
                    name: recipe.name.clone(),
                    reason: message,
                })
            }
            Ok(validation) if !validation.confirmed => {
                self.report_recipe_failed(&RecipeStatusEvent::new(
                    recipe,
                    NOT_VALIDATED_MESSAGE,
                    validation.entity_guid,
                ));
                Ok(false)
            }
            Ok(validation) => {
                self.report_recipe_installed(&RecipeStatusEvent::new(
                    recipe,
                    "",
                    validation.entity_guid,
                ));
                Ok(true)
            }
        }
    }

    fn execute_and_validate_fatal(&self, host: &DiscoveryManifest, recipe: &Recipe) -> Result<()> {
        let spinner = Spinner::start(format!("Installing {}...", recipe.name));
        match self.execute_and_validate(host, recipe) {
            Ok(true) => {
                spinner.succeed();
                Ok(())
            }
            Ok(false) => {
                spinner.fail();
                Err(InstallError::NoDataDetected {
                    name: recipe.name.clone(),
                })
            }
            Err(e) => {
                spinner.fail();
                Err(e)
            }
        }
    }

    fn execute_and_validate_warn(&self, host: &DiscoveryManifest, recipe: &Recipe) {
        let spinner = Spinner::start(format!("Installing {}...", recipe.name));
        match self.execute_and_validate(host, recipe) {
            Ok(true) => spinner.succeed(),
            Ok(false) => {
                spinner.fail();
                warn!("Could not detect data from {}.", recipe.name);
            }
            Err(e) => {
                spinner.fail();
                warn!("{}", e);
            }
        }
    }

    fn report_recipes_available(&self, recipes: &[Recipe]) {
        if let Err(e) = self
            .collaborators
            .status_reporter
            .report_recipes_available(recipes)
        {
            error!("Could not report recipe execution status: {}", e);
        }
    }

    fn report_recipe_installed(&self, event: &RecipeStatusEvent) {
        if let Err(e) = self.collaborators.status_reporter.report_recipe_installed(event) {
            error!(
                "Error writing recipe status for recipe {}: {}",
                event.recipe.name, e
            );
        }
    }

    fn report_recipe_failed(&self, event: &RecipeStatusEvent) {
        if let Err(e) = self.collaborators.status_reporter.report_recipe_failed(event) {
            error!(
                "Error writing recipe status for recipe {}: {}",
                event.recipe.name, e
            );
        }
    }
}

/// Turn a loaded recipe file into a recipe; any failure is a bad file
fn finalize_recipe(file: &RecipeFile) -> Result<Recipe> {
    file.to_recipe().map_err(|e| match e {
        InstallError::RecipeInvalid { .. } => e,
        other => InstallError::RecipeInvalid {
            name: file.name.clone(),
            reason: other.to_string(),
        },
    })
}
