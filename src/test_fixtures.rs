//! Scripted collaborators for exercising the installer without a host.
//!
//! Every fake appends a short entry to a shared [`CallLog`], so tests can
//! assert both which collaborators were called and in what order.
//!
//! ```ignore
//! let scenario = Scenario::new().with_catalog([recipe(INFRA_AGENT_RECIPE_NAME)]);
//! let log = scenario.log();
//! let installer = RecipeInstaller::new(context, scenario.build(), CancellationToken::new());
//! installer.install().unwrap();
//! assert!(log.borrow().contains(&"execute:Infrastructure Agent Installer".to_string()));
//! ```
//!
//! Log entries:
//!
//! | entry | call |
//! |-------|------|
//! | `discover` | discovery |
//! | `load:<path>` / `fetch-file:<url>` | recipe file retrieval |
//! | `fetch:<name>` / `recommendations` | catalog lookups |
//! | `filter` / `prompt:<file>` | log file selection |
//! | `execute:<name>` / `params:<files>` | execution, with accepted log files |
//! | `validate:<name>` | validation |
//! | `available:<names>` / `installed:<name>:<guid>` / `failed:<name>:<message>:<guid>` | status |

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::Path;
use std::rc::Rc;

use url::Url;

use crate::cancel::CancellationToken;
use crate::discovery::{Discoverer, DiscoveryManifest};
use crate::error::{InstallError, Result};
use crate::execution::RecipeExecutor;
use crate::install::{Collaborators, ConsentPrompt};
use crate::logs::FileFilterer;
use crate::recipe::{
    InstallStep, LogMatch, Recipe, RecipeFetcher, RecipeFile, RecipeFileFetcher,
};
use crate::status::{RecipeStatusEvent, StatusReporter};
use crate::validation::{RecipeValidator, Validation};

pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Recipe with one step and a validation query
pub fn recipe(name: &str) -> Recipe {
    Recipe {
        validation_nrql: format!("SELECT count(*) FROM {name}Sample"),
        ..recipe_without_validation(name)
    }
}

/// Recipe with one step and no validation query
pub fn recipe_without_validation(name: &str) -> Recipe {
    Recipe {
        name: name.to_string(),
        display_name: name.to_string(),
        steps: vec![InstallStep {
            name: None,
            run: format!("install {name}"),
        }],
        ..Default::default()
    }
}

/// Recipe file that finalizes into a recipe named `name`
pub fn recipe_file(name: &str) -> RecipeFile {
    RecipeFile {
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn log_match(file: &str) -> LogMatch {
    LogMatch {
        name: file.to_string(),
        file: file.to_string(),
        attributes: BTreeMap::new(),
    }
}

fn scripted_failure(reason: &str) -> InstallError {
    InstallError::IoError {
        message: reason.to_string(),
    }
}

/// Builder for a fully scripted set of collaborators
///
/// Unless configured otherwise, every call succeeds, validation confirms data
/// with entity guid `GUID-<name>`, and the operator declines every prompt.
#[derive(Default)]
pub struct Scenario {
    log: CallLog,
    manifest: DiscoveryManifest,
    discover_error: Option<String>,
    recipe_files: HashMap<String, RecipeFile>,
    catalog: Vec<Recipe>,
    fetch_errors: HashSet<String>,
    recommendations: Vec<Recipe>,
    recommendations_error: Option<String>,
    log_matches: Vec<LogMatch>,
    filter_error: Option<String>,
    execute_errors: HashSet<String>,
    unconfirmed: HashSet<String>,
    validation_errors: HashSet<String>,
    reporter_fails: bool,
    answers: Vec<bool>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> CallLog {
        Rc::clone(&self.log)
    }

    pub fn with_manifest(mut self, manifest: DiscoveryManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn failing_discovery(mut self, reason: &str) -> Self {
        self.discover_error = Some(reason.to_string());
        self
    }

    /// Serve `file` at a local path or URL
    pub fn with_recipe_file(mut self, location: &str, file: RecipeFile) -> Self {
        self.recipe_files.insert(location.to_string(), file);
        self
    }

    pub fn with_catalog(mut self, recipes: impl IntoIterator<Item = Recipe>) -> Self {
        self.catalog.extend(recipes);
        self
    }

    pub fn failing_fetch(mut self, name: &str) -> Self {
        self.fetch_errors.insert(name.to_string());
        self
    }

    pub fn with_recommendations(mut self, recipes: impl IntoIterator<Item = Recipe>) -> Self {
        self.recommendations.extend(recipes);
        self
    }

    pub fn failing_recommendations(mut self, reason: &str) -> Self {
        self.recommendations_error = Some(reason.to_string());
        self
    }

    pub fn with_log_matches(mut self, matches: impl IntoIterator<Item = LogMatch>) -> Self {
        self.log_matches.extend(matches);
        self
    }

    pub fn failing_filter(mut self, reason: &str) -> Self {
        self.filter_error = Some(reason.to_string());
        self
    }

    pub fn failing_execution(mut self, name: &str) -> Self {
        self.execute_errors.insert(name.to_string());
        self
    }

    pub fn unconfirmed(mut self, name: &str) -> Self {
        self.unconfirmed.insert(name.to_string());
        self
    }

    pub fn failing_validation(mut self, name: &str) -> Self {
        self.validation_errors.insert(name.to_string());
        self
    }

    pub fn failing_reporter(mut self) -> Self {
        self.reporter_fails = true;
        self
    }

    /// Answers given to consent prompts, in order
    pub fn with_answers(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.answers.extend(answers);
        self
    }

    pub fn build(self) -> Collaborators {
        let log = self.log;
        Collaborators {
            discoverer: Box::new(FakeDiscoverer {
                log: Rc::clone(&log),
                manifest: self.manifest,
                error: self.discover_error,
            }),
            file_filterer: Box::new(FakeFileFilterer {
                log: Rc::clone(&log),
                matches: self.log_matches,
                error: self.filter_error,
            }),
            recipe_fetcher: Box::new(FakeRecipeFetcher {
                log: Rc::clone(&log),
                catalog: self.catalog,
                errors: self.fetch_errors,
                recommendations: self.recommendations,
                recommendations_error: self.recommendations_error,
            }),
            recipe_executor: Box::new(FakeExecutor {
                log: Rc::clone(&log),
                errors: self.execute_errors,
            }),
            recipe_validator: Box::new(FakeValidator {
                log: Rc::clone(&log),
                unconfirmed: self.unconfirmed,
                errors: self.validation_errors,
            }),
            recipe_file_fetcher: Box::new(FakeRecipeFileFetcher {
                log: Rc::clone(&log),
                files: self.recipe_files,
            }),
            status_reporter: Box::new(FakeStatusReporter {
                log: Rc::clone(&log),
                fails: self.reporter_fails,
            }),
            consent: Box::new(FakePrompt {
                log,
                answers: RefCell::new(self.answers.into()),
            }),
        }
    }
}

struct FakeDiscoverer {
    log: CallLog,
    manifest: DiscoveryManifest,
    error: Option<String>,
}

impl Discoverer for FakeDiscoverer {
    fn discover(&self, _cancel: &CancellationToken) -> Result<DiscoveryManifest> {
        self.log.borrow_mut().push("discover".to_string());
        match &self.error {
            Some(reason) => Err(scripted_failure(reason)),
            None => Ok(self.manifest.clone()),
        }
    }
}

struct FakeRecipeFileFetcher {
    log: CallLog,
    files: HashMap<String, RecipeFile>,
}

impl FakeRecipeFileFetcher {
    fn lookup(&self, location: &str) -> Result<RecipeFile> {
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| scripted_failure("no such file"))
    }
}

impl RecipeFileFetcher for FakeRecipeFileFetcher {
    fn load_recipe_file(&self, path: &Path) -> Result<RecipeFile> {
        let location = path.display().to_string();
        self.log.borrow_mut().push(format!("load:{location}"));
        self.lookup(&location)
    }

    fn fetch_recipe_file(&self, url: &Url) -> Result<RecipeFile> {
        self.log.borrow_mut().push(format!("fetch-file:{url}"));
        self.lookup(url.as_str())
    }
}

struct FakeRecipeFetcher {
    log: CallLog,
    catalog: Vec<Recipe>,
    errors: HashSet<String>,
    recommendations: Vec<Recipe>,
    recommendations_error: Option<String>,
}

impl RecipeFetcher for FakeRecipeFetcher {
    fn fetch_recipe(
        &self,
        _cancel: &CancellationToken,
        _manifest: Option<&DiscoveryManifest>,
        name: &str,
    ) -> Result<Option<Recipe>> {
        self.log.borrow_mut().push(format!("fetch:{name}"));
        if self.errors.contains(name) {
            return Err(scripted_failure("catalog unreachable"));
        }
        Ok(self.catalog.iter().find(|r| r.name == name).cloned())
    }

    fn fetch_recommendations(
        &self,
        _cancel: &CancellationToken,
        _manifest: Option<&DiscoveryManifest>,
    ) -> Result<Vec<Recipe>> {
        self.log.borrow_mut().push("recommendations".to_string());
        match &self.recommendations_error {
            Some(reason) => Err(scripted_failure(reason)),
            None => Ok(self.recommendations.clone()),
        }
    }
}

struct FakeFileFilterer {
    log: CallLog,
    matches: Vec<LogMatch>,
    error: Option<String>,
}

impl FileFilterer for FakeFileFilterer {
    fn filter(&self, _cancel: &CancellationToken, _recipes: &[Recipe]) -> Result<Vec<LogMatch>> {
        self.log.borrow_mut().push("filter".to_string());
        match &self.error {
            Some(reason) => Err(scripted_failure(reason)),
            None => Ok(self.matches.clone()),
        }
    }
}

struct FakeExecutor {
    log: CallLog,
    errors: HashSet<String>,
}

impl RecipeExecutor for FakeExecutor {
    fn execute(
        &self,
        _cancel: &CancellationToken,
        _manifest: &DiscoveryManifest,
        recipe: &Recipe,
    ) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.push(format!("execute:{}", recipe.name));
        if let Some(logging) = &recipe.parameters.discovered_log_files {
            let files: Vec<&str> = logging.logs.iter().map(|m| m.file.as_str()).collect();
            log.push(format!("params:{}", files.join(",")));
        }
        if self.errors.contains(&recipe.name) {
            return Err(InstallError::ExecutionFailed {
                step: format!("install {}", recipe.name),
                reason: "exit status 1".to_string(),
            });
        }
        Ok(())
    }
}

struct FakeValidator {
    log: CallLog,
    unconfirmed: HashSet<String>,
    errors: HashSet<String>,
}

impl RecipeValidator for FakeValidator {
    fn validate(
        &self,
        _cancel: &CancellationToken,
        _manifest: &DiscoveryManifest,
        recipe: &Recipe,
    ) -> Result<Validation> {
        self.log.borrow_mut().push(format!("validate:{}", recipe.name));
        if self.errors.contains(&recipe.name) {
            return Err(InstallError::ValidationFailed {
                message: "query timed out".to_string(),
            });
        }
        Ok(Validation {
            confirmed: !self.unconfirmed.contains(&recipe.name),
            entity_guid: format!("GUID-{}", recipe.name),
        })
    }
}

struct FakeStatusReporter {
    log: CallLog,
    fails: bool,
}

impl FakeStatusReporter {
    fn record(&self, entry: String) -> Result<()> {
        self.log.borrow_mut().push(entry);
        if self.fails {
            return Err(InstallError::StatusWriteFailed {
                path: "status.json".to_string(),
                reason: "read-only file system".to_string(),
            });
        }
        Ok(())
    }
}

impl StatusReporter for FakeStatusReporter {
    fn report_recipes_available(&self, recipes: &[Recipe]) -> Result<()> {
        let names: Vec<&str> = recipes.iter().map(|r| r.name.as_str()).collect();
        self.record(format!("available:{}", names.join(",")))
    }

    fn report_recipe_installed(&self, event: &RecipeStatusEvent) -> Result<()> {
        self.record(format!(
            "installed:{}:{}",
            event.recipe.name, event.entity_guid
        ))
    }

    fn report_recipe_failed(&self, event: &RecipeStatusEvent) -> Result<()> {
        self.record(format!(
            "failed:{}:{}:{}",
            event.recipe.name, event.message, event.entity_guid
        ))
    }
}

struct FakePrompt {
    log: CallLog,
    answers: RefCell<VecDeque<bool>>,
}

impl ConsentPrompt for FakePrompt {
    fn accept_log_file(&self, log_match: &LogMatch) -> bool {
        self.log
            .borrow_mut()
            .push(format!("prompt:{}", log_match.file));
        self.answers.borrow_mut().pop_front().unwrap_or(false)
    }
}
