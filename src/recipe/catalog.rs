//! Recipe catalog lookups
//!
//! The installer asks a [`RecipeFetcher`] for recipes by name (the fixed
//! infrastructure and logging recipes, or user-supplied names) and for the set
//! recommended for the discovered host.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cancel::CancellationToken;
use crate::discovery::DiscoveryManifest;
use crate::error::{InstallError, Result};

use super::{Recipe, RecipeFile};

/// Fetches recipes from a catalog
pub trait RecipeFetcher {
    /// Fetch a recipe by name; `Ok(None)` means the catalog has no such recipe
    fn fetch_recipe(
        &self,
        cancel: &CancellationToken,
        manifest: Option<&DiscoveryManifest>,
        name: &str,
    ) -> Result<Option<Recipe>>;

    /// Fetch the recipes recommended for the host
    fn fetch_recommendations(
        &self,
        cancel: &CancellationToken,
        manifest: Option<&DiscoveryManifest>,
    ) -> Result<Vec<Recipe>>;
}

/// Catalog backed by a directory of recipe files
#[derive(Debug, Clone)]
pub struct LocalCatalog {
    root: PathBuf,
}

impl LocalCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn is_recipe_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
    }

    fn load_recipe(path: &Path) -> Result<Recipe> {
        let content = std::fs::read_to_string(path)?;
        RecipeFile::from_yaml(&content)?.to_recipe()
    }

    /// Load every valid recipe in the catalog, sorted by name
    ///
    /// Files that fail to parse are skipped with a warning so one broken
    /// recipe does not hide the rest of the catalog.
    fn load_all(&self, cancel: &CancellationToken) -> Result<Vec<Recipe>> {
        if !self.root.is_dir() {
            return Err(InstallError::CatalogUnavailable {
                path: self.root.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }

        let mut recipes = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            cancel.check()?;
            let entry = entry.map_err(|e| InstallError::CatalogUnavailable {
                path: self.root.display().to_string(),
                reason: e.to_string(),
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() || !Self::is_recipe_file(path) {
                continue;
            }

            match Self::load_recipe(path) {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => warn!("Skipping invalid recipe file {}: {}", path.display(), e),
            }
        }

        recipes.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(
            catalog = %self.root.display(),
            count = recipes.len(),
            "Loaded recipe catalog"
        );
        Ok(recipes)
    }
}

impl RecipeFetcher for LocalCatalog {
    fn fetch_recipe(
        &self,
        cancel: &CancellationToken,
        _manifest: Option<&DiscoveryManifest>,
        name: &str,
    ) -> Result<Option<Recipe>> {
        Ok(self
            .load_all(cancel)?
            .into_iter()
            .find(|recipe| recipe.is_named(name)))
    }

    fn fetch_recommendations(
        &self,
        cancel: &CancellationToken,
        manifest: Option<&DiscoveryManifest>,
    ) -> Result<Vec<Recipe>> {
        let Some(manifest) = manifest else {
            info!("No discovery manifest available, no recipes can be recommended");
            return Ok(Vec::new());
        };

        Ok(self
            .load_all(cancel)?
            .into_iter()
            .filter(|recipe| recipe.targets_host(manifest) && recipe.matches_processes(manifest))
            .collect())
    }
}
