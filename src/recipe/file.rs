//! Loading recipe files from local paths and URLs

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::{InstallError, Result};

use super::RecipeFile;

/// Where a user-supplied recipe lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeLocation {
    Path(PathBuf),
    Url(Url),
}

impl RecipeLocation {
    /// Classify a user-supplied recipe path
    ///
    /// Anything parsing as a URL with a real scheme is fetched; single-letter
    /// schemes are Windows drive letters and stay local paths.
    pub fn parse(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) if url.scheme().len() > 1 => RecipeLocation::Url(url),
            _ => RecipeLocation::Path(PathBuf::from(input)),
        }
    }
}

/// Loads recipe files from disk or over HTTP
pub trait RecipeFileFetcher {
    fn load_recipe_file(&self, path: &Path) -> Result<RecipeFile>;
    fn fetch_recipe_file(&self, url: &Url) -> Result<RecipeFile>;
}

/// Default recipe file source backed by the filesystem and a blocking HTTP client
pub struct RecipeFileSource {
    client: reqwest::blocking::Client,
}

impl RecipeFileSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    fn parse(source: &str, content: &str) -> Result<RecipeFile> {
        serde_yaml::from_str(content).map_err(|e| InstallError::ConfigParseFailed {
            path: source.to_string(),
            reason: e.to_string(),
        })
    }
}

impl RecipeFileFetcher for RecipeFileSource {
    fn load_recipe_file(&self, path: &Path) -> Result<RecipeFile> {
        let resolved = dunce::canonicalize(path).map_err(|e| InstallError::IoError {
            message: format!("{}: {e}", path.display()),
        })?;
        debug!(path = %resolved.display(), "Loading recipe file");

        let content = std::fs::read_to_string(&resolved)?;
        Self::parse(&resolved.display().to_string(), &content)
    }

    fn fetch_recipe_file(&self, url: &Url) -> Result<RecipeFile> {
        debug!(%url, "Fetching recipe file");

        let response = self.client.get(url.clone()).send()?.error_for_status()?;
        let content = response.text()?;
        Self::parse(url.as_str(), &content)
    }
}
