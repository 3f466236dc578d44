//! Configuration: the profile store and default file locations
//!
//! Profiles live in `profiles.yaml` inside the configuration directory:
//!
//! ```yaml
//! default: production
//! profiles:
//!   production:
//!     accountId: 1234567
//!     apiKey: NRAK-XXXX
//!     region: us
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InstallError, Result};

pub const PROFILES_FILE: &str = "profiles.yaml";
pub const CATALOG_DIR: &str = "recipes";
pub const STATUS_FILE: &str = "install-status.json";

/// Data center an account lives in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Us,
    Eu,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
        }
    }

    /// GraphQL endpoint used to run validation queries
    pub fn graphql_endpoint(self) -> &'static str {
        match self {
            Region::Us => "https://api.newrelic.com/graphql",
            Region::Eu => "https://api.eu.newrelic.com/graphql",
        }
    }
}

/// Account credentials for one profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub account_id: u64,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub region: Region,
}

/// Named profiles loaded from `profiles.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStore {
    pub default: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl ProfileStore {
    /// Load the store; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No profile store, continuing without profiles");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| InstallError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Resolve the profile to use for this run
    ///
    /// An explicitly requested profile must exist, as must a configured default.
    /// Without either, the only profile is used when exactly one is configured.
    pub fn resolve(&self, requested: Option<&str>) -> Result<Option<(String, Profile)>> {
        if let Some(name) = requested {
            return self
                .profiles
                .get(name)
                .map(|p| Some((name.to_string(), p.clone())))
                .ok_or_else(|| InstallError::ProfileInvalid {
                    message: format!("profile '{name}' is not configured"),
                });
        }

        if let Some(name) = &self.default {
            return self
                .profiles
                .get(name)
                .map(|p| Some((name.clone(), p.clone())))
                .ok_or_else(|| InstallError::ProfileInvalid {
                    message: format!("default profile '{name}' is not configured"),
                });
        }

        if self.profiles.len() == 1 {
            return Ok(self
                .profiles
                .iter()
                .next()
                .map(|(name, p)| (name.clone(), p.clone())));
        }

        Ok(None)
    }
}

/// Resolve the configuration directory
pub fn config_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    let base = dirs::config_dir().ok_or_else(|| InstallError::IoError {
        message: "Could not determine the configuration directory".to_string(),
    })?;
    Ok(base.join("instrumentor"))
}
