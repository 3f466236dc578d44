//! Recipe definitions
//!
//! A recipe file (`*.yml`) is the declarative source form. [`RecipeFile::to_recipe`]
//! validates it and produces a [`Recipe`], the executable form the installer
//! passes to the executor and validator.

pub mod catalog;
pub mod file;

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::discovery::DiscoveryManifest;
use crate::error::{InstallError, Result};

pub use catalog::{LocalCatalog, RecipeFetcher};
pub use file::{RecipeFileFetcher, RecipeFileSource, RecipeLocation};

/// A log file pattern a recipe knows how to watch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMatch {
    pub name: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// Approximates the log forwarding configuration of the infrastructure agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub logs: Vec<LogMatch>,
}

/// Runtime values injected into a recipe before it is executed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeParameters {
    /// Log files the operator agreed to watch
    pub discovered_log_files: Option<LoggingConfig>,
}

/// Host constraints a recipe can be installed on; unset fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallTarget {
    pub os: Option<String>,
    pub platform: Option<String>,
    pub platform_version: Option<String>,
    pub kernel_arch: Option<String>,
}

impl InstallTarget {
    pub fn matches(&self, manifest: &DiscoveryManifest) -> bool {
        fn same(expected: Option<&String>, actual: &str) -> bool {
            expected.is_none_or(|e| e.eq_ignore_ascii_case(actual))
        }

        same(self.os.as_ref(), &manifest.os)
            && same(self.platform.as_ref(), &manifest.platform)
            && same(self.kernel_arch.as_ref(), &manifest.kernel_arch)
            && self
                .platform_version
                .as_ref()
                .is_none_or(|v| manifest.platform_version.starts_with(v.as_str()))
    }
}

/// One shell command of a recipe's install section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallStep {
    pub name: Option<String>,
    pub run: String,
}

impl InstallStep {
    /// Label used in progress and error output
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.run)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallSection {
    #[serde(default)]
    pub steps: Vec<InstallStep>,
}

/// Recipe file as written on disk or served over HTTP
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFile {
    #[serde(default)]
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub repository: Option<String>,
    #[serde(default)]
    pub install_targets: Vec<InstallTarget>,
    #[serde(default)]
    pub process_match: Vec<String>,
    #[serde(default)]
    pub log_match: Vec<LogMatch>,
    #[serde(default, rename = "validationNrql")]
    pub validation_nrql: Option<String>,
    #[serde(default)]
    pub install: InstallSection,
}

impl RecipeFile {
    /// Parse a recipe file from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate the file and turn it into an executable recipe
    pub fn to_recipe(&self) -> Result<Recipe> {
        let invalid = |reason: String| InstallError::RecipeInvalid {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("recipe name is required".to_string()));
        }

        if let Some(position) = self
            .install
            .steps
            .iter()
            .position(|step| step.run.trim().is_empty())
        {
            return Err(invalid(format!(
                "install step {} has no command",
                position + 1
            )));
        }

        if let Some(log_match) = self.log_match.iter().find(|m| m.file.trim().is_empty()) {
            return Err(invalid(format!(
                "log match '{}' has no file pattern",
                log_match.name
            )));
        }

        let process_matchers = self
            .process_match
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|e| invalid(format!("invalid process match '{pattern}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Recipe {
            name: self.name.clone(),
            display_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| self.name.clone()),
            description: self.description.clone(),
            install_targets: self.install_targets.clone(),
            process_matchers,
            log_matches: self.log_match.clone(),
            validation_nrql: self.validation_nrql.clone().unwrap_or_default(),
            steps: self.install.steps.clone(),
            parameters: RecipeParameters::default(),
        })
    }
}

/// Executable recipe
#[derive(Debug, Clone, Default)]
pub struct Recipe {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub install_targets: Vec<InstallTarget>,
    pub process_matchers: Vec<Regex>,
    pub log_matches: Vec<LogMatch>,
    /// Empty when the recipe declares no validation query
    pub validation_nrql: String,
    pub steps: Vec<InstallStep>,
    pub parameters: RecipeParameters,
}

impl Recipe {
    pub fn has_validation(&self) -> bool {
        !self.validation_nrql.trim().is_empty()
    }

    /// Whether `name` refers to this recipe by name or display name
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.display_name.eq_ignore_ascii_case(name)
    }

    /// Whether the host satisfies at least one install target
    pub fn targets_host(&self, manifest: &DiscoveryManifest) -> bool {
        self.install_targets.is_empty()
            || self.install_targets.iter().any(|t| t.matches(manifest))
    }

    /// Whether any discovered process matches one of the recipe's process matchers
    pub fn matches_processes(&self, manifest: &DiscoveryManifest) -> bool {
        self.process_matchers.iter().any(|matcher| {
            manifest
                .processes
                .iter()
                .any(|process| matcher.is_match(process.match_text()))
        })
    }

    /// Attach runtime parameters before execution
    pub fn with_parameters(mut self, parameters: RecipeParameters) -> Self {
        self.parameters = parameters;
        self
    }
}
