//! Recipe status reporting
//!
//! Status reporting is a side channel: the installer logs reporting failures
//! and carries on, so a reporter error never changes an install outcome.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InstallError, Result};
use crate::recipe::Recipe;

/// Outcome record for one recipe
#[derive(Debug, Clone)]
pub struct RecipeStatusEvent {
    pub recipe: Recipe,
    /// Empty when the event carries no failure message
    pub message: String,
    /// Empty when no entity was identified
    pub entity_guid: String,
}

impl RecipeStatusEvent {
    pub fn new(recipe: &Recipe, message: impl Into<String>, entity_guid: impl Into<String>) -> Self {
        Self {
            recipe: recipe.clone(),
            message: message.into(),
            entity_guid: entity_guid.into(),
        }
    }
}

/// Records recipe availability and install outcomes
pub trait StatusReporter {
    fn report_recipes_available(&self, recipes: &[Recipe]) -> Result<()>;
    fn report_recipe_installed(&self, event: &RecipeStatusEvent) -> Result<()>;
    fn report_recipe_failed(&self, event: &RecipeStatusEvent) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeState {
    Available,
    Installed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStatus {
    pub name: String,
    pub display_name: String,
    pub status: RecipeState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_guid: Option<String>,
}

/// Persisted status document for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallStatus {
    pub statuses: Vec<RecipeStatus>,
}

impl InstallStatus {
    fn record(&mut self, recipe: &Recipe, status: RecipeState, error: &str, entity_guid: &str) {
        let entry = RecipeStatus {
            name: recipe.name.clone(),
            display_name: recipe.display_name.clone(),
            status,
            error: (!error.is_empty()).then(|| error.to_string()),
            entity_guid: (!entity_guid.is_empty()).then(|| entity_guid.to_string()),
        };

        match self.statuses.iter_mut().find(|s| s.name == recipe.name) {
            Some(existing) => *existing = entry,
            None => self.statuses.push(entry),
        }
    }
}

/// Reporter rewriting a JSON status document after every event
#[derive(Debug)]
pub struct StatusFile {
    path: PathBuf,
    status: Mutex<InstallStatus>,
}

impl StatusFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            status: Mutex::new(InstallStatus::default()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut InstallStatus)) -> Result<()> {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut status);
        self.write(&status)
    }

    fn write(&self, status: &InstallStatus) -> Result<()> {
        let failed = |reason: String| InstallError::StatusWriteFailed {
            path: self.path.display().to_string(),
            reason,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(status).map_err(|e| failed(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| failed(e.to_string()))?;

        debug!(path = %self.path.display(), "Wrote install status");
        Ok(())
    }
}

impl StatusReporter for StatusFile {
    fn report_recipes_available(&self, recipes: &[Recipe]) -> Result<()> {
        self.update(|status| {
            for recipe in recipes {
                status.record(recipe, RecipeState::Available, "", "");
            }
        })
    }

    fn report_recipe_installed(&self, event: &RecipeStatusEvent) -> Result<()> {
        self.update(|status| {
            status.record(
                &event.recipe,
                RecipeState::Installed,
                &event.message,
                &event.entity_guid,
            );
        })
    }

    fn report_recipe_failed(&self, event: &RecipeStatusEvent) -> Result<()> {
        self.update(|status| {
            status.record(
                &event.recipe,
                RecipeState::Failed,
                &event.message,
                &event.entity_guid,
            );
        })
    }
}
