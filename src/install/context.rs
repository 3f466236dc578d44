//! Run configuration for the install workflow
//!
//! [`InstallContext`] is resolved once from the command line and stays
//! read-only for the rest of the run.

use crate::cli::InstallArgs;

/// Which recipes to install and which phases to run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallContext {
    /// Recipe files given as local paths or URLs
    pub recipe_paths: Vec<String>,
    /// Recipe names to look up in the catalog
    pub recipe_names: Vec<String>,
    pub skip_discovery: bool,
    pub skip_infra_install: bool,
    pub skip_logging_install: bool,
    pub skip_integrations: bool,
    /// Account shown in the completion message
    pub account_id: u64,
}

/// How recipes are acquired for this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionMode<'a> {
    Paths(&'a [String]),
    Names(&'a [String]),
    Recommendations,
}

impl InstallContext {
    pub fn from_args(args: &InstallArgs, account_id: u64) -> Self {
        Self {
            recipe_paths: args.recipe_paths.clone(),
            recipe_names: args.recipe_names.clone(),
            skip_discovery: args.skip_discovery,
            skip_infra_install: args.skip_infra_install,
            skip_logging_install: args.skip_logging,
            skip_integrations: args.skip_integrations,
            account_id,
        }
    }

    pub fn should_run_discovery(&self) -> bool {
        !self.skip_discovery
    }

    pub fn recipe_paths_provided(&self) -> bool {
        !self.recipe_paths.is_empty()
    }

    pub fn recipe_names_provided(&self) -> bool {
        !self.recipe_names.is_empty()
    }

    pub fn should_install_infra_agent(&self) -> bool {
        !self.skip_infra_install
    }

    pub fn should_install_logging(&self) -> bool {
        !self.skip_logging_install
    }

    pub fn should_install_integrations(&self) -> bool {
        !self.skip_integrations
    }

    /// Paths win over names, names over recommendations
    pub fn acquisition_mode(&self) -> AcquisitionMode<'_> {
        if self.recipe_paths_provided() {
            AcquisitionMode::Paths(&self.recipe_paths)
        } else if self.recipe_names_provided() {
            AcquisitionMode::Names(&self.recipe_names)
        } else {
            AcquisitionMode::Recommendations
        }
    }
}
