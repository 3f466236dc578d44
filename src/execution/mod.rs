//! Recipe execution
//!
//! Runs a recipe's install steps one after another as shell commands. Host
//! facts, account credentials and recipe parameters reach the commands as
//! `INSTRUMENTOR_*` environment variables.

use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;

use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::config::Profile;
use crate::discovery::DiscoveryManifest;
use crate::error::{InstallError, Result};
use crate::recipe::{InstallStep, Recipe};

/// Runs a recipe's installation steps against the host
pub trait RecipeExecutor {
    fn execute(
        &self,
        cancel: &CancellationToken,
        manifest: &DiscoveryManifest,
        recipe: &Recipe,
    ) -> Result<()>;
}

/// Executor running install steps through the system shell
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    profile: Profile,
    poll_interval: Duration,
}

impl ShellExecutor {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Environment exported to every step of `recipe`
    pub fn environment(
        &self,
        manifest: &DiscoveryManifest,
        recipe: &Recipe,
    ) -> Result<Vec<(String, String)>> {
        let mut env = vec![
            ("INSTRUMENTOR_RECIPE".to_string(), recipe.name.clone()),
            ("INSTRUMENTOR_HOSTNAME".to_string(), manifest.hostname.clone()),
            ("INSTRUMENTOR_OS".to_string(), manifest.os.clone()),
            ("INSTRUMENTOR_PLATFORM".to_string(), manifest.platform.clone()),
            (
                "INSTRUMENTOR_PLATFORM_VERSION".to_string(),
                manifest.platform_version.clone(),
            ),
            ("INSTRUMENTOR_KERNEL_ARCH".to_string(), manifest.kernel_arch.clone()),
            (
                "INSTRUMENTOR_ACCOUNT_ID".to_string(),
                self.profile.account_id.to_string(),
            ),
            ("INSTRUMENTOR_API_KEY".to_string(), self.profile.api_key.clone()),
            (
                "INSTRUMENTOR_REGION".to_string(),
                self.profile.region.as_str().to_string(),
            ),
        ];

        if let Some(logging) = &recipe.parameters.discovered_log_files {
            env.push((
                "INSTRUMENTOR_DISCOVERED_LOG_FILES".to_string(),
                serde_yaml::to_string(logging)?,
            ));
        }

        Ok(env)
    }

    fn command(step: &InstallStep) -> Command {
        #[cfg(windows)]
        {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(&step.run);
            command
        }
        #[cfg(not(windows))]
        {
            let mut command = Command::new("sh");
            command.arg("-c").arg(&step.run);
            command
        }
    }

    fn run_step(
        &self,
        cancel: &CancellationToken,
        step: &InstallStep,
        env: &[(String, String)],
    ) -> Result<()> {
        let failed = |reason: String| InstallError::ExecutionFailed {
            step: step.label().to_string(),
            reason,
        };

        debug!(step = step.label(), "Running install step");
        let child = Self::command(step)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        let status = self.wait(cancel, child)?;
        if status.success() {
            Ok(())
        } else {
            Err(failed(format!("exited with {status}")))
        }
    }

    /// Wait for the child, killing it when the run is cancelled
    fn wait(&self, cancel: &CancellationToken, mut child: Child) -> Result<ExitStatus> {
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if cancel.is_cancelled() {
                // The child may have exited between the two checks.
                let _ = child.kill();
                let _ = child.wait();
                return Err(InstallError::Cancelled);
            }
            std::thread::sleep(self.poll_interval);
        }
    }
}

impl RecipeExecutor for ShellExecutor {
    fn execute(
        &self,
        cancel: &CancellationToken,
        manifest: &DiscoveryManifest,
        recipe: &Recipe,
    ) -> Result<()> {
        let env = self.environment(manifest, recipe)?;

        for step in &recipe.steps {
            cancel.check()?;
            self.run_step(cancel, step, &env)?;
        }

        info!(recipe = %recipe.name, steps = recipe.steps.len(), "Executed recipe");
        Ok(())
    }
}
