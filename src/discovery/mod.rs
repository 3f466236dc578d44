//! Host discovery
//!
//! Produces a [`DiscoveryManifest`], the snapshot of host facts every later
//! phase uses to pick, run and validate recipes.

use serde::{Deserialize, Serialize};
use sysinfo::System;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::error::Result;

/// A running process seen during discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub command_line: String,
}

impl ProcessInfo {
    /// Text that recipe process matchers are applied to
    pub fn match_text(&self) -> &str {
        if self.command_line.is_empty() {
            &self.name
        } else {
            &self.command_line
        }
    }
}

/// Snapshot of discovered host facts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryManifest {
    pub hostname: String,
    pub os: String,
    pub platform: String,
    pub platform_version: String,
    pub kernel_version: String,
    pub kernel_arch: String,
    #[serde(default)]
    pub processes: Vec<ProcessInfo>,
}

/// Probes the host and produces a manifest
pub trait Discoverer {
    fn discover(&self, cancel: &CancellationToken) -> Result<DiscoveryManifest>;
}

/// Discoverer reading the local host through `sysinfo`
#[derive(Debug, Default)]
pub struct HostDiscoverer;

impl HostDiscoverer {
    pub fn new() -> Self {
        Self
    }

    fn processes(system: &System) -> Vec<ProcessInfo> {
        let mut processes: Vec<ProcessInfo> = system
            .processes()
            .values()
            .map(|process| ProcessInfo {
                pid: process.pid().as_u32(),
                name: process.name().to_string_lossy().to_string(),
                command_line: process
                    .cmd()
                    .iter()
                    .map(|arg| arg.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" "),
            })
            .collect();
        processes.sort_by_key(|p| p.pid);
        processes
    }
}

impl Discoverer for HostDiscoverer {
    fn discover(&self, cancel: &CancellationToken) -> Result<DiscoveryManifest> {
        cancel.check()?;

        let system = System::new_all();
        cancel.check()?;

        let manifest = DiscoveryManifest {
            hostname: System::host_name().unwrap_or_default(),
            os: std::env::consts::OS.to_string(),
            platform: System::distribution_id(),
            platform_version: System::os_version().unwrap_or_default(),
            kernel_version: System::kernel_version().unwrap_or_default(),
            kernel_arch: std::env::consts::ARCH.to_string(),
            processes: Self::processes(&system),
        };

        debug!(
            hostname = %manifest.hostname,
            os = %manifest.os,
            platform = %manifest.platform,
            processes = manifest.processes.len(),
            "Discovered host"
        );

        Ok(manifest)
    }
}
