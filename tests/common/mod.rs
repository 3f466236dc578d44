//! Common test utilities for Instrumentor integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch environment with its own configuration directory and catalog
#[allow(dead_code)]
pub struct TestEnv {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Root of the scratch environment
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        std::fs::create_dir_all(path.join("config/recipes"))
            .expect("Failed to create catalog directory");
        Self { temp, path }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.path.join("config")
    }

    pub fn catalog_dir(&self) -> PathBuf {
        self.config_dir().join("recipes")
    }

    pub fn status_file(&self) -> PathBuf {
        self.config_dir().join("install-status.json")
    }

    /// Write a file relative to the environment root
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Add a recipe to the catalog whose single step creates `marker`
    pub fn add_catalog_recipe(&self, file: &str, name: &str, marker: &str) -> PathBuf {
        self.write_file(
            &format!("config/recipes/{file}"),
            &recipe_yaml(name, &format!("touch '{}'", self.path.join(marker).display())),
        )
    }

    pub fn write_profiles(&self, content: &str) {
        self.write_file("config/profiles.yaml", content);
    }

    pub fn exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    pub fn read_file(&self, path: &Path) -> String {
        std::fs::read_to_string(path).expect("Failed to read file")
    }

    /// Command for the real binary, isolated from the developer's configuration
    pub fn cmd(&self) -> Command {
        let mut cmd = instrumentor_cmd();
        cmd.env("INSTRUMENTOR_CONFIG_DIR", self.config_dir());
        cmd.current_dir(&self.path);
        cmd
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Recipe YAML with a single install step and no validation query
#[allow(dead_code)]
pub fn recipe_yaml(name: &str, run: &str) -> String {
    format!(
        "name: {name}\n\
         displayName: {name}\n\
         install:\n  \
           steps:\n    \
             - name: install\n      \
               run: \"{}\"\n",
        run.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

/// Recipe YAML recommended on any host, since its process matcher matches every process
#[allow(dead_code)]
pub fn recipe_yaml_for_any_process(name: &str, run: &str) -> String {
    format!("processMatch:\n  - \".*\"\n{}", recipe_yaml(name, run))
}

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated, dead_code)]
pub fn instrumentor_cmd() -> Command {
    let mut cmd = Command::cargo_bin("instrumentor").expect("binary is built");
    cmd.env_remove("INSTRUMENTOR_PROFILE");
    cmd.env_remove("INSTRUMENTOR_CONFIG_DIR");
    cmd.env_remove("INSTRUMENTOR_CATALOG");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_creation() {
        let env = TestEnv::new();
        assert!(env.catalog_dir().is_dir());
    }

    #[test]
    fn test_recipe_yaml_escapes_quotes() {
        let yaml = recipe_yaml("nginx", "echo \"hi\"");
        assert!(yaml.contains(r#"run: "echo \"hi\"""#));
    }

    #[test]
    fn test_any_process_recipe_is_valid_yaml() {
        let yaml = recipe_yaml_for_any_process("watcher", "true");
        assert!(yaml.starts_with("processMatch:\n  - \".*\"\nname: watcher\n"));
    }
}
