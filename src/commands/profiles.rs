//! Profiles command implementation
//!
//! Lists the profiles configured in `profiles.yaml`, marking the one an
//! install would use when no `--profile` is given.

use std::path::{Path, PathBuf};

use console::Style;

use crate::cli::ProfilesArgs;
use crate::config::{self, Profile, ProfileStore};
use crate::error::Result;

/// Run profiles command
pub fn run(config_dir: Option<PathBuf>, args: ProfilesArgs) -> Result<()> {
    let dir = config::config_dir(config_dir.as_deref())?;
    let path = dir.join(config::PROFILES_FILE);
    let store = ProfileStore::load(&path)?;

    list_profiles(&store, &path, args.show_keys)
}

fn list_profiles(store: &ProfileStore, path: &Path, show_keys: bool) -> Result<()> {
    if store.profiles.is_empty() {
        println!("No profiles configured.");
        println!("Add one to {}", path.display());
        return Ok(());
    }

    let default = store.resolve(None)?.map(|(name, _)| name);

    println!("Configured profiles ({}):", store.profiles.len());
    println!();

    for (name, profile) in &store.profiles {
        display_profile(name, profile, default.as_deref() == Some(name), show_keys);
        println!();
    }

    Ok(())
}

fn display_profile(name: &str, profile: &Profile, is_default: bool, show_keys: bool) {
    let marker = if is_default { " (default)" } else { "" };
    println!(
        "  {}{}",
        Style::new().bold().yellow().apply_to(name),
        Style::new().dim().apply_to(marker)
    );
    println!(
        "    {} {}",
        Style::new().bold().apply_to("Account:"),
        profile.account_id
    );
    println!(
        "    {} {}",
        Style::new().bold().apply_to("Region:"),
        profile.region.as_str()
    );

    let key = if show_keys {
        profile.api_key.clone()
    } else {
        mask_key(&profile.api_key)
    };
    println!("    {} {}", Style::new().bold().apply_to("API key:"), key);
}

/// Keep only the last four characters of an API key
fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    let visible = chars.len().saturating_sub(4);
    let tail: String = chars[visible..].iter().collect();
    format!("{}{}", "*".repeat(visible.min(8)), tail)
}
