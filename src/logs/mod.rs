//! Log file discovery
//!
//! Recipes declare the log files their software writes as glob patterns. The
//! filterer keeps the patterns that match files present on this host so the
//! operator can be asked whether to watch them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;
use wax::{CandidatePath, Glob, Pattern};

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::recipe::{LogMatch, Recipe};

/// Finds candidate log files for a set of recipes
pub trait FileFilterer {
    fn filter(&self, cancel: &CancellationToken, recipes: &[Recipe]) -> Result<Vec<LogMatch>>;
}

/// Filterer resolving log match patterns against the local filesystem
#[derive(Debug, Default)]
pub struct GlobFileFilterer;

const GLOB_META: [char; 4] = ['*', '?', '[', '{'];

impl GlobFileFilterer {
    pub fn new() -> Self {
        Self
    }

    /// Split a pattern into its literal directory prefix and the glob remainder
    fn split_pattern(pattern: &str) -> (PathBuf, Option<String>) {
        let normalized = pattern.replace('\\', "/");
        let components: Vec<&str> = normalized.split('/').collect();
        let Some(first_glob) = components
            .iter()
            .position(|c| c.contains(GLOB_META.as_slice()))
        else {
            return (PathBuf::from(normalized), None);
        };

        let prefix = components[..first_glob].join("/");
        let prefix = match prefix.as_str() {
            "" if normalized.starts_with('/') => PathBuf::from("/"),
            "" => PathBuf::from("."),
            _ => PathBuf::from(prefix),
        };
        (prefix, Some(components[first_glob..].join("/")))
    }

    /// Whether at least one existing file matches the pattern
    fn has_matching_file(pattern: &str) -> bool {
        let (prefix, remainder) = Self::split_pattern(pattern);
        let Some(remainder) = remainder else {
            return prefix.is_file();
        };

        let glob = match Glob::new(&remainder) {
            Ok(glob) => glob,
            Err(e) => {
                warn!("Ignoring invalid log file pattern {}: {}", pattern, e);
                return false;
            }
        };

        let max_depth = if remainder.contains("**") {
            usize::MAX
        } else {
            remainder.split('/').count()
        };

        WalkDir::new(&prefix)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .any(|entry| Self::matches_relative(&glob, &prefix, entry.path()))
    }

    fn matches_relative(glob: &Glob<'_>, prefix: &Path, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(prefix) else {
            return false;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        glob.matched(&CandidatePath::from(relative.as_str()))
            .is_some()
    }
}

impl FileFilterer for GlobFileFilterer {
    fn filter(&self, cancel: &CancellationToken, recipes: &[Recipe]) -> Result<Vec<LogMatch>> {
        let mut seen = HashSet::new();
        let mut matches = Vec::new();

        for log_match in recipes.iter().flat_map(|recipe| recipe.log_matches.iter()) {
            cancel.check()?;
            if !seen.insert(log_match.file.clone()) {
                continue;
            }
            if Self::has_matching_file(&log_match.file) {
                debug!(pattern = %log_match.file, "Found log files");
                matches.push(log_match.clone());
            }
        }

        Ok(matches)
    }
}
