//! Operator consent for watching discovered log files
//!
//! Each candidate log pattern is confirmed individually. Consent defaults to
//! declining when it cannot be obtained.

use inquire::Select;
use tracing::error;

use crate::recipe::{LogMatch, LoggingConfig};

const YES: &str = "Yes";
const NO: &str = "No";

/// Asks the operator whether a log file pattern should be watched
pub trait ConsentPrompt {
    fn accept_log_file(&self, log_match: &LogMatch) -> bool;
}

/// Interactive prompt on the terminal
#[derive(Debug, Default)]
pub struct InquirePrompt;

impl ConsentPrompt for InquirePrompt {
    fn accept_log_file(&self, log_match: &LogMatch) -> bool {
        let message = format!(
            "Files have been found at the following pattern: {}\nDo you want to watch them?",
            log_match.file
        );

        match Select::new(&message, vec![YES, NO])
            .with_help_message("↑↓ to move, ENTER to select")
            .prompt()
        {
            Ok(answer) => answer == YES,
            Err(e) => {
                error!("prompt failed: {}", e);
                false
            }
        }
    }
}

/// Collect the matches the operator accepted, keeping discovery order
pub fn accept_log_matches(prompt: &dyn ConsentPrompt, matches: Vec<LogMatch>) -> LoggingConfig {
    LoggingConfig {
        logs: matches
            .into_iter()
            .filter(|m| prompt.accept_log_file(m))
            .collect(),
    }
}
