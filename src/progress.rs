//! Spinner display for long-running install phases

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub const CHECK_MARK: &str = "\u{2705}";
pub const BOOM: &str = "\u{1F4A5}";

/// A spinner bracketing one external call
///
/// The starting message stays on screen after completion, prefixed by a
/// success or failure glyph.
pub struct Spinner {
    pb: ProgressBar,
    message: String,
}

impl Spinner {
    /// Start a spinner with the given message
    pub fn start(message: impl Into<String>) -> Self {
        let message = message.into();
        let pb = if std::io::stderr().is_terminal() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };

        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.clone());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb, message }
    }

    /// Finish with the success glyph
    pub fn succeed(self) {
        self.finish(CHECK_MARK);
    }

    /// Finish with the failure glyph
    pub fn fail(self) {
        self.finish(BOOM);
    }

    fn finish(self, glyph: &str) {
        self.pb.finish_and_clear();
        eprintln!("{glyph} {}", self.message);
    }
}
