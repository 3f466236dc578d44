//! Run-wide cancellation signal
//!
//! A single [`CancellationToken`] is created per run and handed to every
//! collaborator call. SIGINT/SIGTERM trip it; a second interrupt while the
//! token is already tripped terminates the process.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use signal_hook::consts::{SIGINT, SIGTERM};

use crate::error::{InstallError, Result};

/// Exit status used when a second interrupt forces termination
const FORCED_EXIT_CODE: i32 = 130;

/// Shared flag observed by long-running collaborator calls
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token tripped by SIGINT and SIGTERM
    pub fn from_signals() -> Result<Self> {
        let token = Self::new();
        for signal in [SIGINT, SIGTERM] {
            // Order matters: the conditional shutdown must see the flag before
            // the first interrupt sets it.
            signal_hook::flag::register_conditional_shutdown(
                signal,
                FORCED_EXIT_CODE,
                Arc::clone(&token.flag),
            )?;
            signal_hook::flag::register(signal, Arc::clone(&token.flag))?;
        }
        Ok(token)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Return `Err(Cancelled)` once the token has been tripped
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(InstallError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration`, waking early when cancelled
    pub fn sleep(&self, duration: Duration) -> Result<()> {
        const SLICE: Duration = Duration::from_millis(100);
        let deadline = Instant::now() + duration;
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(SLICE.min(deadline - now));
        }
    }
}
