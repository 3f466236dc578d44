//! Install workflow
//!
//! [`RecipeInstaller`] sequences discovery, recipe acquisition, and the
//! infrastructure, logging, and integration phases over a set of
//! [`Collaborators`].

pub mod consent;
pub mod context;
pub mod display;
pub mod orchestrator;

pub use consent::{ConsentPrompt, InquirePrompt};
pub use context::{AcquisitionMode, InstallContext};
pub use orchestrator::{Collaborators, RecipeInstaller};
