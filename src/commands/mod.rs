//! Command implementations for the Instrumentor CLI

pub mod completions;
pub mod install;
pub mod profiles;
