//! Boilerplate synchronization library.
//!
//! Keeps a project's copy of a shared boilerplate in sync with its upstream
//! template through a dedicated `pb-core` branch and remote:
//! - Detecting whether the working directory is a client or server project
//! - Resolving the upstream repository and branch from `pb-config.json` or prompts
//! - Fetching, rebasing (with a backup tag to roll back to), merging and pushing
//! - Creating new projects wired to the upstream boilerplate

pub mod cli;
pub mod config;
pub mod constants;
pub mod detect;
pub mod error;
pub mod git;
pub mod output;
pub mod paths;
pub mod process;
pub mod prompt;
pub mod store;
pub mod workflow;

pub use error::{Result, SyncError};
