//! Command-line arguments.

use crate::config::{Config, Verbosity};
use crate::constants::{command_timeout, timeout_from_secs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Keep a project in sync with its upstream boilerplate.
#[derive(Debug, Parser)]
#[command(name = "pb", version)]
pub struct Cli {
    /// Only print errors and warnings
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Echo every external command
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Seconds before an external command is killed (0 waits forever) [env: PB_TIMEOUT]
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Run as if started in DIR
    #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Fetch the pb-core remote
    Fetch,
    /// Rebase pb-core onto the upstream branch and push it to origin
    Update,
    /// Merge pb-core into the current branch
    Merge,
    /// Push pb-core upstream and to origin
    Push,
    /// Create a new project from the boilerplate
    Create,
    /// Prompt for the upstream repository and branch again
    Config,
    /// Show which project markers are present
    Check,
}

impl Cli {
    #[must_use]
    pub fn config(&self) -> Config {
        let verbosity = if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        let timeout = match self.timeout {
            Some(secs) => timeout_from_secs(secs),
            None => command_timeout(),
        };
        Config { verbosity, timeout }
    }
}
