//! Output and process settings shared by every `pb` command.

use crate::process::{self, CommandLogger};
use std::time::Duration;

/// Settings resolved once from the `-q`/`-v`/`--timeout` flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    pub verbosity: Verbosity,
    /// Limit for each git or make invocation. `None` waits for ever.
    pub timeout: Option<Duration>,
}

impl Config {
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// `-v` echoes each external command with the directory it runs in.
    #[must_use]
    pub fn command_logger(&self) -> CommandLogger {
        if self.is_verbose() {
            process::verbose_logger
        } else {
            process::no_op_logger
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Only warnings and errors.
    Quiet,
    #[default]
    Normal,
    /// Step announcements and command echo, no spinner.
    Verbose,
}
