//! Application-wide constants.
//!
//! Centralized names and defaults shared by the workflow, the config store and the CLI.

use std::time::Duration;

/// Default timeout for external commands (in seconds).
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;

/// Returns the external command timeout, or `None` when disabled.
///
/// Can be customized via the PB_TIMEOUT environment variable (in seconds).
/// `PB_TIMEOUT=0` disables the timeout. Falls back to 300 seconds if not set or invalid.
pub fn command_timeout() -> Option<Duration> {
    let secs = std::env::var("PB_TIMEOUT")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS);
    timeout_from_secs(secs)
}

/// Maps a number of seconds to a timeout, `0` meaning no timeout.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Branch and remote name tracking the upstream boilerplate.
pub const PB_CORE: &str = "pb-core";

/// Remote the project itself is pushed to.
pub const ORIGIN: &str = "origin";

/// Savepoint tag created before `update` rebases.
pub const BACKUP_TAG: &str = "pb-backup-before-update";

/// Config file name, relative to the working directory.
pub const CONFIG_FILE: &str = "pb-config.json";

pub const DEFAULT_BRANCH: &str = "master";
pub const CLIENT_REPOSITORY: &str = "https://github.com/dorian-marchal/phonegap-boilerplate";
pub const SERVER_REPOSITORY: &str =
    "https://github.com/dorian-marchal/phonegap-boilerplate-server";

pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

/// Progress spinner tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;

/// Poll interval while waiting on a child process with a timeout.
pub const PROCESS_POLL_MS: u64 = 20;
