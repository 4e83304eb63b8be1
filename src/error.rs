//! Error taxonomy for synchronization operations.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Config file not found: {}", path.display())]
    ConfigMissing { path: PathBuf },

    #[error("Bad config file formatting in {}: {reason}", path.display())]
    ConfigMalformed { path: PathBuf, reason: String },

    #[error(
        "Not a boilerplate project.\n  As a client project: {client}\n  As a server project: {server}"
    )]
    NotAProject { client: String, server: String },

    #[error("Branch '{branch}' does not exist on remote '{remote}'")]
    RemoteBranchMissing { remote: String, branch: String },

    #[error("Current branch is '{actual}', checkout '{expected}' first")]
    WrongBranch { expected: String, actual: String },

    #[error("git {command} failed: {stderr}")]
    GitCommandFailed { command: String, stderr: String },

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Failed to spawn {program} command: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} timed out after {}s", timeout.as_secs())]
    CommandTimedOut { command: String, timeout: Duration },

    #[error("File system error at {}: {source}", path.display())]
    FileSystemError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Prompt failed: {0}")]
    PromptFailed(String),

    #[error(
        "Backup tag '{tag}' is left over from an interrupted update. Restore it with 'git reset --hard {tag}', then remove it with 'git tag -d {tag}'"
    )]
    BackupTagExists { tag: String },

    #[error("Update rolled back: {reason}")]
    RolledBack { reason: String },

    #[error("Rollback failed: {reason}. Restore manually with 'git reset --hard {tag}'")]
    RollbackFailed { reason: String, tag: String },
}

impl SyncError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::FileSystemError {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
