//! Project type detection.
//!
//! A project is recognized by a set of marker paths plus the local
//! `pb-core` branch. The markers of one set are checked in parallel.

use crate::constants::{CLIENT_REPOSITORY, PB_CORE, SERVER_REPOSITORY};
use crate::error::{Result, SyncError};
use crate::git::Git;
use crate::paths::{PathKind, check_path};
use crate::process::CommandRunner;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Check name → failure reason (`None` when the check passed).
pub type CheckResult = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Client,
    Server,
}

impl ProjectType {
    pub const ALL: [ProjectType; 2] = [ProjectType::Client, ProjectType::Server];

    pub fn default_repository(self) -> &'static str {
        match self {
            ProjectType::Client => CLIENT_REPOSITORY,
            ProjectType::Server => SERVER_REPOSITORY,
        }
    }

    /// Template shipped by the boilerplate and the file the user edits.
    pub fn config_template(self) -> (&'static str, &'static str) {
        match self {
            ProjectType::Client => ("www/js/config.js.default", "www/js/config.js"),
            ProjectType::Server => ("config.js.default", "config.js"),
        }
    }

    pub fn checks(self) -> &'static [Check] {
        match self {
            ProjectType::Client => CLIENT_CHECKS,
            ProjectType::Server => SERVER_CHECKS,
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectType::Client => write!(f, "client"),
            ProjectType::Server => write!(f, "server"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Path(&'static str, PathKind),
    LocalBranch(&'static str),
}

const CLIENT_CHECKS: &[Check] = &[
    Check::Path("config.xml", PathKind::File),
    Check::Path("www/cordova.js", PathKind::File),
    Check::Path(".cordova", PathKind::Directory),
    Check::LocalBranch(PB_CORE),
];

const SERVER_CHECKS: &[Check] = &[
    Check::Path("version.json", PathKind::File),
    Check::Path("core/RestServer.js", PathKind::File),
    Check::Path("core/server_modules", PathKind::Directory),
    Check::LocalBranch(PB_CORE),
];

impl Check {
    pub fn name(&self) -> String {
        match self {
            Check::Path(path, _) => path.to_string(),
            Check::LocalBranch(branch) => format!("branch {}", branch),
        }
    }

    /// Returns the failure reason, if any.
    pub fn run<R: CommandRunner>(&self, git: &Git<R>) -> std::result::Result<(), String> {
        match self {
            Check::Path(path, kind) => {
                check_path(&git.working_dir().join(path), *kind).map_err(|e| e.to_string())
            }
            Check::LocalBranch(branch) => {
                if git.local_branch_exists(branch) {
                    Ok(())
                } else {
                    Err(format!("local branch '{}' does not exist", branch))
                }
            }
        }
    }
}

/// Runs the checks of `project_type` concurrently, stopping at the first failure seen.
pub fn check_project<R: CommandRunner>(
    git: &Git<R>,
    project_type: ProjectType,
) -> std::result::Result<(), String> {
    match project_type
        .checks()
        .par_iter()
        .find_map_any(|check| check.run(git).err())
    {
        Some(reason) => Err(reason),
        None => Ok(()),
    }
}

/// Client first, server only when the client checks fail.
pub fn detect<R: CommandRunner>(git: &Git<R>) -> Result<ProjectType> {
    let client = match check_project(git, ProjectType::Client) {
        Ok(()) => return Ok(ProjectType::Client),
        Err(reason) => reason,
    };
    let server = match check_project(git, ProjectType::Server) {
        Ok(()) => return Ok(ProjectType::Server),
        Err(reason) => reason,
    };
    Err(SyncError::NotAProject { client, server })
}

/// Evaluates every check of `project_type` without short-circuiting.
pub fn report<R: CommandRunner>(git: &Git<R>, project_type: ProjectType) -> CheckResult {
    project_type
        .checks()
        .par_iter()
        .map(|check| (check.name(), check.run(git).err()))
        .collect()
}
