//! Git command wrappers.
//!
//! This module provides a thin facade over the git CLI rooted at one
//! working directory, handling command execution and error formatting.

use crate::error::{Result, SyncError};
use crate::process::{CommandOutput, CommandRunner};
use std::path::{Path, PathBuf};

const GIT: &str = "git";

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('-') || name.contains('\0') || name.contains('\n') {
        return Err(SyncError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Git commands issued against a single working directory.
#[derive(Debug, Clone)]
pub struct Git<R> {
    runner: R,
    working_dir: PathBuf,
}

impl<R: CommandRunner> Git<R> {
    pub fn new(runner: R, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Re-roots every subsequent command at `dir`.
    pub fn set_working_dir(&mut self, dir: impl Into<PathBuf>) {
        self.working_dir = dir.into();
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs a git sub-command, reporting success or failure with captured output.
    pub fn output(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner.run(&self.working_dir, GIT, args)
    }

    /// Runs a git sub-command and returns its trimmed stdout.
    /// A non-zero exit becomes [`SyncError::GitCommandFailed`].
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(SyncError::GitCommandFailed {
                command: args.join(" "),
                stderr: output.stderr,
            })
        }
    }

    /// Lookup failures read as "does not exist".
    pub fn local_branch_exists(&self, branch: &str) -> bool {
        if validate_name(branch).is_err() {
            return false;
        }
        let reference = format!("refs/heads/{}", branch);
        self.output(&["show-ref", "--verify", "--quiet", &reference])
            .map(|output| output.success)
            .unwrap_or(false)
    }

    /// Lookup failures read as "does not exist".
    pub fn remote_branch_exists(&self, remote: &str, branch: &str) -> bool {
        if validate_name(branch).is_err() {
            return false;
        }
        let reference = format!("refs/heads/{}", branch);
        match self.output(&["ls-remote", "--heads", remote]) {
            Ok(output) if output.success => output
                .stdout
                .lines()
                .filter_map(|line| line.split('\t').nth(1))
                .any(|name| name == reference),
            _ => false,
        }
    }

    pub fn get_current_branch(&self) -> Result<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Name of the checked-out branch, also when it has no commit yet.
    pub fn symbolic_head(&self) -> Result<String> {
        self.run(&["symbolic-ref", "--short", "HEAD"])
    }

    pub fn fetch_remote(&self, remote: &str) -> Result<()> {
        validate_name(remote)?;
        self.run(&["fetch", remote])?;
        Ok(())
    }

    pub fn merge_branch(&self, branch: &str, no_commit: bool) -> Result<()> {
        validate_name(branch)?;
        if no_commit {
            self.run(&["merge", "--no-commit", branch])?;
        } else {
            self.run(&["merge", branch])?;
        }
        Ok(())
    }

    /// Merges `branch` with a fixed commit message. Histories that share no
    /// commit are merged too, as happens for a freshly initialized project.
    pub fn merge_with_message(&self, branch: &str, message: &str) -> Result<()> {
        validate_name(branch)?;
        self.run(&["merge", "--allow-unrelated-histories", "-m", message, branch])?;
        Ok(())
    }

    /// Pushes `local` to `remote_branch` on `remote`.
    pub fn push_branch(&self, remote: &str, local: &str, remote_branch: &str) -> Result<()> {
        validate_name(remote)?;
        validate_name(local)?;
        validate_name(remote_branch)?;
        let refspec = format!("{}:{}", local, remote_branch);
        self.run(&["push", remote, &refspec])?;
        Ok(())
    }

    /// Lookup failures read as "does not exist".
    pub fn tag_exists(&self, name: &str) -> bool {
        if validate_name(name).is_err() {
            return false;
        }
        self.run(&["tag", "--list", name])
            .map(|listed| listed.lines().any(|line| line == name))
            .unwrap_or(false)
    }

    pub fn tag(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.run(&["tag", name])?;
        Ok(())
    }

    pub fn delete_tag(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.run(&["tag", "-d", name])?;
        Ok(())
    }

    pub fn reset_hard(&self, target: &str) -> Result<()> {
        validate_name(target)?;
        self.run(&["reset", "--hard", target])?;
        Ok(())
    }

    pub fn pull_rebase(&self, remote: &str, branch: &str) -> Result<()> {
        validate_name(remote)?;
        validate_name(branch)?;
        self.run(&["pull", "--rebase", remote, branch])?;
        Ok(())
    }

    pub fn rebase_abort(&self) -> Result<()> {
        self.run(&["rebase", "--abort"])?;
        Ok(())
    }

    /// Clones `url` into `dir`, relative to the working directory.
    pub fn clone_into(&self, url: &str, dir: &str) -> Result<()> {
        validate_name(dir)?;
        self.run(&["clone", url, dir])?;
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        self.run(&["init"])?;
        Ok(())
    }

    pub fn remote_add(&self, name: &str, url: &str) -> Result<()> {
        validate_name(name)?;
        self.run(&["remote", "add", name, url])?;
        Ok(())
    }

    pub fn checkout(&self, branch: &str) -> Result<()> {
        validate_name(branch)?;
        self.run(&["checkout", branch])?;
        Ok(())
    }

    pub fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        validate_name(branch)?;
        self.run(&["checkout", "-b", branch])?;
        Ok(())
    }

    pub fn commit_allow_empty(&self, message: &str) -> Result<()> {
        self.run(&["commit", "--allow-empty", "-m", message])?;
        Ok(())
    }

    pub fn submodule_init(&self) -> Result<()> {
        self.run(&["submodule", "init"])?;
        Ok(())
    }

    pub fn submodule_update(&self) -> Result<()> {
        self.run(&["submodule", "update"])?;
        Ok(())
    }
}
