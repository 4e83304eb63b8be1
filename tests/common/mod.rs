//! Test infrastructure for pb-sync integration tests.
#![allow(dead_code)]

use anyhow::Result;
use pb_sync::SyncError;
use pb_sync::config::{Config, Verbosity};
use pb_sync::git::Git;
use pb_sync::process::{CommandOutput, CommandRunner, SystemRunner};
use pb_sync::prompt::{Field, Prompter};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

pub fn test_config() -> Config {
    Config {
        verbosity: Verbosity::Quiet,
        timeout: None,
    }
}

pub fn run_git(path: &Path, args: &[&str]) -> Result<String> {
    Ok(Git::new(SystemRunner::default(), path).run(args)?)
}

/// Records every command and answers from a list of prefix → output rules.
/// Commands without a matching rule succeed with empty output.
#[derive(Default)]
pub struct FakeRunner {
    responses: Vec<(String, CommandOutput)>,
    calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers commands starting with `prefix` (e.g. `"git pull --rebase"`).
    pub fn respond(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.responses.push((prefix.to_string(), output));
        self
    }

    pub fn fail(self, prefix: &str, stderr: &str) -> Self {
        self.respond(prefix, CommandOutput::failed(stderr))
    }

    pub fn on_branch(self, branch: &str) -> Self {
        self.respond("git rev-parse --abbrev-ref HEAD", CommandOutput::ok(branch))
    }

    pub fn with_remote_branch(self, branch: &str) -> Self {
        self.respond(
            "git ls-remote --heads",
            CommandOutput::ok(format!("0123abcd\trefs/heads/{}", branch)),
        )
    }

    /// Every recorded command, except the concurrent `show-ref` detection checks.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| !call.starts_with("git show-ref"))
            .cloned()
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, _dir: &Path, program: &str, args: &[&str]) -> pb_sync::Result<CommandOutput> {
        let line = format!("{} {}", program, args.join(" "));
        self.calls.lock().unwrap().push(line.clone());
        Ok(self
            .responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::ok("")))
    }
}

/// Answers prompts from queues. An empty text answer takes the field default;
/// running out of answers fails the prompt.
#[derive(Default)]
pub struct ScriptedPrompter {
    inputs: RefCell<VecDeque<String>>,
    confirms: RefCell<VecDeque<bool>>,
    selects: RefCell<VecDeque<usize>>,
    pub asked_fields: RefCell<Vec<Field>>,
    pub asked_confirms: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(self, answers: &[&str]) -> Self {
        self.inputs
            .borrow_mut()
            .extend(answers.iter().map(|a| a.to_string()));
        self
    }

    pub fn confirms(self, answers: &[bool]) -> Self {
        self.confirms.borrow_mut().extend(answers.iter().copied());
        self
    }

    pub fn selects(self, answers: &[usize]) -> Self {
        self.selects.borrow_mut().extend(answers.iter().copied());
        self
    }
}

fn exhausted(kind: &str) -> SyncError {
    SyncError::PromptFailed(format!("no scripted {} answer", kind))
}

impl Prompter for ScriptedPrompter {
    fn input(&self, field: &Field) -> pb_sync::Result<String> {
        self.asked_fields.borrow_mut().push(field.clone());
        let answer = self
            .inputs
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| exhausted("input"))?;
        Ok(if answer.is_empty() {
            field.default.clone().unwrap_or_default()
        } else {
            answer
        })
    }

    fn confirm(&self, message: &str, _default: bool) -> pb_sync::Result<bool> {
        self.asked_confirms.borrow_mut().push(message.to_string());
        self.confirms
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| exhausted("confirm"))
    }

    fn select(&self, _message: &str, _items: &[&str], _default: usize) -> pb_sync::Result<usize> {
        self.selects
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| exhausted("select"))
    }
}

/// Writes empty files and creates directories under `root`.
pub fn add_markers(root: &Path, files: &[&str], dirs: &[&str]) -> Result<()> {
    for dir in dirs {
        std::fs::create_dir_all(root.join(dir))?;
    }
    for file in files {
        let path = root.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, "")?;
    }
    Ok(())
}

pub fn add_client_markers(root: &Path) -> Result<()> {
    add_markers(root, &["config.xml", "www/cordova.js"], &[".cordova"])
}

pub fn add_server_markers(root: &Path) -> Result<()> {
    add_markers(
        root,
        &["version.json", "core/RestServer.js"],
        &["core/server_modules"],
    )
}

pub fn write_config(root: &Path, repository: &str, branch: &str) -> Result<()> {
    std::fs::write(
        root.join("pb-config.json"),
        format!(
            "{{\n  \"repository\": \"{}\",\n  \"branch\": \"{}\"\n}}\n",
            repository, branch
        ),
    )?;
    Ok(())
}

/// A temporary git repository for testing.
/// Automatically cleaned up when dropped.
pub struct TestRepo {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TestRepo {
    /// Creates a new test repository with an initial commit on the master branch.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();

        run_git(&path, &["init", "-b", "master"])?;
        run_git(&path, &["config", "user.email", "test@example.com"])?;
        run_git(&path, &["config", "user.name", "Test User"])?;

        std::fs::write(path.join("README.md"), "# Test Repo\n")?;
        run_git(&path, &["add", "README.md"])?;
        run_git(&path, &["commit", "-m", "Initial commit"])?;

        Ok(Self {
            _temp_dir: temp_dir,
            path,
        })
    }

    /// Clones `url` into a fresh temporary directory.
    pub fn clone_from(url: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("clone");
        run_git(temp_dir.path(), &["clone", url, "clone"])?;
        run_git(&path, &["config", "user.email", "test@example.com"])?;
        run_git(&path, &["config", "user.name", "Test User"])?;
        Ok(Self {
            _temp_dir: temp_dir,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git(&self, args: &[&str]) -> Result<String> {
        run_git(&self.path, args)
    }

    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Result<()> {
        let path = self.path.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        self.git(&["add", name])?;
        self.git(&["commit", "-m", message])?;
        Ok(())
    }

    pub fn head(&self) -> Result<String> {
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn tag_exists(&self, tag: &str) -> Result<bool> {
        Ok(!self.git(&["tag", "--list", tag])?.is_empty())
    }
}

/// A bare repository standing in for a remote.
pub struct BareRemote {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl BareRemote {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        run_git(&path, &["init", "--bare", "-b", "master"])?;
        Ok(Self {
            _temp_dir: temp_dir,
            path,
        })
    }

    pub fn url(&self) -> &str {
        self.path.to_str().expect("temp path is valid UTF-8")
    }

    pub fn branch_head(&self, branch: &str) -> Result<String> {
        run_git(&self.path, &["rev-parse", &format!("refs/heads/{}", branch)])
    }
}

/// An upstream boilerplate: a bare remote seeded from a working clone.
pub struct Upstream {
    pub remote: BareRemote,
    pub seed: TestRepo,
}

impl Upstream {
    /// Upstream whose `master` contains the seed's initial commit.
    pub fn new() -> Result<Self> {
        let remote = BareRemote::new()?;
        let seed = TestRepo::new()?;
        seed.git(&["remote", "add", "origin", remote.url()])?;
        seed.git(&["push", "origin", "master"])?;
        Ok(Self { remote, seed })
    }

    /// Upstream laid out like a client boilerplate: an installable
    /// `Makefile` and a config template.
    pub fn boilerplate() -> Result<Self> {
        let upstream = Self::new()?;
        upstream.publish("Makefile", "install:\n\t@echo installed\n", "Add Makefile")?;
        upstream.publish(
            "www/js/config.js.default",
            "module.exports = {};\n",
            "Add config template",
        )?;
        Ok(upstream)
    }

    pub fn publish(&self, name: &str, content: &str, message: &str) -> Result<()> {
        self.seed.commit_file(name, content, message)?;
        self.seed.git(&["push", "origin", "master"])?;
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.remote.url()
    }
}

/// A client project cloned from `upstream` and checked out on `pb-core`,
/// with `origin` pointing at its own bare remote.
pub struct ClientProject {
    pub repo: TestRepo,
    pub origin: BareRemote,
}

impl ClientProject {
    pub fn new(upstream: &Upstream) -> Result<Self> {
        let repo = TestRepo::clone_from(upstream.url())?;
        repo.git(&["remote", "rename", "origin", "pb-core"])?;
        repo.git(&["checkout", "-b", "pb-core"])?;

        let origin = BareRemote::new()?;
        repo.git(&["remote", "add", "origin", origin.url()])?;

        add_client_markers(repo.path())?;
        // Keep the markers out of the history so rebases stay clean.
        std::fs::write(
            repo.path().join(".git/info/exclude"),
            "config.xml\nwww/\n.cordova/\npb-config.json\n",
        )?;
        Ok(Self { repo, origin })
    }

    pub fn path(&self) -> &Path {
        self.repo.path()
    }
}
