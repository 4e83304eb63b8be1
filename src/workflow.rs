//! Synchronization workflow.
//!
//! Composes project detection, the config store and git into the
//! fetch / update / merge / push / create operations. Every operation
//! is a linear sequence of steps; the first failing step ends it.

use crate::config::Config;
use crate::constants::{
    BACKUP_TAG, DEFAULT_BRANCH, INITIAL_COMMIT_MESSAGE, ORIGIN, PB_CORE,
};
use crate::detect::{self, CheckResult, ProjectType};
use crate::error::{Result, SyncError};
use crate::git::Git;
use crate::output::{self, StepProgress};
use crate::process::CommandRunner;
use crate::prompt::{Field, Prompter};
use crate::store::{self, ConfigStore, Configuration, LoadSource, PartialConfiguration};
use std::path::{Path, PathBuf};

/// How a non-failing `update` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Rebased and pushed to origin; backup tag removed.
    Pushed,
    /// Push declined; the rebase was rolled back.
    Declined,
}

/// Where the code of a new project comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSource {
    Init,
    /// URL of an existing, empty repository.
    Clone(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOptions {
    pub project_type: ProjectType,
    /// Directory to create, relative to the working directory.
    pub directory: String,
    pub upstream: Configuration,
    pub source: ProjectSource,
}

pub struct SyncWorkflow<R, P> {
    config: Config,
    git: Git<R>,
    store: ConfigStore,
    prompter: P,
    project_type: Option<ProjectType>,
}

impl<R: CommandRunner, P: Prompter> SyncWorkflow<R, P> {
    pub fn new(config: Config, runner: R, prompter: P, working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            config,
            store: ConfigStore::new(
                &working_dir,
                PartialConfiguration::new(None, Some(DEFAULT_BRANCH)),
            ),
            git: Git::new(runner, working_dir),
            prompter,
            project_type: None,
        }
    }

    pub fn git(&self) -> &Git<R> {
        &self.git
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn working_dir(&self) -> &Path {
        self.git.working_dir()
    }

    pub fn project_type(&self) -> Option<ProjectType> {
        self.project_type
    }

    fn reroot(&mut self, dir: &Path) {
        self.git.set_working_dir(dir);
        self.store.set_working_dir(dir);
    }

    fn detect_project(&mut self) -> Result<ProjectType> {
        let project_type = detect::detect(&self.git)?;
        output::print_project_type(project_type, &self.config);
        self.project_type = Some(project_type);
        self.store.merge(&PartialConfiguration::new(
            Some(project_type.default_repository()),
            None,
        ));
        Ok(project_type)
    }

    /// Detects the project, resolves the configuration and, when it came
    /// from the prompt, checks that the branch exists upstream.
    pub fn load_and_check_config(&mut self) -> Result<Configuration> {
        self.detect_project()?;

        let source = self.store.load(&self.prompter)?;
        let config = self.store.configuration()?;

        if let LoadSource::Prompt { fallback } = source {
            if matches!(fallback, SyncError::ConfigMalformed { .. }) {
                output::print_warning(&fallback.to_string());
            }
            output::print_info(
                &format!("Config file written in: {}", self.store.path().display()),
                &self.config,
            );
            output::print_step("Checking the remote branch", &self.config);
            if !self
                .git
                .remote_branch_exists(&config.repository, &config.branch)
            {
                return Err(SyncError::RemoteBranchMissing {
                    remote: config.repository,
                    branch: config.branch,
                });
            }
        }

        Ok(config)
    }

    /// Fetches the upstream remote. A failed fetch is reported, not returned.
    pub fn fetch(&mut self) -> Result<bool> {
        self.load_and_check_config()?;

        output::print_step("Fetching pb-core", &self.config);
        match self.git.fetch_remote(PB_CORE) {
            Ok(()) => {
                output::print_success("pb-core fetched", &self.config);
                Ok(true)
            }
            Err(e) => {
                output::print_warning(&format!("Fetch failed: {}", e));
                Ok(false)
            }
        }
    }

    /// Rebases `pb-core` onto the upstream branch and offers to push it.
    ///
    /// The repository is tagged before the rebase. Until that tag is
    /// deleted, every failure resets to it; only a successful rebase and
    /// push consume it.
    pub fn update(&mut self) -> Result<UpdateOutcome> {
        let config = self.load_and_check_config()?;

        let current = self.git.get_current_branch()?;
        if current != PB_CORE {
            return Err(SyncError::WrongBranch {
                expected: PB_CORE.to_string(),
                actual: current,
            });
        }

        if self.git.tag_exists(BACKUP_TAG) {
            return Err(SyncError::BackupTagExists {
                tag: BACKUP_TAG.to_string(),
            });
        }

        output::print_step("Creating the backup tag", &self.config);
        self.git.tag(BACKUP_TAG)?;

        output::print_step(
            &format!("Pulling {} from pb-core", config.branch),
            &self.config,
        );
        if let Err(e) = self.git.pull_rebase(PB_CORE, &config.branch) {
            // A conflicting rebase leaves HEAD detached; the abort may fail when none is in progress.
            let _ = self.git.rebase_abort();
            return Err(self.rollback(e.to_string()));
        }

        let message = format!("Push {} to {}?", PB_CORE, ORIGIN);
        match self.prompter.confirm(&message, false) {
            Ok(true) => {}
            Ok(false) => {
                self.restore_backup().map_err(|e| SyncError::RollbackFailed {
                    reason: e.to_string(),
                    tag: BACKUP_TAG.to_string(),
                })?;
                output::print_info("Push declined, update rolled back", &self.config);
                return Ok(UpdateOutcome::Declined);
            }
            Err(e) => return Err(self.rollback(e.to_string())),
        }

        output::print_step("Pushing pb-core to origin", &self.config);
        if let Err(e) = self.git.push_branch(ORIGIN, PB_CORE, PB_CORE) {
            return Err(self.rollback(e.to_string()));
        }

        self.git.delete_tag(BACKUP_TAG)?;
        output::print_success("pb-core updated and pushed to origin", &self.config);
        Ok(UpdateOutcome::Pushed)
    }

    /// Resets to the backup tag and turns `reason` into the error to report.
    fn rollback(&self, reason: String) -> SyncError {
        output::print_step("Rolling back to the backup tag", &self.config);
        match self.restore_backup() {
            Ok(()) => SyncError::RolledBack { reason },
            Err(e) => SyncError::RollbackFailed {
                reason: format!("{}; {}", reason, e),
                tag: BACKUP_TAG.to_string(),
            },
        }
    }

    /// The tag is only deleted once the reset succeeded.
    fn restore_backup(&self) -> Result<()> {
        self.git.reset_hard(BACKUP_TAG)?;
        self.git.delete_tag(BACKUP_TAG)
    }

    /// Merges `pb-core` into the current branch without committing.
    /// Returns `false` when the user declines.
    pub fn merge(&mut self) -> Result<bool> {
        self.load_and_check_config()?;

        let branch = self.git.get_current_branch()?;
        let message = format!("Merge {} into {}?", PB_CORE, branch);
        if !self.prompter.confirm(&message, true)? {
            output::print_info("Merge cancelled", &self.config);
            return Ok(false);
        }

        self.git.merge_branch(PB_CORE, true)?;
        output::print_success(
            &format!("{} merged into {}, review and commit", PB_CORE, branch),
            &self.config,
        );
        Ok(true)
    }

    /// Pushes `pb-core` upstream, then to origin once the first push succeeded.
    pub fn push(&mut self) -> Result<()> {
        let config = self.load_and_check_config()?;

        output::print_step(
            &format!("Pushing pb-core to pb-core/{}", config.branch),
            &self.config,
        );
        self.git.push_branch(PB_CORE, PB_CORE, &config.branch)?;

        output::print_step("Pushing pb-core to origin", &self.config);
        self.git.push_branch(ORIGIN, PB_CORE, PB_CORE)?;

        output::print_success("pb-core pushed", &self.config);
        Ok(())
    }

    /// Prompts for the upstream settings again, even if a valid file exists.
    pub fn reconfigure(&mut self) -> Result<Configuration> {
        self.detect_project()?;
        let config = self.store.reconfigure(&self.prompter)?;
        output::print_info(
            &format!("Config file written in: {}", self.store.path().display()),
            &self.config,
        );
        Ok(config)
    }

    /// Marker report for every project type.
    pub fn check(&self) -> Vec<(ProjectType, CheckResult)> {
        ProjectType::ALL
            .iter()
            .map(|&project_type| (project_type, detect::report(&self.git, project_type)))
            .collect()
    }

    /// Asks for the new project's settings, then creates it.
    pub fn create(&mut self) -> Result<PathBuf> {
        let options = self.prompt_create_options()?;
        self.create_with(&options)
    }

    fn prompt_create_options(&self) -> Result<CreateOptions> {
        let labels: Vec<String> = ProjectType::ALL.iter().map(|t| t.to_string()).collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        let index = self.prompter.select("Project type:", &labels, 0)?;
        let project_type = ProjectType::ALL
            .get(index)
            .copied()
            .ok_or_else(|| SyncError::PromptFailed(format!("no project type at {}", index)))?;

        let directory = self.prompter.input(&Field::new(
            "directory",
            "Project directory name:",
            None,
        ))?;

        let defaults = PartialConfiguration::new(
            Some(project_type.default_repository()),
            Some(DEFAULT_BRANCH),
        );
        let upstream = defaults
            .merged(&store::prompt_configuration(&self.prompter, &defaults)?)
            .resolve(&self.working_dir().join(&directory))?;

        let source = if self
            .prompter
            .confirm("Clone an existing empty repository?", false)?
        {
            ProjectSource::Clone(self.prompter.input(&Field::new(
                "origin",
                "Repository to clone:",
                None,
            ))?)
        } else {
            ProjectSource::Init
        };

        Ok(CreateOptions {
            project_type,
            directory,
            upstream,
            source,
        })
    }

    /// Creates the project directory and wires it to the upstream boilerplate.
    ///
    /// Stops at the first failing step without undoing earlier ones.
    /// On success the workflow is rooted in the new directory.
    pub fn create_with(&mut self, options: &CreateOptions) -> Result<PathBuf> {
        let progress = output::create_step_progress(&self.config);
        let result = self.run_create(options, &progress);
        match &result {
            Ok(target) => progress.finish_success(&format!("Project created in {}", target.display())),
            Err(e) => progress.finish_failed(&e.to_string()),
        }
        result
    }

    fn run_create(&mut self, options: &CreateOptions, progress: &StepProgress) -> Result<PathBuf> {
        let config = self.config;
        let step = |message: &str| {
            progress.update(message);
            output::print_step(message, &config);
        };

        let target = self.working_dir().join(&options.directory);
        let upstream = &options.upstream;

        match &options.source {
            ProjectSource::Clone(url) => {
                step("Cloning the project repository");
                self.git.clone_into(url, &options.directory)?;
                self.reroot(&target);
            }
            ProjectSource::Init => {
                step("Initializing the project repository");
                std::fs::create_dir(&target).map_err(|e| SyncError::fs(&target, e))?;
                self.reroot(&target);
                self.git.init()?;
                self.git.commit_allow_empty(INITIAL_COMMIT_MESSAGE)?;
            }
        }
        self.project_type = Some(options.project_type);

        step("Adding the pb-core remote");
        self.git.remote_add(PB_CORE, &upstream.repository)?;
        let default_branch = self.git.symbolic_head()?;

        step("Pulling the boilerplate");
        self.git.checkout_new_branch(PB_CORE)?;
        self.git.pull_rebase(PB_CORE, &upstream.branch)?;

        step("Merging pb-core");
        // An empty clone has no commit on its default branch yet.
        if self.git.local_branch_exists(&default_branch) {
            self.git.checkout(&default_branch)?;
        } else {
            self.git.checkout_new_branch(&default_branch)?;
        }
        self.git.merge_with_message(
            PB_CORE,
            &format!(
                "Merge {} ({}) into {}",
                PB_CORE, upstream.branch, default_branch
            ),
        )?;

        step("Updating submodules");
        self.git.submodule_init()?;
        self.git.submodule_update()?;

        step("Installing");
        self.install()?;

        step("Saving the configuration");
        self.store.merge(&upstream.clone().into());
        self.store.save()?;
        self.copy_config_template(options.project_type)?;

        Ok(target)
    }

    fn install(&self) -> Result<()> {
        let args = ["install"];
        let output = self
            .git
            .runner()
            .run(self.working_dir(), "make", &args)?;
        if output.success {
            Ok(())
        } else {
            Err(SyncError::CommandFailed {
                command: format!("make {}", args.join(" ")),
                stderr: output.stderr,
            })
        }
    }

    fn copy_config_template(&self, project_type: ProjectType) -> Result<()> {
        let (template, destination) = project_type.config_template();
        let template = self.working_dir().join(template);
        let destination = self.working_dir().join(destination);

        if !template.is_file() {
            output::print_warning(&format!(
                "No config template at {}, skipping",
                template.display()
            ));
            return Ok(());
        }
        std::fs::copy(&template, &destination).map_err(|e| SyncError::fs(&destination, e))?;
        output::print_info(
            &format!("Edit {} to configure the project", destination.display()),
            &self.config,
        );
        Ok(())
    }
}
