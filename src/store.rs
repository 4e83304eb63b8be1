//! Per-project configuration file.
//!
//! Values are resolved as defaults ← file ← prompt. Each merge step builds a
//! new [`PartialConfiguration`]; a [`Configuration`] only exists once both
//! fields are known and non-empty.

use crate::constants::CONFIG_FILE;
use crate::error::{Result, SyncError};
use crate::prompt::{Field, Prompter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fully resolved upstream settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub repository: String,
    pub branch: String,
}

/// Upstream settings as known at some resolution step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PartialConfiguration {
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

impl PartialConfiguration {
    pub fn new(repository: Option<&str>, branch: Option<&str>) -> Self {
        Self {
            repository: repository.map(str::to_string),
            branch: branch.map(str::to_string),
        }
    }

    /// Shallow merge: every field set in `overlay` wins.
    #[must_use]
    pub fn merged(&self, overlay: &PartialConfiguration) -> PartialConfiguration {
        PartialConfiguration {
            repository: overlay
                .repository
                .clone()
                .or_else(|| self.repository.clone()),
            branch: overlay.branch.clone().or_else(|| self.branch.clone()),
        }
    }

    fn has_empty_field(&self) -> bool {
        [&self.repository, &self.branch]
            .into_iter()
            .flatten()
            .any(|value| value.trim().is_empty())
    }

    /// Fails with `ConfigMissing` (naming `path`) while a field is absent or empty.
    pub fn resolve(&self, path: &Path) -> Result<Configuration> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        match (non_empty(&self.repository), non_empty(&self.branch)) {
            (Some(repository), Some(branch)) => Ok(Configuration { repository, branch }),
            _ => Err(SyncError::ConfigMissing {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl From<Configuration> for PartialConfiguration {
    fn from(config: Configuration) -> Self {
        Self {
            repository: Some(config.repository),
            branch: Some(config.branch),
        }
    }
}

/// How the configuration was resolved.
#[derive(Debug)]
pub enum LoadSource {
    File,
    /// The file could not be used; `fallback` says why.
    Prompt { fallback: SyncError },
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    working_dir: PathBuf,
    file_name: String,
    values: PartialConfiguration,
}

impl ConfigStore {
    pub fn new(working_dir: impl Into<PathBuf>, defaults: PartialConfiguration) -> Self {
        Self {
            working_dir: working_dir.into(),
            file_name: CONFIG_FILE.to_string(),
            values: defaults,
        }
    }

    /// Uses a config file name other than `pb-config.json`, relative to the working directory.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn path(&self) -> PathBuf {
        self.working_dir.join(&self.file_name)
    }

    pub fn set_working_dir(&mut self, dir: impl Into<PathBuf>) {
        self.working_dir = dir.into();
    }

    pub fn merge(&mut self, overlay: &PartialConfiguration) {
        self.values = self.values.merged(overlay);
    }

    /// The resolved configuration, or `ConfigMissing` while a field is unknown.
    pub fn configuration(&self) -> Result<Configuration> {
        self.values.resolve(&self.path())
    }

    /// Reads the config file without merging it.
    pub fn read_file(&self) -> Result<PartialConfiguration> {
        let path = self.path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SyncError::ConfigMissing { path });
            }
            Err(e) => return Err(SyncError::fs(path, e)),
        };

        let file: PartialConfiguration =
            serde_json::from_str(&content).map_err(|e| SyncError::ConfigMalformed {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if file.has_empty_field() {
            return Err(SyncError::ConfigMalformed {
                path,
                reason: "empty value".to_string(),
            });
        }
        Ok(file)
    }

    /// Loads the config file over the defaults, prompting when it is absent or unusable.
    pub fn load(&mut self, prompter: &dyn Prompter) -> Result<LoadSource> {
        match self.read_file() {
            Ok(file) => {
                let merged = self.values.merged(&file);
                match merged.resolve(&self.path()) {
                    Ok(_) => {
                        self.values = merged;
                        Ok(LoadSource::File)
                    }
                    Err(fallback) => {
                        self.values = merged;
                        self.prompt_and_save(prompter)?;
                        Ok(LoadSource::Prompt { fallback })
                    }
                }
            }
            Err(fallback @ (SyncError::ConfigMissing { .. } | SyncError::ConfigMalformed { .. })) => {
                self.prompt_and_save(prompter)?;
                Ok(LoadSource::Prompt { fallback })
            }
            Err(e) => Err(e),
        }
    }

    /// Prompts unconditionally, using any readable file values as defaults.
    pub fn reconfigure(&mut self, prompter: &dyn Prompter) -> Result<Configuration> {
        if let Ok(file) = self.read_file() {
            self.merge(&file);
        }
        self.prompt_and_save(prompter)?;
        self.configuration()
    }

    /// Writes the resolved configuration, replacing the file contents.
    pub fn save(&self) -> Result<PathBuf> {
        let config = self.configuration()?;
        let path = self.path();
        let mut json = serde_json::to_string_pretty(&config).map_err(|e| {
            SyncError::ConfigMalformed {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        json.push('\n');
        std::fs::write(&path, json).map_err(|e| SyncError::fs(&path, e))?;
        Ok(path)
    }

    fn prompt_and_save(&mut self, prompter: &dyn Prompter) -> Result<PathBuf> {
        let answers = prompt_configuration(prompter, &self.values)?;
        self.merge(&answers);
        self.configuration()?;
        self.save()
    }
}

/// Asks for the repository and branch, pre-filled with `defaults`.
pub fn prompt_configuration(
    prompter: &dyn Prompter,
    defaults: &PartialConfiguration,
) -> Result<PartialConfiguration> {
    let repository = prompter.input(&Field::new(
        "repository",
        "Boilerplate remote repository:",
        defaults.repository.clone(),
    ))?;
    let branch = prompter.input(&Field::new(
        "branch",
        "Remote boilerplate branch:",
        defaults.branch.clone(),
    ))?;
    Ok(PartialConfiguration {
        repository: Some(repository),
        branch: Some(branch),
    })
}
