//! Path existence and kind checks.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKind::File => write!(f, "file"),
            PathKind::Directory => write!(f, "directory"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PathError {
    #[error("{} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("{} is not a {expected}", path.display())]
    WrongKind { path: PathBuf, expected: PathKind },
}

/// Succeeds iff `path` exists and is of the `expected` kind.
pub fn check_path(path: &Path, expected: PathKind) -> Result<(), PathError> {
    let metadata = std::fs::metadata(path).map_err(|_| PathError::NotFound {
        path: path.to_path_buf(),
    })?;

    let matches = match expected {
        PathKind::File => metadata.is_file(),
        PathKind::Directory => metadata.is_dir(),
    };

    if matches {
        Ok(())
    } else {
        Err(PathError::WrongKind {
            path: path.to_path_buf(),
            expected,
        })
    }
}
