//! Project-root discovery.
//!
//! A project root is the nearest ancestor directory holding a `.context`
//! directory, unless one is configured explicitly.

use std::path::{Path, PathBuf};

/// Directory that marks a project root.
pub const CONTEXT_DIR: &str = ".context";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathResolutionError {
    #[error("configured project root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("no .context directory found in {} or any parent directory", .0.display())]
    NotFound(PathBuf),
    #[error("cannot determine the working directory: {0}")]
    WorkingDirectory(String),
}

impl PathResolutionError {
    /// Setup instructions shown to the user instead of a raw error.
    pub fn guidance(&self) -> String {
        let cause = self.to_string();
        format!(
            "# Project setup required\n\n\
             The project context server could not locate a project root ({cause}).\n\n\
             To fix this, either:\n\n\
             1. Create a `{CONTEXT_DIR}` directory at the root of your project \
             (`mkdir {CONTEXT_DIR}`), or\n\
             2. Set `PROJECT_CONTEXT_ROOT` to the project directory before starting the server.\n"
        )
    }
}

/// Resolve the project root: `explicit` if given, otherwise discovered
/// from `start` upwards.
pub fn resolve(explicit: Option<&Path>, start: &Path) -> Result<PathBuf, PathResolutionError> {
    match explicit {
        Some(root) if root.is_dir() => Ok(root.to_path_buf()),
        Some(root) => Err(PathResolutionError::NotADirectory(root.to_path_buf())),
        None => discover(start),
    }
}

/// Walk up from `start` looking for a [`CONTEXT_DIR`] directory.
pub fn discover(start: &Path) -> Result<PathBuf, PathResolutionError> {
    start
        .ancestors()
        .find(|dir| dir.join(CONTEXT_DIR).is_dir())
        .map(Path::to_path_buf)
        .ok_or_else(|| PathResolutionError::NotFound(start.to_path_buf()))
}

/// Join a `/`-separated project-relative path onto `root`.
pub fn join_relative(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}
