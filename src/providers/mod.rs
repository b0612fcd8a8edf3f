//! Resource providers.
//!
//! Every content source implements [`Provider`]: given a resource key and an
//! explicit [`ProviderContext`] it returns zero or more sections, or a typed
//! [`ProviderError`]. Providers hold no mutable state between calls.

pub mod compliance;
pub mod content;
pub mod knowledge;
pub mod project;
pub mod registry;
pub mod tasks;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::project_root::{PathResolutionError, CONTEXT_DIR};
use crate::section::{Section, SectionError};

pub use registry::{ProviderRegistry, RegistryEntry};

/// URI scheme accepted in front of resource keys.
pub const URI_SCHEME: &str = "context://";

/// A `category/name` resource address such as `rule/core`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    category: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid resource key '{key}': {reason}")]
pub struct KeyError {
    pub key: String,
    pub reason: &'static str,
}

impl ResourceKey {
    /// Parse `category/name`, optionally prefixed with `context://`.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let err = |reason| KeyError {
            key: raw.to_string(),
            reason,
        };

        let trimmed = raw.strip_prefix(URI_SCHEME).unwrap_or(raw);
        let (category, name) = trimmed
            .split_once('/')
            .ok_or_else(|| err("expected category/name"))?;

        if !is_segment(category) || !is_segment(name) {
            return Err(err("segments must be non-empty and use only [A-Za-z0-9_.-]"));
        }

        Ok(Self {
            category: category.to_string(),
            name: name.to_string(),
        })
    }

    pub(crate) fn from_static(category: &'static str, name: &'static str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uri(&self) -> String {
        format!("{URI_SCHEME}{self}")
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

fn is_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Explicit inputs for one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderContext {
    pub project_root: PathBuf,
    /// Directory holding `rules/` and `workflows/`.
    pub content_root: PathBuf,
}

impl ProviderContext {
    /// `content_root` defaults to `<project_root>/.context`.
    pub fn new(project_root: impl Into<PathBuf>, content_root: Option<PathBuf>) -> Self {
        let project_root = project_root.into();
        let content_root = content_root.unwrap_or_else(|| project_root.join(CONTEXT_DIR));
        Self {
            project_root,
            content_root,
        }
    }

    pub fn context_dir(&self) -> PathBuf {
        self.project_root.join(CONTEXT_DIR)
    }

    /// Symbolic location for `path`: project-relative when it lives in the
    /// project, content-root-relative otherwise.
    pub fn symbolic(&self, path: &Path) -> String {
        let relative = path
            .strip_prefix(&self.project_root)
            .or_else(|_| path.strip_prefix(&self.content_root))
            .unwrap_or(path);

        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        if joined.is_empty() || relative.is_absolute() {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| ".".to_string())
        } else {
            joined
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderErrorKind {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unsupported key: {0}")]
    InvalidKey(String),
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error(transparent)]
    Setup(#[from] PathResolutionError),
    #[error(transparent)]
    Section(#[from] SectionError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProviderErrorKind {
    /// Short machine-readable name of the error type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Io { .. } => "io",
            Self::Parse(_) => "parse",
            Self::InvalidKey(_) => "invalid_key",
            Self::Timeout(_) => "timeout",
            Self::Setup(_) => "setup_required",
            Self::Section(_) => "invalid_section",
            Self::Internal(_) => "internal",
        }
    }
}

/// A single content source failed.
#[derive(Debug, thiserror::Error)]
#[error("{provider} provider: {kind}")]
pub struct ProviderError {
    pub provider: &'static str,
    #[source]
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: &'static str, kind: impl Into<ProviderErrorKind>) -> Self {
        Self {
            provider,
            kind: kind.into(),
        }
    }

    pub fn not_found(provider: &'static str, what: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::NotFound(what.into()))
    }

    pub fn io(provider: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::new(
            provider,
            ProviderErrorKind::Io {
                path: path.to_path_buf(),
                source,
            },
        )
    }

    pub fn invalid_key(provider: &'static str, key: &ResourceKey) -> Self {
        Self::new(provider, ProviderErrorKind::InvalidKey(key.to_string()))
    }
}

/// Uniform async retrieval contract.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable provider name, used in errors and logs.
    fn id(&self) -> &'static str;

    /// Produce the sections for `key`. An empty vector means there is
    /// nothing to report.
    async fn provide(&self, key: &ResourceKey, ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError>;
}

/// Read a UTF-8 file, mapping failures onto provider error kinds.
pub(crate) async fn read_text(provider: &'static str, path: &Path) -> Result<String, ProviderError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ProviderError::not_found(provider, path.display().to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Err(ProviderError::new(
            provider,
            ProviderErrorKind::Parse(format!("{} is not valid UTF-8", path.display())),
        )),
        Err(e) => Err(ProviderError::io(provider, path, e)),
    }
}

/// Sorted entries of `dir` accepted by `keep`. A missing directory yields
/// an empty list.
pub(crate) async fn list_dir(
    provider: &'static str,
    dir: &Path,
    keep: impl Fn(&Path, &std::fs::FileType) -> bool,
) -> Result<Vec<PathBuf>, ProviderError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ProviderError::io(provider, dir, e)),
    };

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ProviderError::io(provider, dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| ProviderError::io(provider, &entry.path(), e))?;
        let path = entry.path();
        if keep(&path, &file_type) {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

pub(crate) fn is_markdown(path: &Path, file_type: &std::fs::FileType) -> bool {
    file_type.is_file() && path.extension().map_or(false, |ext| ext == "md")
}

pub(crate) fn is_directory(_path: &Path, file_type: &std::fs::FileType) -> bool {
    file_type.is_dir()
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_uri_keys() {
        let bare = ResourceKey::parse("rule/core").unwrap();
        let uri = ResourceKey::parse("context://rule/core").unwrap();
        assert_eq!(bare, uri);
        assert_eq!(bare.category(), "rule");
        assert_eq!(bare.name(), "core");
        assert_eq!(bare.uri(), "context://rule/core");
    }

    #[test]
    fn rejects_traversal_and_nesting() {
        for bad in ["rule", "rule/", "/core", "rule/../x", "rule/..", "knowledge/a/b", "rule/a b"] {
            assert!(ResourceKey::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn symbolic_locations_are_relative() {
        let ctx = ProviderContext::new("/work/app", Some(PathBuf::from("/opt/content")));
        assert_eq!(ctx.symbolic(Path::new("/work/app/.context/tasks/t1/task.md")), ".context/tasks/t1/task.md");
        assert_eq!(ctx.symbolic(Path::new("/opt/content/rules/core.md")), "rules/core.md");
        assert_eq!(ctx.symbolic(Path::new("/elsewhere/x.md")), "x.md");
    }
}
