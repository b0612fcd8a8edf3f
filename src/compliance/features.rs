//! Feature detection.
//!
//! Each feature has its own declarative rule. Rules are evaluated
//! independently; a rule that hits a file-system error reports the feature
//! as inactive.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use super::FeatureId;
use crate::project_root::join_relative;

#[derive(Debug, thiserror::Error)]
#[error("cannot scan {}: {source}", path.display())]
pub struct ComplianceDetectionError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// How a feature's presence is decided.
#[derive(Clone, Copy)]
pub enum DetectionRule {
    /// Active iff `dir` has at least one subdirectory that is not empty.
    NonEmptySubdirectory { dir: &'static str },
    /// Arbitrary predicate over the project root.
    Custom(fn(&Path) -> Result<bool, ComplianceDetectionError>),
}

impl fmt::Debug for DetectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonEmptySubdirectory { dir } => f
                .debug_struct("NonEmptySubdirectory")
                .field("dir", dir)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl DetectionRule {
    pub fn evaluate(&self, project_root: &Path) -> Result<bool, ComplianceDetectionError> {
        match self {
            Self::NonEmptySubdirectory { dir } => {
                has_non_empty_subdirectory(&join_relative(project_root, dir))
            }
            Self::Custom(predicate) => predicate(project_root),
        }
    }
}

fn has_non_empty_subdirectory(dir: &Path) -> Result<bool, ComplianceDetectionError> {
    let wrap = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ComplianceDetectionError { path, source }
    };

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(wrap(dir)(e)),
    };

    for entry in entries {
        let entry = entry.map_err(wrap(dir))?;
        let file_type = entry.file_type().map_err(wrap(dir))?;
        if !file_type.is_dir() {
            continue;
        }

        let sub = entry.path();
        let mut children = std::fs::read_dir(&sub).map_err(wrap(sub.as_path()))?;
        if children.next().is_some() {
            return Ok(true);
        }
    }

    Ok(false)
}

#[derive(Debug, Clone)]
pub struct FeatureDetector {
    pub id: FeatureId,
    pub rule: DetectionRule,
}

/// Ordered set of detectors. New features are added with
/// [`FeatureRegistry::register`]; existing entries are never touched.
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    detectors: Vec<FeatureDetector>,
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::empty()
            .register(
                FeatureId::Knowledge,
                DetectionRule::NonEmptySubdirectory {
                    dir: ".context/knowledge",
                },
            )
            .register(
                FeatureId::Tasks,
                DetectionRule::NonEmptySubdirectory {
                    dir: ".context/tasks",
                },
            )
            .register(
                FeatureId::Memory,
                DetectionRule::NonEmptySubdirectory {
                    dir: ".context/memory",
                },
            )
    }
}

impl FeatureRegistry {
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    pub fn register(mut self, id: FeatureId, rule: DetectionRule) -> Self {
        self.detectors.push(FeatureDetector { id, rule });
        self
    }

    pub fn detectors(&self) -> &[FeatureDetector] {
        &self.detectors
    }

    pub fn detect(&self, project_root: &Path) -> BTreeSet<FeatureId> {
        let mut active = BTreeSet::new();
        for detector in &self.detectors {
            match detector.rule.evaluate(project_root) {
                Ok(true) => {
                    active.insert(detector.id);
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(feature = %detector.id, error = %e, "feature detection failed; treating as inactive");
                }
            }
        }
        active
    }
}

/// Features active under `project_root`, using the default registry.
pub fn detect_active_features(project_root: &Path) -> BTreeSet<FeatureId> {
    FeatureRegistry::default().detect(project_root)
}
