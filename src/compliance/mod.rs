//! `.gitignore` compliance: which optional features a project uses, and
//! whether its ignore files carry the patterns those features require.

pub mod features;
pub mod patterns;
pub mod validator;

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

pub use features::{detect_active_features, ComplianceDetectionError, DetectionRule, FeatureDetector, FeatureRegistry};
pub use patterns::{RequiredFile, BASELINE_FILES};
pub use validator::validate;

/// Optional project capability whose presence changes the required patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureId {
    Knowledge,
    Tasks,
    Memory,
}

impl FeatureId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Knowledge => "knowledge",
            Self::Tasks => "tasks",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    MissingFile,
    MissingPatterns,
    ConflictingPatterns,
    InvalidContent,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingFile => "MISSING_FILE",
            Self::MissingPatterns => "MISSING_PATTERNS",
            Self::ConflictingPatterns => "CONFLICTING_PATTERNS",
            Self::InvalidContent => "INVALID_CONTENT",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem found during a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceIssue {
    pub issue_type: IssueType,
    /// Project-relative path of the offending file.
    pub file_path: String,
    pub description: String,
    pub required_patterns: Vec<String>,
    pub current_patterns: Vec<String>,
    /// Copy-paste text that resolves the issue.
    pub remediation_action: String,
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceResult {
    is_compliant: bool,
    active_features: BTreeSet<FeatureId>,
    issues: Vec<ComplianceIssue>,
    remediation_guidance: String,
}

impl ComplianceResult {
    /// Build a result; compliance and guidance are derived from `issues`.
    pub fn from_issues(active_features: BTreeSet<FeatureId>, issues: Vec<ComplianceIssue>) -> Self {
        let remediation_guidance = build_guidance(&issues);
        Self {
            is_compliant: issues.is_empty(),
            active_features,
            issues,
            remediation_guidance,
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.is_compliant
    }

    pub fn active_features(&self) -> &BTreeSet<FeatureId> {
        &self.active_features
    }

    pub fn issues(&self) -> &[ComplianceIssue] {
        &self.issues
    }

    pub fn remediation_guidance(&self) -> &str {
        &self.remediation_guidance
    }
}

/// A lone issue's guidance is its remediation text verbatim, so it can be
/// pasted as-is. Several issues each get a header naming the file.
fn build_guidance(issues: &[ComplianceIssue]) -> String {
    match issues {
        [] => String::new(),
        [only] => only.remediation_action.clone(),
        many => many
            .iter()
            .map(|issue| {
                format!(
                    "## {} ({})\n{}\n\n{}",
                    issue.file_path, issue.issue_type, issue.description, issue.remediation_action
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
