//! Compare required pattern blocks against the project's ignore files.

use std::collections::BTreeSet;
use std::path::Path;

use rapidfuzz::distance::levenshtein;

use super::patterns::{required_for, RequiredFile, BASELINE_FILES};
use super::{ComplianceIssue, ComplianceResult, FeatureId, IssueType};
use crate::project_root::join_relative;

/// Validate `project_root` for the given active features.
///
/// Each feature's target file must contain every line of its block
/// (position does not matter). Baseline files must exist regardless of
/// features. A missing file is reported once, whatever requires it.
pub fn validate(project_root: &Path, active_features: &BTreeSet<FeatureId>) -> ComplianceResult {
    let mut issues = Vec::new();
    let mut missing: Vec<MissingTarget> = Vec::new();

    for feature in active_features {
        let required = required_for(*feature);
        match read_target(project_root, required.path) {
            Target::Missing => note_missing(&mut missing, format!("feature `{feature}`"), required, false),
            Target::Unreadable(reason) => issues.push(invalid_content(&required, &reason)),
            Target::Content(content) => issues.extend(compare_lines(*feature, &required, &content)),
        }
    }

    for required in BASELINE_FILES {
        let path = join_relative(project_root, required.path);
        match std::fs::metadata(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                note_missing(&mut missing, "every project".to_string(), *required, true);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot stat baseline file");
                issues.push(invalid_content(required, &e.to_string()));
            }
        }
    }

    issues.extend(missing.iter().map(missing_file));

    tracing::debug!(
        features = active_features.len(),
        issues = issues.len(),
        "compliance validation finished"
    );

    ComplianceResult::from_issues(active_features.clone(), issues)
}

enum Target {
    Missing,
    Unreadable(String),
    Content(String),
}

fn read_target(project_root: &Path, relative: &str) -> Target {
    let path = join_relative(project_root, relative);

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Target::Missing,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read ignore file");
            return Target::Unreadable(e.to_string());
        }
    };

    match String::from_utf8(bytes) {
        Ok(content) => Target::Content(content),
        Err(_) => Target::Unreadable("file is not valid UTF-8".to_string()),
    }
}

/// An absent file and every block that needs it, baseline first.
struct MissingTarget {
    path: &'static str,
    requirements: Vec<(String, RequiredFile)>,
}

fn note_missing(missing: &mut Vec<MissingTarget>, required_by: String, required: RequiredFile, baseline: bool) {
    let index = match missing.iter().position(|target| target.path == required.path) {
        Some(index) => index,
        None => {
            missing.push(MissingTarget {
                path: required.path,
                requirements: Vec::new(),
            });
            missing.len() - 1
        }
    };

    let requirements = &mut missing[index].requirements;
    if baseline {
        requirements.insert(0, (required_by, required));
    } else {
        requirements.push((required_by, required));
    }
}

/// Line-for-line comparison against raw file content.
fn compare_lines(feature: FeatureId, required: &RequiredFile, content: &str) -> Vec<ComplianceIssue> {
    let required_lines = required.lines();
    let current_lines: Vec<&str> = content.split('\n').collect();

    let mut missing = Vec::new();
    let mut conflicts: Vec<(&str, &str)> = Vec::new();

    for &wanted in &required_lines {
        if current_lines.iter().any(|line| *line == wanted) {
            continue;
        }

        let near_miss = current_lines.iter().copied().find(|&line| {
            !line.trim().is_empty()
                && !required_lines.iter().any(|r| *r == line)
                && !conflicts.iter().any(|&(_, used)| used == line)
                && is_near_miss(line, wanted)
        });

        match near_miss {
            Some(line) => conflicts.push((wanted, line)),
            None => missing.push(wanted),
        }
    }

    let mut issues = Vec::new();

    if !conflicts.is_empty() {
        let pairs = conflicts
            .iter()
            .map(|(wanted, found)| format!("{found:?} should be {wanted:?}"))
            .collect::<Vec<_>>()
            .join("; ");
        issues.push(ComplianceIssue {
            issue_type: IssueType::ConflictingPatterns,
            file_path: required.path.to_string(),
            description: format!(
                "{} differs from the patterns feature `{feature}` requires: {pairs}",
                required.path
            ),
            required_patterns: conflicts.iter().map(|(wanted, _)| wanted.to_string()).collect(),
            current_patterns: conflicts.iter().map(|(_, found)| found.to_string()).collect(),
            remediation_action: block_of(conflicts.iter().map(|(wanted, _)| *wanted)),
        });
    }

    if !missing.is_empty() {
        issues.push(ComplianceIssue {
            issue_type: IssueType::MissingPatterns,
            file_path: required.path.to_string(),
            description: format!(
                "{} is missing {} pattern line(s) required by feature `{feature}`",
                required.path,
                missing.len()
            ),
            required_patterns: missing.iter().map(|line| line.to_string()).collect(),
            current_patterns: Vec::new(),
            remediation_action: block_of(missing.iter().copied()),
        });
    }

    issues
}

/// Same line apart from whitespace, or one edit away.
fn is_near_miss(found: &str, wanted: &str) -> bool {
    if strip_whitespace(found) == strip_whitespace(wanted) {
        return true;
    }
    wanted.chars().count() >= 3 && levenshtein::distance(found.chars(), wanted.chars()) == 1
}

fn strip_whitespace(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

fn block_of<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    lines.map(|line| format!("{line}\n")).collect()
}

fn missing_file(target: &MissingTarget) -> ComplianceIssue {
    let required_by = target
        .requirements
        .iter()
        .map(|(by, _)| by.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    ComplianceIssue {
        issue_type: IssueType::MissingFile,
        file_path: target.path.to_string(),
        description: format!("{} does not exist but is required by {required_by}", target.path),
        required_patterns: target
            .requirements
            .iter()
            .flat_map(|(_, required)| required.lines())
            .map(str::to_string)
            .collect(),
        current_patterns: Vec::new(),
        remediation_action: target
            .requirements
            .iter()
            .map(|(_, required)| required.block)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn invalid_content(required: &RequiredFile, reason: &str) -> ComplianceIssue {
    ComplianceIssue {
        issue_type: IssueType::InvalidContent,
        file_path: required.path.to_string(),
        description: format!("{} could not be read: {reason}", required.path),
        required_patterns: required.lines().into_iter().map(str::to_string).collect(),
        current_patterns: Vec::new(),
        remediation_action: required.block.to_string(),
    }
}
