//! Static registry of required `.gitignore` blocks.
//!
//! Blocks are literal text: comments are part of the requirement and are
//! matched line for line like any pattern.

use super::FeatureId;

/// A file that must exist and, for feature entries, contain `block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredFile {
    /// Project-relative path, `/`-separated.
    pub path: &'static str,
    pub block: &'static str,
}

impl RequiredFile {
    /// Non-blank lines of the block, in order.
    pub fn lines(&self) -> Vec<&'static str> {
        self.block.lines().filter(|line| !line.trim().is_empty()).collect()
    }
}

pub const ROOT_GITIGNORE: &str = ".gitignore";
pub const KNOWLEDGE_GITIGNORE: &str = ".context/knowledge/.gitignore";

const BASELINE_BLOCK: &str = "\
# project-context-server: machine-local files
.context/local/
";

const KNOWLEDGE_BLOCK: &str = "\
# project-context-server: knowledge caches are rebuilt locally
*/.cache/
*/scratch/
";

const TASKS_BLOCK: &str = "\
# project-context-server: task runtime state
.context/tasks/*/state.json
.context/tasks/*/logs/
";

const MEMORY_BLOCK: &str = "\
# project-context-server: session memory stays on this machine
.context/memory/
";

/// Files every project must have, whatever features are active.
pub const BASELINE_FILES: &[RequiredFile] = &[RequiredFile {
    path: ROOT_GITIGNORE,
    block: BASELINE_BLOCK,
}];

/// Required block and target file for `feature`.
pub fn required_for(feature: FeatureId) -> RequiredFile {
    match feature {
        FeatureId::Knowledge => RequiredFile {
            path: KNOWLEDGE_GITIGNORE,
            block: KNOWLEDGE_BLOCK,
        },
        FeatureId::Tasks => RequiredFile {
            path: ROOT_GITIGNORE,
            block: TASKS_BLOCK,
        },
        FeatureId::Memory => RequiredFile {
            path: ROOT_GITIGNORE,
            block: MEMORY_BLOCK,
        },
    }
}

/// Every distinct file the registry knows about, baseline first.
pub fn known_files() -> Vec<&'static str> {
    let mut paths: Vec<&'static str> = BASELINE_FILES.iter().map(|f| f.path).collect();
    for feature in [FeatureId::Knowledge, FeatureId::Tasks, FeatureId::Memory] {
        let path = required_for(feature).path;
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}
