use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{file_name, is_directory, list_dir, read_text, Provider, ProviderContext, ProviderError, ResourceKey};
use crate::section::{Criticality, Section, SectionBuilder};

pub const INDEX: &str = "index";
pub const ACTIVE: &str = "active";

/// Status value marking a task as currently worked on.
pub const IN_PROGRESS: &str = "in-progress";

const PROVIDER: &str = "tasks";
const TASK_FILE: &str = "task.md";

/// Tasks: `.context/tasks/<name>/task.md`, with an optional `Status:` line.
#[derive(Debug, Clone, Default)]
pub struct TaskProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Task {
    name: String,
    path: PathBuf,
    title: Option<String>,
    status: String,
    text: String,
}

#[async_trait]
impl Provider for TaskProvider {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    async fn provide(&self, key: &ResourceKey, ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        let root = ctx.context_dir().join("tasks");
        match key.name() {
            INDEX => inventory(ctx, &root).await.map(|section| vec![section]),
            ACTIVE => {
                let tasks = load_all(&root).await?;
                tasks
                    .into_iter()
                    .filter(|task| task.status == IN_PROGRESS)
                    .map(|task| task_section(ctx, task))
                    .collect()
            }
            name => {
                let task = load(&root.join(name)).await?;
                Ok(vec![task_section(ctx, task)?])
            }
        }
    }
}

async fn load_all(root: &Path) -> Result<Vec<Task>, ProviderError> {
    let mut tasks = Vec::new();
    for dir in list_dir(PROVIDER, root, is_directory).await? {
        match load(&dir).await {
            Ok(task) => tasks.push(task),
            // A task directory without task.md is still being set up.
            Err(ProviderError {
                kind: super::ProviderErrorKind::NotFound(_),
                ..
            }) => {
                tracing::debug!(dir = %dir.display(), "skipping task directory without {TASK_FILE}");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(tasks)
}

async fn load(dir: &Path) -> Result<Task, ProviderError> {
    let path = dir.join(TASK_FILE);
    let text = read_text(PROVIDER, &path).await?;
    Ok(Task {
        name: file_name(dir),
        title: title(&text),
        status: status(&text).unwrap_or_else(|| "unknown".to_string()),
        path,
        text,
    })
}

async fn inventory(ctx: &ProviderContext, root: &Path) -> Result<Section, ProviderError> {
    let tasks = load_all(root).await?;

    let mut out = String::from("# Tasks\n\n");
    if tasks.is_empty() {
        out.push_str("No tasks found.\n");
    }
    for task in &tasks {
        let _ = write!(out, "- `{}` [{}]", task.name, task.status);
        if let Some(title) = &task.title {
            let _ = write!(out, " {title}");
        }
        out.push('\n');
    }

    SectionBuilder::new(ctx.symbolic(root))
        .criticality(Criticality::Informational)
        .header("X-Count", tasks.len().to_string())
        .content(out)
        .build()
        .map_err(|e| ProviderError::new(PROVIDER, e))
}

fn task_section(ctx: &ProviderContext, task: Task) -> Result<Section, ProviderError> {
    SectionBuilder::new(ctx.symbolic(&task.path))
        .criticality(Criticality::Informational)
        .writable(true)
        .header("X-Task", task.name)
        .header("X-Task-Status", task.status)
        .content(task.text)
        .build()
        .map_err(|e| ProviderError::new(PROVIDER, e))
}

fn title(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|t| t.trim().to_string())
}

/// Value of the first `Status:` line, lowercased.
fn status(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        let value = value.trim();
        (name.trim().eq_ignore_ascii_case("status") && !value.is_empty()).then(|| value.to_ascii_lowercase())
    })
}
