use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};

use super::progress::ProgressReporter;
use super::workdir::WorkdirScope;
use crate::project_root::CONTEXT_DIR;
use crate::providers::compliance::ComplianceProvider;
use crate::providers::content::{ContentProvider, ALL};
use crate::providers::knowledge::{KnowledgeProvider, INDEX as KNOWLEDGE_INDEX};
use crate::providers::project::ProjectContextProvider;
use crate::providers::tasks::{TaskProvider, ACTIVE, INDEX as TASK_INDEX};
use crate::providers::{Provider, ProviderContext, ProviderError, ProviderErrorKind, ResourceKey};
use crate::section::{format_multi, Criticality, Section, SectionBuilder, Status};

/// One named step of the pipeline.
#[derive(Clone)]
pub struct Stage {
    name: String,
    criticality: Criticality,
    provider: Arc<dyn Provider>,
    key: ResourceKey,
}

impl Stage {
    /// `criticality` is what the stage produces on success; its error
    /// section keeps the same tag.
    pub fn new(
        name: impl Into<String>,
        criticality: Criticality,
        provider: Arc<dyn Provider>,
        key: ResourceKey,
    ) -> Self {
        Self {
            name: name.into(),
            criticality,
            provider,
            key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn criticality(&self) -> Criticality {
        self.criticality
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("criticality", &self.criticality)
            .field("provider", &self.provider.id())
            .field("key", &self.key.to_string())
            .finish()
    }
}

/// A stage that produced an error section instead of content.
#[derive(Debug)]
pub struct StageFailure {
    /// 1-based stage position.
    pub index: usize,
    pub stage: String,
    pub error: ProviderError,
}

/// No stage produced content: each one either failed or returned nothing.
#[derive(Debug, thiserror::Error)]
#[error(
    "no content source succeeded: {} of {stages} stage(s) failed, none produced content",
    .failures.len()
)]
pub struct AggregationFailure {
    pub stages: usize,
    pub failures: Vec<StageFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    /// 0-based index of the stage being run.
    Running(usize),
    Done,
    Failed,
}

/// Sections and failures gathered by one run. Lives only inside
/// [`Aggregator::run_sections`].
struct AggregationRun {
    state: RunState,
    sections: Vec<Section>,
    failures: Vec<StageFailure>,
}

impl AggregationRun {
    fn new() -> Self {
        Self {
            state: RunState::Pending,
            sections: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn transition(&mut self, next: RunState) {
        tracing::trace!(from = ?self.state, to = ?next, "aggregation state change");
        self.state = next;
    }
}

/// Sections from a finished run, plus the stages that failed along the way.
#[derive(Debug)]
pub struct AggregationOutcome {
    pub sections: Vec<Section>,
    pub failures: Vec<StageFailure>,
}

/// Runs stages strictly in order and combines their sections.
///
/// A failing or timed-out stage is replaced by an error section and the run
/// continues. Only a run in which every stage failed is an error.
#[derive(Debug, Clone)]
pub struct Aggregator {
    stages: Vec<Stage>,
    stage_timeout: Duration,
    scope_working_directory: bool,
}

impl Aggregator {
    pub fn new(stages: Vec<Stage>, stage_timeout: Duration) -> Self {
        Self {
            stages,
            stage_timeout,
            scope_working_directory: true,
        }
    }

    /// The `session/init-context` pipeline: rules first, then compliance and
    /// project state, then knowledge, then tasks.
    pub fn standard(stage_timeout: Duration) -> Self {
        let rules: Arc<dyn Provider> = Arc::new(ContentProvider::rules());
        let workflows: Arc<dyn Provider> = Arc::new(ContentProvider::workflows());
        let tasks: Arc<dyn Provider> = Arc::new(TaskProvider);

        let stages = vec![
            Stage::new("rules", Criticality::Critical, rules, ResourceKey::from_static("rule", ALL)),
            Stage::new(
                "compliance",
                Criticality::Critical,
                Arc::new(ComplianceProvider),
                ResourceKey::from_static("project", "gitignore-compliance"),
            ),
            Stage::new(
                "project-context",
                Criticality::Critical,
                Arc::new(ProjectContextProvider),
                ResourceKey::from_static("project", "context"),
            ),
            Stage::new(
                "workflows",
                Criticality::Informational,
                workflows,
                ResourceKey::from_static("workflow", ALL),
            ),
            Stage::new(
                "knowledge-index",
                Criticality::Informational,
                Arc::new(KnowledgeProvider),
                ResourceKey::from_static("knowledge", KNOWLEDGE_INDEX),
            ),
            Stage::new(
                "task-inventory",
                Criticality::Informational,
                tasks.clone(),
                ResourceKey::from_static("task", TASK_INDEX),
            ),
            Stage::new(
                "active-tasks",
                Criticality::Informational,
                tasks,
                ResourceKey::from_static("task", ACTIVE),
            ),
        ];

        Self::new(stages, stage_timeout)
    }

    /// Whether runs switch the process working directory to the project
    /// root (and hold the process-wide lock) while stages execute.
    pub fn with_workdir_scope(mut self, enabled: bool) -> Self {
        self.scope_working_directory = enabled;
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage and serialize the result with [`format_multi`].
    pub async fn run(
        &self,
        ctx: &ProviderContext,
        progress: &dyn ProgressReporter,
    ) -> Result<String, AggregationFailure> {
        let outcome = self.run_sections(ctx, progress).await?;
        Ok(format_multi(&outcome.sections))
    }

    pub async fn run_sections(
        &self,
        ctx: &ProviderContext,
        progress: &dyn ProgressReporter,
    ) -> Result<AggregationOutcome, AggregationFailure> {
        let _scope = if self.scope_working_directory {
            Some(WorkdirScope::enter(&ctx.project_root).await)
        } else {
            None
        };

        let total = self.stages.len();
        let mut run = AggregationRun::new();

        for (i, stage) in self.stages.iter().enumerate() {
            run.transition(RunState::Running(i));

            match self.run_stage(stage, ctx).await {
                Ok(sections) => {
                    tracing::debug!(stage = %stage.name, sections = sections.len(), "stage succeeded");
                    run.sections.extend(sections);
                }
                Err(error) => {
                    tracing::warn!(stage = %stage.name, error = %error, "stage failed");
                    run.sections.push(error_section(i + 1, stage, &error));
                    run.failures.push(StageFailure {
                        index: i + 1,
                        stage: stage.name.clone(),
                        error,
                    });
                }
            }

            progress.report(i + 1, total, &stage.name).await;
        }

        if run.sections.is_empty() || run.failures.len() == total {
            run.transition(RunState::Failed);
            tracing::error!(
                stages = total,
                failed = run.failures.len(),
                "aggregation failed: no stage produced content"
            );
            return Err(AggregationFailure {
                stages: total,
                failures: run.failures,
            });
        }

        run.transition(RunState::Done);
        Ok(AggregationOutcome {
            sections: run.sections,
            failures: run.failures,
        })
    }

    async fn run_stage(&self, stage: &Stage, ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        match tokio::time::timeout(self.stage_timeout, stage.provider.provide(&stage.key, ctx)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::new(
                stage.provider.id(),
                ProviderErrorKind::Timeout(self.stage_timeout),
            )),
        }
    }
}

/// Error section standing in for a failed stage.
fn error_section(index: usize, stage: &Stage, error: &ProviderError) -> Section {
    let status = match error.kind {
        ProviderErrorKind::Timeout(_) => Status::TIMEOUT,
        _ => Status::PROVIDER_ERROR,
    };
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let content = format!(
        "# Stage {index} ({name}) failed\n\n\
         - stage: {index} ({name})\n\
         - error type: {kind}\n\
         - cause: {error}\n\
         - time: {timestamp}\n",
        name = stage.name,
        kind = error.kind.name(),
    );

    SectionBuilder::new(CONTEXT_DIR)
        .status(status)
        .criticality(stage.criticality)
        .header("X-Resource", stage.key.to_string())
        .header("X-Stage", index.to_string())
        .header("X-Stage-Name", sanitize(&stage.name))
        .header("X-Error-Kind", error.kind.name())
        .content(content)
        .build()
        .expect("error section uses a constant location, validated keys and sanitized headers")
}

fn sanitize(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}
