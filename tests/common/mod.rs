//! Shared project fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use project_context_server::compliance::patterns::required_for;
use project_context_server::compliance::{FeatureId, BASELINE_FILES};
use project_context_server::providers::{
    Provider, ProviderContext, ProviderError, ProviderErrorKind, ResourceKey,
};
use project_context_server::section::{Criticality, Section};
use project_context_server::session::ProgressReporter;
use tempfile::TempDir;

/// A throwaway project directory with a `.context` dir.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    /// Empty project: `.context/` only, no ignore files.
    pub fn bare() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".context")).unwrap();
        Self { dir }
    }

    /// Project with the baseline `.gitignore` in place and no features.
    pub fn baseline() -> Self {
        let project = Self::bare();
        for required in BASELINE_FILES {
            project.write(required.path, required.block);
        }
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        relative.split('/').fold(self.root().to_path_buf(), |p, s| p.join(s))
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn append(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        let mut existing = fs::read_to_string(&path).unwrap_or_default();
        existing.push_str(content);
        self.write(relative, &existing);
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn add_rule(&self, name: &str, text: &str) {
        self.write(&format!(".context/rules/{name}.md"), text);
    }

    pub fn add_workflow(&self, name: &str, text: &str) {
        self.write(&format!(".context/workflows/{name}.md"), text);
    }

    /// Creates a knowledge base, which activates the `knowledge` feature.
    pub fn add_knowledge(&self, base: &str, doc: &str, text: &str) {
        self.write(&format!(".context/knowledge/{base}/{doc}"), text);
    }

    /// Creates a task, which activates the `tasks` feature.
    pub fn add_task(&self, name: &str, status: &str) {
        self.write(
            &format!(".context/tasks/{name}/task.md"),
            &format!("# Task {name}\n\nStatus: {status}\n\nDo the thing.\n"),
        );
    }

    /// Write the required block for `feature` into its target file.
    pub fn satisfy(&self, feature: FeatureId) {
        let required = required_for(feature);
        self.append(required.path, required.block);
    }

    pub fn ctx(&self) -> ProviderContext {
        ProviderContext::new(self.root(), None)
    }
}

/// Provider returning one fixed markdown section.
pub struct StaticProvider {
    pub id: &'static str,
    pub text: String,
}

impl StaticProvider {
    pub fn arc(id: &'static str, text: &str) -> Arc<dyn Provider> {
        Arc::new(Self {
            id,
            text: text.to_string(),
        })
    }
}

#[async_trait]
impl Provider for StaticProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn provide(&self, key: &ResourceKey, _ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        let section = Section::markdown(key.to_string(), Criticality::Informational, self.text.clone())
            .map_err(|e| ProviderError::new(self.id, e))?;
        Ok(vec![section])
    }
}

/// Provider that always fails with an I/O error.
pub struct FailingProvider {
    pub id: &'static str,
}

impl FailingProvider {
    pub fn arc(id: &'static str) -> Arc<dyn Provider> {
        Arc::new(Self { id })
    }
}

#[async_trait]
impl Provider for FailingProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn provide(&self, _key: &ResourceKey, ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        Err(ProviderError::io(
            self.id,
            &ctx.project_root.join("unreadable.md"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        ))
    }
}

/// Provider that succeeds with nothing to say.
pub struct EmptyProvider;

impl EmptyProvider {
    pub fn arc() -> Arc<dyn Provider> {
        Arc::new(Self)
    }
}

#[async_trait]
impl Provider for EmptyProvider {
    fn id(&self) -> &'static str {
        "empty"
    }

    async fn provide(&self, _key: &ResourceKey, _ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        Ok(Vec::new())
    }
}

/// Provider that never finishes within any reasonable budget.
pub struct SlowProvider;

#[async_trait]
impl Provider for SlowProvider {
    fn id(&self) -> &'static str {
        "slow"
    }

    async fn provide(&self, _key: &ResourceKey, _ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(ProviderError::new("slow", ProviderErrorKind::Internal("unreachable".into())))
    }
}

/// Provider that panics.
pub struct PanickingProvider;

#[async_trait]
impl Provider for PanickingProvider {
    fn id(&self) -> &'static str {
        "panicking"
    }

    async fn provide(&self, _key: &ResourceKey, _ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        panic!("provider bug");
    }
}

/// Reporter that records every call.
#[derive(Default)]
pub struct RecordingProgress {
    pub calls: std::sync::Mutex<Vec<(usize, usize)>>,
    pub count: AtomicUsize,
}

#[async_trait]
impl ProgressReporter for RecordingProgress {
    async fn report(&self, completed: usize, total: usize, _stage: &str) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.calls.lock().unwrap().push((completed, total));
    }
}

pub fn key(raw: &str) -> ResourceKey {
    ResourceKey::parse(raw).unwrap()
}
