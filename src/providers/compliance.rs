use std::path::PathBuf;

use async_trait::async_trait;

use super::{read_text, Provider, ProviderContext, ProviderError, ProviderErrorKind, ResourceKey};
use crate::compliance::patterns::known_files;
use crate::compliance::{detect_active_features, validate, ComplianceResult};
use crate::project_root::join_relative;
use crate::section::{Criticality, Section, SectionBuilder, Status};

const PROVIDER: &str = "compliance";

/// Run detection and validation off the async runtime.
pub async fn check(project_root: PathBuf) -> Result<ComplianceResult, ProviderError> {
    tokio::task::spawn_blocking(move || {
        let features = detect_active_features(&project_root);
        validate(&project_root, &features)
    })
    .await
    .map_err(|e| ProviderError::new(PROVIDER, ProviderErrorKind::Internal(format!("compliance task failed: {e}"))))
}

/// Diagnostic section for a non-compliant result; `None` when compliant.
pub fn diagnostic_section(result: &ComplianceResult) -> Result<Option<Section>, ProviderError> {
    let Some(first) = result.issues().first() else {
        return Ok(None);
    };

    let features = result
        .active_features()
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(",");

    SectionBuilder::new(first.file_path.clone())
        .status(Status::DIAGNOSTIC)
        .criticality(Criticality::Critical)
        .writable(true)
        .header("X-Issue-Count", result.issues().len().to_string())
        .header("X-Active-Features", features)
        .content(result.remediation_guidance())
        .build()
        .map(Some)
        .map_err(|e| ProviderError::new(PROVIDER, e))
}

/// `project/gitignore-compliance`: nothing when compliant, otherwise one
/// critical diagnostic section.
#[derive(Debug, Clone, Default)]
pub struct ComplianceProvider;

#[async_trait]
impl Provider for ComplianceProvider {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    async fn provide(&self, _key: &ResourceKey, ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        let result = check(ctx.project_root.clone()).await?;
        if result.is_compliant() {
            tracing::debug!("project is gitignore-compliant");
        } else {
            tracing::info!(issues = result.issues().len(), "gitignore compliance issues found");
        }
        Ok(diagnostic_section(&result)?.into_iter().collect())
    }
}

/// `project/gitignore-files`: the ignore files the compliance check looks
/// at, verbatim.
#[derive(Debug, Clone, Default)]
pub struct GitignoreFilesProvider;

#[async_trait]
impl Provider for GitignoreFilesProvider {
    fn id(&self) -> &'static str {
        "gitignore-files"
    }

    async fn provide(&self, _key: &ResourceKey, ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        let mut sections = Vec::new();
        for relative in known_files() {
            let path = join_relative(&ctx.project_root, relative);
            let text = match read_text(self.id(), &path).await {
                Ok(text) => text,
                Err(ProviderError {
                    kind: ProviderErrorKind::NotFound(_),
                    ..
                }) => continue,
                Err(e) => return Err(e),
            };

            let section = SectionBuilder::new(relative)
                .content_type("text/plain")
                .criticality(Criticality::Informational)
                .writable(true)
                .content(text)
                .build()
                .map_err(|e| ProviderError::new(self.id(), e))?;
            sections.push(section);
        }
        Ok(sections)
    }
}
