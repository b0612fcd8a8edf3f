use std::fmt::Write as _;

use async_trait::async_trait;

use super::compliance::check;
use super::{file_name, is_directory, is_markdown, list_dir, Provider, ProviderContext, ProviderError, ResourceKey};
use crate::project_root::CONTEXT_DIR;
use crate::section::{Criticality, Section, SectionBuilder};

const PROVIDER: &str = "project-context";

/// `project/context`: a short overview of what the project has set up.
#[derive(Debug, Clone, Default)]
pub struct ProjectContextProvider;

#[async_trait]
impl Provider for ProjectContextProvider {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    async fn provide(&self, _key: &ResourceKey, ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        let rules = list_dir(PROVIDER, &ctx.content_root.join("rules"), is_markdown).await?;
        let workflows = list_dir(PROVIDER, &ctx.content_root.join("workflows"), is_markdown).await?;
        let knowledge = list_dir(PROVIDER, &ctx.context_dir().join("knowledge"), is_directory).await?;
        let tasks = list_dir(PROVIDER, &ctx.context_dir().join("tasks"), is_directory).await?;
        let compliance = check(ctx.project_root.clone()).await?;

        let features = compliance
            .active_features()
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>();

        let mut out = String::new();
        let _ = writeln!(out, "# Project: {}\n", file_name(&ctx.project_root));
        let _ = writeln!(out, "- rules: {}", rules.len());
        let _ = writeln!(out, "- workflows: {}", workflows.len());
        let _ = writeln!(out, "- knowledge bases: {}", knowledge.len());
        let _ = writeln!(out, "- tasks: {}", tasks.len());
        let _ = writeln!(
            out,
            "- active features: {}",
            if features.is_empty() { "none".to_string() } else { features.join(", ") }
        );
        let _ = writeln!(
            out,
            "- gitignore compliance: {}",
            if compliance.is_compliant() {
                "ok".to_string()
            } else {
                format!("{} issue(s), read project/gitignore-compliance", compliance.issues().len())
            }
        );

        let section = SectionBuilder::new(CONTEXT_DIR)
            .criticality(Criticality::Critical)
            .content(out)
            .build()
            .map_err(|e| ProviderError::new(PROVIDER, e))?;
        Ok(vec![section])
    }
}
