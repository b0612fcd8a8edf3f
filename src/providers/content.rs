use std::path::PathBuf;

use async_trait::async_trait;

use super::{file_stem, is_markdown, list_dir, read_text, Provider, ProviderContext, ProviderError, ResourceKey};
use crate::section::{Criticality, Section, SectionBuilder};

/// Name that selects every document in the directory.
pub const ALL: &str = "all";

/// Authored markdown documents (rules, workflows) under the content root.
///
/// `<category>/<name>` reads `<content_root>/<dir>/<name>.md`;
/// `<category>/all` returns every document, sorted by name.
#[derive(Debug, Clone)]
pub struct ContentProvider {
    id: &'static str,
    dir: &'static str,
    criticality: Criticality,
}

impl ContentProvider {
    pub fn rules() -> Self {
        Self {
            id: "rules",
            dir: "rules",
            criticality: Criticality::Critical,
        }
    }

    pub fn workflows() -> Self {
        Self {
            id: "workflows",
            dir: "workflows",
            criticality: Criticality::Informational,
        }
    }

    fn dir_path(&self, ctx: &ProviderContext) -> PathBuf {
        ctx.content_root.join(self.dir)
    }

    async fn document(&self, ctx: &ProviderContext, path: PathBuf) -> Result<Section, ProviderError> {
        let text = read_text(self.id, &path).await?;
        SectionBuilder::new(ctx.symbolic(&path))
            .criticality(self.criticality)
            .header("X-Name", file_stem(&path))
            .content(text)
            .build()
            .map_err(|e| ProviderError::new(self.id, e))
    }
}

#[async_trait]
impl Provider for ContentProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn provide(&self, key: &ResourceKey, ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        let dir = self.dir_path(ctx);

        if key.name() != ALL {
            let path = dir.join(format!("{}.md", key.name()));
            return Ok(vec![self.document(ctx, path).await?]);
        }

        let paths = list_dir(self.id, &dir, is_markdown).await?;
        if paths.is_empty() {
            let notice = format!("No {} found in `{}`.\n", self.dir, ctx.symbolic(&dir));
            let section = Section::markdown(ctx.symbolic(&dir), self.criticality, notice)
                .map_err(|e| ProviderError::new(self.id, e))?;
            return Ok(vec![section]);
        }

        let mut sections = Vec::with_capacity(paths.len());
        for path in paths {
            sections.push(self.document(ctx, path).await?);
        }
        tracing::debug!(provider = self.id, count = sections.len(), "loaded documents");
        Ok(sections)
    }
}
