use std::fmt::Write as _;
use std::path::Path;

use async_trait::async_trait;

use super::{file_name, is_directory, is_markdown, list_dir, read_text, Provider, ProviderContext, ProviderError, ResourceKey};
use crate::section::{Criticality, Section, SectionBuilder};

pub const INDEX: &str = "index";

const PROVIDER: &str = "knowledge";

/// Knowledge bases: one directory of markdown files each, under
/// `.context/knowledge/`.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeProvider;

#[async_trait]
impl Provider for KnowledgeProvider {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    async fn provide(&self, key: &ResourceKey, ctx: &ProviderContext) -> Result<Vec<Section>, ProviderError> {
        let root = ctx.context_dir().join("knowledge");
        if key.name() == INDEX {
            index(ctx, &root).await.map(|section| vec![section])
        } else {
            base(ctx, &root.join(key.name())).await.map(|section| vec![section])
        }
    }
}

async fn index(ctx: &ProviderContext, root: &Path) -> Result<Section, ProviderError> {
    let bases = list_dir(PROVIDER, root, is_directory).await?;

    let mut out = String::from("# Knowledge bases\n\n");
    if bases.is_empty() {
        out.push_str("No knowledge bases found.\n");
    }

    for base in &bases {
        let docs = list_dir(PROVIDER, base, is_markdown).await?;
        let summary = match docs.first() {
            Some(first) => first_heading(&read_text(PROVIDER, first).await?),
            None => None,
        };

        let _ = write!(out, "- `{}` ({} document(s))", file_name(base), docs.len());
        if let Some(summary) = summary {
            let _ = write!(out, ": {summary}");
        }
        out.push('\n');
    }

    SectionBuilder::new(ctx.symbolic(root))
        .criticality(Criticality::Informational)
        .header("X-Count", bases.len().to_string())
        .content(out)
        .build()
        .map_err(|e| ProviderError::new(PROVIDER, e))
}

async fn base(ctx: &ProviderContext, dir: &Path) -> Result<Section, ProviderError> {
    let missing = || ProviderError::not_found(PROVIDER, format!("knowledge base {}", file_name(dir)));
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(missing()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(missing()),
        Err(e) => return Err(ProviderError::io(PROVIDER, dir, e)),
    }

    let docs = list_dir(PROVIDER, dir, is_markdown).await?;
    let mut out = String::new();
    for (i, doc) in docs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "<!-- {} -->", file_name(doc));
        out.push_str(&read_text(PROVIDER, doc).await?);
    }

    SectionBuilder::new(ctx.symbolic(dir))
        .criticality(Criticality::Informational)
        .header("X-Documents", docs.len().to_string())
        .content(out)
        .build()
        .map_err(|e| ProviderError::new(PROVIDER, e))
}

fn first_heading(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|heading| heading.trim().to_string())
        .filter(|heading| !heading.is_empty())
}
