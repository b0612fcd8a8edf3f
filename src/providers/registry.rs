//! Explicit resource-key → provider table, built once at startup.

use std::sync::Arc;

use super::compliance::{ComplianceProvider, GitignoreFilesProvider};
use super::content::ContentProvider;
use super::knowledge::KnowledgeProvider;
use super::project::ProjectContextProvider;
use super::tasks::TaskProvider;
use super::{Provider, ResourceKey};

/// Placeholder segment matching any item name.
const NAME_PLACEHOLDER: &str = "{name}";

pub struct RegistryEntry {
    /// `category/name` or `category/{name}`.
    pub template: &'static str,
    pub description: &'static str,
    pub provider: Arc<dyn Provider>,
}

impl RegistryEntry {
    pub fn is_template(&self) -> bool {
        self.template.ends_with(NAME_PLACEHOLDER)
    }

    fn matches_exactly(&self, key: &ResourceKey) -> bool {
        self.template
            .split_once('/')
            .map_or(false, |(category, name)| category == key.category() && name == key.name())
    }

    fn matches_template(&self, key: &ResourceKey) -> bool {
        self.template
            .split_once('/')
            .map_or(false, |(category, name)| category == key.category() && name == NAME_PLACEHOLDER)
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("template", &self.template)
            .field("provider", &self.provider.id())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct ProviderRegistry {
    entries: Vec<RegistryEntry>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        template: &'static str,
        description: &'static str,
        provider: Arc<dyn Provider>,
    ) -> Self {
        self.entries.push(RegistryEntry {
            template,
            description,
            provider,
        });
        self
    }

    /// Every content source the server exposes.
    pub fn standard() -> Self {
        let rules: Arc<dyn Provider> = Arc::new(ContentProvider::rules());
        let workflows: Arc<dyn Provider> = Arc::new(ContentProvider::workflows());
        let knowledge: Arc<dyn Provider> = Arc::new(KnowledgeProvider);
        let tasks: Arc<dyn Provider> = Arc::new(TaskProvider);

        Self::new()
            .register("rule/all", "All project rules", rules.clone())
            .register("rule/{name}", "A single project rule", rules)
            .register("workflow/all", "All workflows", workflows.clone())
            .register("workflow/{name}", "A single workflow", workflows)
            .register("knowledge/index", "Index of knowledge bases", knowledge.clone())
            .register("knowledge/{name}", "All documents of one knowledge base", knowledge)
            .register("task/index", "Task inventory with status", tasks.clone())
            .register("task/active", "Tasks currently in progress", tasks.clone())
            .register("task/{name}", "A single task description", tasks)
            .register(
                "project/context",
                "Project overview: content counts, active features, compliance state",
                Arc::new(ProjectContextProvider),
            )
            .register(
                "project/gitignore-compliance",
                "Empty when .gitignore files are compliant, otherwise remediation steps",
                Arc::new(ComplianceProvider),
            )
            .register(
                "project/gitignore-files",
                "Raw contents of the .gitignore files checked for compliance",
                Arc::new(GitignoreFilesProvider),
            )
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Find the provider for `key`. Exact templates win over `{name}` ones.
    pub fn lookup(&self, key: &ResourceKey) -> Option<&Arc<dyn Provider>> {
        self.entries
            .iter()
            .find(|entry| entry.matches_exactly(key))
            .or_else(|| self.entries.iter().find(|entry| entry.matches_template(key)))
            .map(|entry| &entry.provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_for(registry: &ProviderRegistry, key: &str) -> Option<&'static str> {
        registry
            .lookup(&ResourceKey::parse(key).unwrap())
            .map(|p| p.id())
    }

    #[test]
    fn exact_entries_win_over_templates() {
        let registry = ProviderRegistry::standard();
        assert_eq!(provider_for(&registry, "knowledge/index"), Some("knowledge"));
        assert_eq!(provider_for(&registry, "knowledge/api"), Some("knowledge"));
        assert_eq!(provider_for(&registry, "project/context"), Some("project-context"));
        assert_eq!(provider_for(&registry, "project/gitignore-compliance"), Some("compliance"));
        assert_eq!(provider_for(&registry, "rule/core"), Some("rules"));
    }

    #[test]
    fn unknown_keys_have_no_provider() {
        let registry = ProviderRegistry::standard();
        assert_eq!(provider_for(&registry, "project/unknown"), None);
        assert_eq!(provider_for(&registry, "howto/x"), None);
    }
}
