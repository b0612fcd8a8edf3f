use crate::protocol::{ResourceDescriptor, ResourceTemplateDescriptor};
use crate::providers::{ProviderRegistry, URI_SCHEME};
use crate::session::SESSION_KEY;

const MIME_TYPE: &str = "text/plain";

/// Handle `resources/list`.
///
/// Lists every concrete (non-template) key in registry order, followed by
/// the composite session resource.
pub fn handle(registry: &ProviderRegistry) -> serde_json::Value {
    let mut resources: Vec<ResourceDescriptor> = registry
        .entries()
        .iter()
        .filter(|entry| !entry.is_template())
        .map(|entry| ResourceDescriptor {
            uri: format!("{URI_SCHEME}{}", entry.template),
            name: entry.template.to_string(),
            description: entry.description.to_string(),
            mime_type: MIME_TYPE.into(),
        })
        .collect();

    resources.push(ResourceDescriptor {
        uri: format!("{URI_SCHEME}{SESSION_KEY}"),
        name: SESSION_KEY.to_string(),
        description: "Combined session context: rules, compliance, project, workflows, knowledge, tasks"
            .to_string(),
        mime_type: MIME_TYPE.into(),
    });

    serde_json::json!({ "resources": resources })
}

/// Handle `resources/templates/list`.
pub fn handle_templates(registry: &ProviderRegistry) -> serde_json::Value {
    let templates: Vec<ResourceTemplateDescriptor> = registry
        .entries()
        .iter()
        .filter(|entry| entry.is_template())
        .map(|entry| ResourceTemplateDescriptor {
            uri_template: format!("{URI_SCHEME}{}", entry.template),
            name: entry.template.to_string(),
            description: entry.description.to_string(),
            mime_type: MIME_TYPE.into(),
        })
        .collect();

    serde_json::json!({ "resourceTemplates": templates })
}
