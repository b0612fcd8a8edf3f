use std::path::{Path, PathBuf};

use crate::handlers::AppState;
use crate::project_root::{self, PathResolutionError, CONTEXT_DIR};
use crate::protocol::{ReadResourceParams, ReadResourceResult, ResourceErrorCode, ResourceErrorResponse};
use crate::providers::{ProviderContext, ProviderError, ProviderErrorKind, ResourceKey};
use crate::section::{format, format_multi, Criticality, Section, SectionBuilder, Status};
use crate::session::{ProgressReporter, WorkdirScope, SESSION_KEY};

/// Handle a `resources/read` request.
///
/// Resolves the project root first; when that fails the response is a
/// setup-guidance section rather than an error. `session/init-context` runs
/// the aggregator; every other key goes to its registered provider.
pub async fn handle(
    params: ReadResourceParams,
    state: &AppState,
    progress: &dyn ProgressReporter,
) -> Result<ReadResourceResult, ResourceErrorResponse> {
    let key = ResourceKey::parse(&params.uri).map_err(|e| {
        tracing::debug!(error = %e, "rejected resource key");
        ResourceErrorResponse::new(ResourceErrorCode::InvalidKey, e.to_string())
    })?;
    let uri = key.uri();

    let is_session = key.to_string() == SESSION_KEY;
    let provider = if is_session {
        None
    } else {
        let provider = state.registry.lookup(&key).ok_or_else(|| {
            ResourceErrorResponse::new(
                ResourceErrorCode::ResourceNotFound,
                format!("Unknown resource: {key}"),
            )
        })?;
        Some(provider)
    };

    let ctx = match resolve_root(state.config.project_root.as_deref()).await {
        Ok(root) => ProviderContext::new(root, state.config.content_dir.clone()),
        Err(e) => {
            tracing::warn!(error = %e, "project root not found; returning setup guidance");
            return Ok(ReadResourceResult::text(uri, format(&setup_section(&e))));
        }
    };

    let text = match provider {
        None => state.aggregator.run(&ctx, progress).await.map_err(|failure| {
            for failed in &failure.failures {
                tracing::error!(stage = %failed.stage, error = %failed.error, "stage failed");
            }
            ResourceErrorResponse::new(ResourceErrorCode::AggregationFailed, failure.to_string())
        })?,
        Some(provider) => {
            let timeout = state.config.provider_timeout;
            let sections = match tokio::time::timeout(timeout, provider.provide(&key, &ctx)).await {
                Ok(result) => result.map_err(provider_error)?,
                Err(_) => {
                    return Err(provider_error(ProviderError::new(
                        provider.id(),
                        ProviderErrorKind::Timeout(timeout),
                    )))
                }
            };
            format_multi(&sections)
        }
    };

    Ok(ReadResourceResult::text(uri, text))
}

/// Resolve the project root, discovering it from the server's own working
/// directory when none is configured.
async fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf, PathResolutionError> {
    if let Some(root) = explicit {
        return project_root::resolve(Some(root), root);
    }
    let cwd = WorkdirScope::current_dir()
        .await
        .map_err(|e| PathResolutionError::WorkingDirectory(e.to_string()))?;
    project_root::discover(&cwd)
}

fn provider_error(err: ProviderError) -> ResourceErrorResponse {
    tracing::warn!(error = %err, "provider failed");
    let code = match err.kind {
        ProviderErrorKind::NotFound(_) => ResourceErrorCode::ResourceNotFound,
        ProviderErrorKind::InvalidKey(_) => ResourceErrorCode::InvalidKey,
        _ => ResourceErrorCode::ProviderFailed,
    };
    ResourceErrorResponse::new(code, err.to_string())
}

/// Guidance shown when no project root can be found.
pub fn setup_section(err: &PathResolutionError) -> Section {
    SectionBuilder::new(CONTEXT_DIR)
        .status(Status::SETUP_REQUIRED)
        .criticality(Criticality::Critical)
        .header("X-Setup-Required", "true")
        .content(err.guidance())
        .build()
        .expect("setup section uses a constant location and headers")
}
