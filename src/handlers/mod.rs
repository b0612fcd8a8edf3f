pub mod list_resources;
pub mod read_resource;

use crate::config::ServerConfig;
use crate::protocol::{
    InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ReadResourceParams,
};
use crate::providers::ProviderRegistry;
use crate::session::{Aggregator, ProgressReporter};

/// Everything a request handler needs; built once at startup.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub registry: ProviderRegistry,
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let aggregator = Aggregator::standard(config.provider_timeout)
            .with_workdir_scope(config.scope_working_directory);
        Self {
            config,
            registry: ProviderRegistry::standard(),
            aggregator,
        }
    }
}

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(
    req: &JsonRpcRequest,
    state: &AppState,
    progress: &dyn ProgressReporter,
) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => {
            if let Some(params) = req
                .params
                .as_ref()
                .and_then(|v| serde_json::from_value::<InitializeParams>(v.clone()).ok())
            {
                let client = params.client_info.as_ref();
                tracing::info!(
                    client = client.and_then(|c| c.name.as_deref()).unwrap_or("unknown"),
                    client_version = client.and_then(|c| c.version.as_deref()).unwrap_or("unknown"),
                    protocol = params.protocol_version.as_deref().unwrap_or("unspecified"),
                    "client initializing"
                );
            }

            let result = serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "resources": {}
                },
                "serverInfo": {
                    "name": "project-context-server",
                    "version": env!("CARGO_PKG_VERSION")
                }
            });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "notifications/initialized" => None,

        "ping" => Some(JsonRpcResponse::success(req.id.clone(), serde_json::json!({}))),

        "resources/list" => Some(JsonRpcResponse::success(
            req.id.clone(),
            list_resources::handle(&state.registry),
        )),

        "resources/templates/list" => Some(JsonRpcResponse::success(
            req.id.clone(),
            list_resources::handle_templates(&state.registry),
        )),

        "resources/read" => {
            let params: ReadResourceParams = match &req.params {
                Some(v) => match serde_json::from_value(v.clone()) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            req.id.clone(),
                            JsonRpcError::invalid_params(format!(
                                "Invalid resources/read params: {e}"
                            )),
                        ));
                    }
                },
                None => {
                    return Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_params("Missing params for resources/read"),
                    ));
                }
            };

            match read_resource::handle(params, state, progress).await {
                Ok(result) => match serde_json::to_value(&result) {
                    Ok(value) => Some(JsonRpcResponse::success(req.id.clone(), value)),
                    Err(e) => {
                        tracing::error!(error = %e, "serialization failed");
                        Some(JsonRpcResponse::error(
                            req.id.clone(),
                            JsonRpcError::internal_error("Serialization failed"),
                        ))
                    }
                },
                Err(err) => Some(JsonRpcResponse::error(req.id.clone(), err.into())),
            }
        }

        _ => Some(JsonRpcResponse::error(
            req.id.clone(),
            JsonRpcError::method_not_found(&req.method),
        )),
    }
}
