use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 ID: a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    Str(String),
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<RpcId>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// `params._meta.progressToken`, when the client asked for progress.
    pub fn progress_token(&self) -> Option<serde_json::Value> {
        self.params
            .as_ref()?
            .get("_meta")?
            .get("progressToken")
            .cloned()
    }
}

/// Parameters for `resources/read`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadResourceParams {
    /// `context://category/name` or bare `category/name`.
    pub uri: String,
}

/// MCP `initialize` params.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information sent during `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}
