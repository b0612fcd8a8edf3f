use serde::{Deserialize, Serialize};

use super::request::RpcId;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 response layer
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RpcId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RpcId>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RpcId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 notification (no id, no response expected).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

impl JsonRpcNotification {
    /// `notifications/progress` for a request that carried `token`.
    pub fn progress(token: serde_json::Value, completed: usize, total: usize, message: &str) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: "notifications/progress".into(),
            params: serde_json::json!({
                "progressToken": token,
                "progress": completed,
                "total": total,
                "message": message,
            }),
        }
    }
}

/// JSON-RPC 2.0 error object (protocol-level errors).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    pub fn parse_error() -> Self {
        Self { code: -32700, message: "Parse error".into(), data: None }
    }

    pub fn invalid_request() -> Self {
        Self { code: -32600, message: "Invalid Request".into(), data: None }
    }

    pub fn invalid_request_with(detail: impl Into<String>) -> Self {
        Self { code: -32600, message: detail.into(), data: None }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self { code: -32602, message: detail.into(), data: None }
    }

    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self { code: -32603, message: detail.into(), data: None }
    }
}

// ---------------------------------------------------------------------------
// MCP resource layer (returned inside a *successful* JSON-RPC response)
// ---------------------------------------------------------------------------

/// Result of `resources/read`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContents>,
}

/// Text contents of one resource.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceContents {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
}

impl ReadResourceResult {
    pub fn text(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            contents: vec![ResourceContents {
                uri: uri.into(),
                mime_type: "text/plain".into(),
                text: text.into(),
            }],
        }
    }
}

/// Entry of `resources/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Entry of `resources/templates/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceTemplateDescriptor {
    #[serde(rename = "uriTemplate")]
    pub uri_template: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

// ---------------------------------------------------------------------------
// Resource-level error types
// ---------------------------------------------------------------------------

/// Resource error code (v0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceErrorCode {
    ResourceNotFound,
    InvalidKey,
    ProviderFailed,
    AggregationFailed,
    InternalError,
}

impl ResourceErrorCode {
    /// Map to the corresponding JSON-RPC 2.0 error code.
    ///
    /// Unknown resource        → -32002 (MCP resource not found)
    /// Input validation failure → -32602 (Invalid params)
    /// Server-side failures     → -32603 (Internal error)
    pub fn json_rpc_code(&self) -> i32 {
        match self {
            Self::ResourceNotFound => -32002,
            Self::InvalidKey => -32602,
            Self::ProviderFailed | Self::AggregationFailed | Self::InternalError => -32603,
        }
    }
}

/// Resource error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceError {
    pub code: ResourceErrorCode,
    pub message: String,
}

/// Resource error response (top-level)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceErrorResponse {
    pub error: ResourceError,
}

impl ResourceErrorResponse {
    pub fn new(code: ResourceErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ResourceError {
                code,
                message: message.into(),
            },
        }
    }

    /// Construct with the canonical message for a given code.
    pub fn canonical(code: ResourceErrorCode) -> Self {
        let message = match &code {
            ResourceErrorCode::ResourceNotFound => "Resource does not exist",
            ResourceErrorCode::InvalidKey => "Resource key is invalid",
            ResourceErrorCode::ProviderFailed => "Content provider failed",
            ResourceErrorCode::AggregationFailed => "No content source succeeded",
            ResourceErrorCode::InternalError => "Internal error",
        };
        Self::new(code, message)
    }
}

/// Convert a resource error into a JSON-RPC error.
///
/// The JSON-RPC `code` is derived from the resource error code.
/// The JSON-RPC `message` is the human-readable message.
/// The full error object is carried in `data` for structured clients.
impl From<ResourceErrorResponse> for JsonRpcError {
    fn from(err: ResourceErrorResponse) -> Self {
        Self {
            code: err.error.code.json_rpc_code(),
            message: err.error.message.clone(),
            data: serde_json::to_value(&err).ok(),
        }
    }
}
