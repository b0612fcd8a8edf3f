use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::config::ServerConfig;
use crate::handlers::{self, AppState};
use crate::protocol::{JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use crate::session::ProgressCollector;

/// Maximum bytes per JSON-RPC message (1 MiB).
const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// MCP server that communicates over stdio using newline-delimited JSON-RPC 2.0.
pub struct McpServer {
    state: AppState,
    initialized: bool,
}

impl McpServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: AppState::new(config),
            initialized: false,
        }
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut raw = Vec::new();

        tracing::info!("serving project context over stdio");

        loop {
            raw.clear();
            let n = reader.read_until(b'\n', &mut raw).await?;
            if n == 0 {
                break;
            }

            if n > MAX_MESSAGE_BYTES {
                tracing::warn!(bytes = n, limit = MAX_MESSAGE_BYTES, "message too large");
                write_message(
                    &mut stdout,
                    &JsonRpcResponse::error(None, JsonRpcError::parse_error()),
                ).await?;
                continue;
            }

            let trimmed = match std::str::from_utf8(&raw) {
                Ok(s) => s.trim(),
                Err(_) => {
                    write_message(
                        &mut stdout,
                        &JsonRpcResponse::error(None, JsonRpcError::parse_error()),
                    ).await?;
                    continue;
                }
            };

            if trimmed.is_empty() {
                continue;
            }

            let req: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(error = %e, "parse error");
                    write_message(
                        &mut stdout,
                        &JsonRpcResponse::error(None, JsonRpcError::parse_error()),
                    ).await?;
                    continue;
                }
            };

            // Validate jsonrpc version
            if req.jsonrpc != "2.0" {
                write_message(
                    &mut stdout,
                    &JsonRpcResponse::error(req.id.clone(), JsonRpcError::invalid_request()),
                ).await?;
                continue;
            }

            // Initialization gate: only `initialize` is allowed before handshake completes
            if !self.initialized && req.method != "initialize" {
                if req.id.is_none() {
                    continue;
                }
                write_message(
                    &mut stdout,
                    &JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_request_with("Server not initialized"),
                    ),
                ).await?;
                continue;
            }

            tracing::debug!(method = %req.method, "dispatching request");
            let progress = ProgressCollector::default();
            let response = handlers::dispatch(&req, &self.state, &progress).await;

            // Progress is buffered and sent ahead of the response it belongs to.
            if let Some(token) = req.progress_token() {
                for event in progress.take() {
                    let note = JsonRpcNotification::progress(
                        token.clone(),
                        event.completed,
                        event.total,
                        &event.stage,
                    );
                    write_message(&mut stdout, &note).await?;
                }
            }

            if let Some(resp) = response {
                write_message(&mut stdout, &resp).await?;
            }

            if req.method == "initialize" {
                self.initialized = true;
            }
        }

        tracing::info!("stdin closed; shutting down");
        Ok(())
    }
}

async fn write_message<T: Serialize>(
    stdout: &mut tokio::io::Stdout,
    message: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    let out = serde_json::to_string(message)?;
    stdout.write_all(out.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
