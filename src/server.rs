//! MCP server implementation.
//!
//! Handles JSON-RPC 2.0 over stdio according to the MCP protocol specification.
//! Each `tools/call` runs on its own task so a slow upstream call does not
//! hold up the others; a single writer task serializes responses.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::error::{rpc_codes, McpError, Result};
use crate::session::ArcannaSession;
use crate::tools::ToolRegistry;

/// MCP protocol version we support.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server information.
const SERVER_NAME: &str = "arcanna-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<JsonValue>,
    pub method: String,
    #[serde(default)]
    pub params: Option<JsonValue>,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<JsonValue>, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<JsonValue>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }

    /// Create an error response from an McpError.
    pub fn from_error(id: Option<JsonValue>, err: McpError) -> Self {
        let mut response = Self::error(id, err.rpc_code(), err.to_string());
        if let Some(error) = response.error.as_mut() {
            error.data = Some(serde_json::json!({ "kind": err.kind() }));
        }
        response
    }
}

/// Wrap a tool outcome in the MCP `content` envelope.
///
/// Tool errors become `isError` results carrying the structured payload;
/// other errors stay JSON-RPC errors.
pub fn tool_response(id: Option<JsonValue>, outcome: Result<JsonValue>) -> JsonRpcResponse {
    match outcome {
        Ok(result) => {
            let text = match result {
                JsonValue::String(s) => s,
                other => other.to_string(),
            };
            JsonRpcResponse::success(
                id,
                serde_json::json!({
                    "content": [{ "type": "text", "text": text }]
                }),
            )
        }
        Err(err) if err.is_tool_error() => JsonRpcResponse::success(
            id,
            serde_json::json!({
                "content": [{ "type": "text", "text": err.to_payload().to_string() }],
                "isError": true
            }),
        ),
        Err(err) => JsonRpcResponse::from_error(id, err),
    }
}

/// MCP server.
pub struct McpServer {
    session: Arc<ArcannaSession>,
    registry: Arc<ToolRegistry>,
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server with the given session.
    pub fn new(session: ArcannaSession) -> Self {
        Self {
            session: Arc::new(session),
            registry: Arc::new(ToolRegistry::new()),
            initialized: false,
        }
    }

    /// Whether the client has sent `initialize`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server, reading from stdin and writing to stdout.
    pub async fn run(&mut self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve newline-delimited JSON-RPC from `reader`, writing responses to `writer`.
    ///
    /// Returns once the reader hits EOF and every in-flight tool call has answered.
    pub async fn serve<R, W>(&mut self, mut reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(rx, writer));
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                // EOF - client disconnected
                break;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let request = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(error = %e, "unparseable request");
                    send(&tx, JsonRpcResponse::error(None, rpc_codes::PARSE_ERROR, format!("Parse error: {}", e)));
                    continue;
                }
            };

            if request.jsonrpc == "2.0" && request.id.is_some() && request.method == "tools/call" {
                let session = Arc::clone(&self.session);
                let registry = Arc::clone(&self.registry);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let response = call_tool(&registry, &session, request).await;
                    send(&tx, response);
                });
            } else if let Some(response) = self.handle_request(request).await {
                send(&tx, response);
            }
        }

        drop(tx);
        writer_task
            .await
            .map_err(|e| McpError::Internal(format!("response writer failed: {}", e)))?
    }

    /// Handle a single JSON-RPC request.
    ///
    /// Returns `None` for notifications, which get no response.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        // Validate JSON-RPC version
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                rpc_codes::INVALID_REQUEST,
                "Invalid JSON-RPC version".to_string(),
            ));
        }

        if request.id.is_none() {
            tracing::debug!(method = %request.method, "notification");
            return None;
        }

        // Route to appropriate handler
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => call_tool(&self.registry, &self.session, request).await,
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
            _ => JsonRpcResponse::error(
                request.id,
                rpc_codes::METHOD_NOT_FOUND,
                format!("Unknown method: {}", request.method),
            ),
        };
        Some(response)
    }

    /// Handle the initialize request.
    fn handle_initialize(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.initialized = true;
        tracing::info!("client initialized");

        JsonRpcResponse::success(
            request.id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION
                }
            }),
        )
    }

    /// Handle the tools/list request.
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tools: Vec<JsonValue> = self
            .registry
            .tools()
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        JsonRpcResponse::success(request.id, serde_json::json!({ "tools": tools }))
    }
}

/// Handle the tools/call request.
async fn call_tool(
    registry: &ToolRegistry,
    session: &ArcannaSession,
    request: JsonRpcRequest,
) -> JsonRpcResponse {
    // Extract name and arguments from params
    let params = match &request.params {
        Some(JsonValue::Object(obj)) => obj,
        _ => {
            return JsonRpcResponse::error(
                request.id,
                rpc_codes::INVALID_PARAMS,
                "Missing params object".to_string(),
            )
        }
    };

    let name = match params.get("name").and_then(|v| v.as_str()) {
        Some(n) => n.to_string(),
        None => {
            return JsonRpcResponse::error(
                request.id,
                rpc_codes::INVALID_PARAMS,
                "Missing 'name' in params".to_string(),
            )
        }
    };

    let arguments = match params.get("arguments") {
        Some(JsonValue::Object(obj)) => obj.clone(),
        Some(JsonValue::Null) | None => Map::new(),
        _ => {
            return JsonRpcResponse::error(
                request.id,
                rpc_codes::INVALID_PARAMS,
                "'arguments' must be an object".to_string(),
            )
        }
    };

    let outcome = registry.dispatch(session, &name, arguments).await;
    if let Err(err) = &outcome {
        tracing::info!(tool = %name, kind = err.kind(), error = %err, "tool call failed");
    }
    tool_response(request.id, outcome)
}

fn send(tx: &mpsc::UnboundedSender<JsonRpcResponse>, response: JsonRpcResponse) {
    if tx.send(response).is_err() {
        tracing::error!("response writer has stopped; dropping response");
    }
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_rpc_response_success() {
        let response = JsonRpcResponse::success(Some(JsonValue::Number(1.into())), serde_json::json!({"ok": true}));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"result\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_json_rpc_response_error() {
        let response = JsonRpcResponse::error(Some(JsonValue::Number(1.into())), -32600, "Invalid".to_string());
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"error\""));
        assert!(!json.contains("\"result\""));
    }

    #[test]
    fn test_tool_error_becomes_is_error_result() {
        let response = tool_response(Some(1.into()), Err(McpError::job_not_found("X")));
        let result = response.result.expect("tool errors are results");
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        let payload: JsonValue = serde_json::from_str(text).unwrap();
        assert_eq!(payload["kind"], "not_found");
    }

    #[test]
    fn test_argument_error_stays_rpc_error() {
        let response = tool_response(Some(1.into()), Err(McpError::MissingArg("job_id".into())));
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, rpc_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_string_result_is_not_quoted() {
        let response = tool_response(Some(1.into()), Ok(JsonValue::String("2026-01-01T00:00:00Z".into())));
        assert_eq!(response.result.unwrap()["content"][0]["text"], "2026-01-01T00:00:00Z");
    }
}
