//! MCP tool server.
//!
//! Serves any [`ToolExecutorPort`] over newline-delimited JSON-RPC. The
//! `serve-tools` subcommand runs it on stdin/stdout with the local
//! filesystem tools, which is what the MCP transport mode spawns by default.
//!
//! | Method | Response |
//! |--------|----------|
//! | `initialize` | protocol version, `tools` capability, server info |
//! | `ping` | `{}` |
//! | `tools/list` | every tool with its `inputSchema` |
//! | `tools/call` | one text block holding the result envelope as JSON |
//! | `notifications/*` | none |

use std::sync::Arc;

use quill_application::ToolExecutorPort;
use quill_domain::ToolCall;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, BufReader};
use tracing::{debug, info, warn};

use super::error::Result;
use super::protocol::{
    CallToolParams, CallToolResult, ContentItem, Implementation, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, RpcError, ToolInfo,
};
use super::transport::write_message;
use crate::tools::JsonSchemaToolConverter;

pub struct McpServer {
    executor: Arc<dyn ToolExecutorPort>,
    info: Implementation,
}

impl McpServer {
    pub fn new(executor: Arc<dyn ToolExecutorPort>) -> Self {
        Self {
            executor,
            info: Implementation::quill(),
        }
    }

    /// Serve on this process's stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve one message per line until the reader reaches end of input.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Tool server ready ({} tools)", self.executor.tool_spec().len());

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => self.handle(request).await,
                Err(e) => {
                    warn!("Unreadable request: {}", e);
                    Some(JsonRpcResponse::failure(
                        None,
                        RpcError::new(RpcError::PARSE_ERROR, format!("Parse error: {}", e)),
                    ))
                }
            };

            if let Some(response) = response {
                write_message(&mut writer, &response).await?;
            }
        }

        info!("Tool server input closed");
        Ok(())
    }

    /// Answer one request. Notifications get no response.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, "Tool server request");

        if request.is_notification() {
            return None;
        }
        let id = request.id.clone();

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(RpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": self.info,
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<ToolInfo> = self
            .executor
            .tool_spec()
            .all()
            .map(|definition| {
                let schema = JsonSchemaToolConverter::tool_to_schema(definition);
                ToolInfo {
                    name: definition.name.clone(),
                    description: definition.description.clone(),
                    input_schema: schema["inputSchema"].clone(),
                }
            })
            .collect();

        json!(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> std::result::Result<Value, RpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| RpcError::invalid_params("tools/call requires params"))
            .and_then(|p| {
                serde_json::from_value(p).map_err(|e| RpcError::invalid_params(e.to_string()))
            })?;

        let call = ToolCall::new(params.name).with_arguments(params.arguments);
        let envelope = self.executor.execute(&call).await;

        Ok(json!(CallToolResult {
            content: vec![ContentItem::text(envelope.to_json())],
            is_error: envelope.is_error(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{LocalToolExecutor, PathResolver, default_registry};
    use std::fs;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    fn server(dir: &TempDir) -> McpServer {
        let local = LocalToolExecutor::new(default_registry(PathResolver::new(dir.path())));
        McpServer::new(Arc::new(local))
    }

    fn request(method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest::new(method, params)
    }

    #[tokio::test]
    async fn test_initialize() {
        let dir = TempDir::new().unwrap();
        let response = server(&dir)
            .handle(request("initialize", Some(json!({}))))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "quill");
    }

    #[tokio::test]
    async fn test_tools_list() {
        let dir = TempDir::new().unwrap();
        let response = server(&dir).handle(request("tools/list", None)).await.unwrap();
        let tools = &response.result.unwrap()["tools"];
        assert_eq!(tools[0]["name"], "read_file");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["filename"]));
        assert_eq!(tools.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_tools_call_returns_envelope_text() {
        let dir = TempDir::new().unwrap();
        let params = json!({
            "name": "edit_file",
            "arguments": {"path": "out.txt", "new_str": "hello"}
        });
        let response = server(&dir)
            .handle(request("tools/call", Some(params)))
            .await
            .unwrap();

        let result: CallToolResult = serde_json::from_value(response.result.unwrap()).unwrap();
        assert!(!result.is_error);
        let envelope: Value = serde_json::from_str(&result.text()).unwrap();
        assert_eq!(envelope["outcome"], "created");
        assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_tools_call_failure_sets_is_error() {
        let dir = TempDir::new().unwrap();
        let params = json!({"name": "read_file", "arguments": {"filename": "nope"}});
        let response = server(&dir)
            .handle(request("tools/call", Some(params)))
            .await
            .unwrap();
        let result: CallToolResult = serde_json::from_value(response.result.unwrap()).unwrap();
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);

        let missing = server.handle(request("tools/call", None)).await.unwrap();
        assert_eq!(missing.error.unwrap().code, RpcError::INVALID_PARAMS);

        let unknown = server.handle(request("resources/list", None)).await.unwrap();
        assert_eq!(unknown.error.unwrap().code, RpcError::METHOD_NOT_FOUND);

        let note = JsonRpcRequest::notification("notifications/initialized", None);
        assert!(server.handle(note).await.is_none());
    }

    #[tokio::test]
    async fn test_serve_answers_each_line() {
        let dir = TempDir::new().unwrap();
        let input = [
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "",
            "not json",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            r#"{"jsonrpc":"2.0","id":"two","method":"ping"}"#,
        ]
        .join("\n");

        let (mut out_read, out_write) = tokio::io::duplex(64 * 1024);
        server(&dir)
            .serve(BufReader::new(input.as_bytes()), out_write)
            .await
            .unwrap();

        let mut output = String::new();
        out_read.read_to_string(&mut output).await.unwrap();
        let responses: Vec<Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["error"]["code"], RpcError::PARSE_ERROR);
        assert_eq!(responses[1]["id"], Value::Null);
        assert_eq!(responses[2]["id"], "two");
    }
}
