//! MCP client and the [`ToolExecutorPort`] adapter built on it.
//!
//! # Connection lifecycle
//!
//! ```text
//! McpToolExecutor::spawn()
//!   ├─ StdioTransport::spawn()          child process, piped stdio
//!   ├─ initialize                       protocol handshake
//!   ├─ notifications/initialized
//!   └─ tools/list (all pages)           → ToolSpec for the prompt
//!
//! ToolExecutorPort::execute()
//!   └─ tools/call                       → ToolResultEnvelope
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quill_application::ToolExecutorPort;
use quill_domain::{ToolCall, ToolError, ToolResultEnvelope, ToolSpec};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use super::error::{McpError, Result};
use super::protocol::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult,
    ListToolsResult, PROTOCOL_VERSION, ToolInfo,
};
use super::transport::{McpTransport, StdioTransport};
use crate::tools::JsonSchemaToolConverter;

/// Typed MCP calls over a transport
pub struct McpClient {
    transport: Arc<dyn McpTransport>,
}

impl McpClient {
    pub fn new(transport: Arc<dyn McpTransport>) -> Self {
        Self { transport }
    }

    /// Run the handshake: `initialize`, then `notifications/initialized`.
    pub async fn initialize(&self) -> Result<InitializeResult> {
        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: json!({}),
            client_info: Implementation::quill(),
        };
        let result = self
            .transport
            .request("initialize", Some(serde_json::to_value(params)?))
            .await?;
        let result: InitializeResult = parse_result("initialize", result)?;

        if result.protocol_version != PROTOCOL_VERSION {
            warn!(
                "Tool server speaks protocol {}, expected {}",
                result.protocol_version, PROTOCOL_VERSION
            );
        }

        self.transport
            .notify("notifications/initialized", None)
            .await?;
        Ok(result)
    }

    /// Every advertised tool, following pagination cursors.
    pub async fn list_tools(&self) -> Result<Vec<ToolInfo>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
            let page: ListToolsResult =
                parse_result("tools/list", self.transport.request("tools/list", params).await?)?;
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) if Some(&next) != cursor.as_ref() => cursor = Some(next),
                _ => break,
            }
        }
        Ok(tools)
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<CallToolResult> {
        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };
        let result = self
            .transport
            .request("tools/call", Some(serde_json::to_value(params)?))
            .await?;
        parse_result("tools/call", result)
    }
}

fn parse_result<T: serde::de::DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|e| McpError::ParseError {
        error: format!("{} result: {}", method, e),
        raw: value.to_string(),
    })
}

/// Tool executor backed by an external MCP tool server.
///
/// The catalog is fetched once at connect time and stays fixed for the
/// session.
pub struct McpToolExecutor {
    client: McpClient,
    spec: ToolSpec,
    server: Implementation,
    transport: Option<Arc<StdioTransport>>,
}

impl McpToolExecutor {
    /// Spawn the server process and connect to it.
    pub async fn spawn(command: &[String], timeout: Duration) -> Result<Self> {
        let transport = Arc::new(StdioTransport::spawn(command, timeout)?);
        let mut executor = Self::connect(transport.clone()).await?;
        executor.transport = Some(transport);
        Ok(executor)
    }

    /// Handshake and discover tools over an existing transport.
    pub async fn connect(transport: Arc<dyn McpTransport>) -> Result<Self> {
        let client = McpClient::new(transport);
        let init = client.initialize().await?;
        info!(
            "Connected to tool server {} {}",
            init.server_info.name, init.server_info.version
        );

        let mut spec = ToolSpec::new();
        for tool in client.list_tools().await? {
            let Some(definition) = JsonSchemaToolConverter::schema_to_tool(
                &tool.name,
                &tool.description,
                &tool.input_schema,
            ) else {
                warn!("Ignoring tool server entry without a name");
                continue;
            };
            if let Err(e) = spec.try_register(definition) {
                warn!("Ignoring tool {}: {}", tool.name, e);
            }
        }
        debug!(tools = spec.len(), "Discovered tools");

        Ok(Self {
            client,
            spec,
            server: init.server_info,
            transport: None,
        })
    }

    pub fn server_info(&self) -> &Implementation {
        &self.server
    }

    /// Kill the server process, if this executor spawned one.
    pub async fn shutdown(&self) -> Result<()> {
        match &self.transport {
            Some(transport) => transport.close().await,
            None => Ok(()),
        }
    }
}

/// Turn a `tools/call` result into an envelope.
///
/// A quill server puts the envelope JSON in the first text block; other
/// servers return free text, which is wrapped as `content`.
fn envelope_from_result(call: &ToolCall, result: &CallToolResult) -> ToolResultEnvelope {
    let text = result.text();
    if let Ok(envelope) = serde_json::from_str::<ToolResultEnvelope>(&text) {
        return envelope;
    }
    if result.is_error {
        ToolResultEnvelope::error(
            &call.tool_name,
            &call.tool_name,
            &ToolError::execution_failed(text),
        )
    } else {
        ToolResultEnvelope::ok(&call.tool_name, &call.tool_name).with_detail("content", text)
    }
}

#[async_trait]
impl ToolExecutorPort for McpToolExecutor {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResultEnvelope {
        let name = call.tool_name.as_str();
        if !self.spec.contains(name) {
            warn!(tool = %name, "Unknown tool requested");
            return ToolResultEnvelope::error(name, name, &ToolError::unknown_tool(name));
        }

        debug!(tool = %name, args = %call.arguments_json(), "Calling remote tool");
        match self.client.call_tool(name, call.arguments.clone()).await {
            Ok(result) => envelope_from_result(call, &result),
            Err(e) => {
                warn!(tool = %name, error = %e, "Remote tool call failed");
                ToolResultEnvelope::error(name, name, &e.to_tool_error())
            }
        }
    }
}
