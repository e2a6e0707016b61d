//! MCP server handler (stdio transport): the thin layer that turns an
//! `rmcp` tool call into a [`Dispatcher::dispatch`] call and a call back
//! into `CallToolResult`. Grounded on the `codex-dashflow` MCP server's
//! `tool_handler.rs`/`server.rs` pair — a manual `ServerHandler` impl rather
//! than the `#[tool_router]` macro, since our tool set is data-driven from
//! `catalog::TOOLS` rather than one method per tool.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::ErrorData as McpError;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use serde_json::{Value, json};

use crate::catalog;
use crate::dispatch::Dispatcher;
use crate::progress::ProgressEmitter;

/// Logs every progress record at debug level and nothing else. A deployment
/// that wants to forward progress to an MCP client's progress token would
/// replace this with an emitter that calls `Peer::notify_progress`; doing
/// that generically here would require threading a progress token through
/// every tool call, which the spec doesn't ask for.
struct LoggingProgress {
    tool_name: String,
}

impl ProgressEmitter for LoggingProgress {
    fn emit(&self, stage: &str, fraction: f32, message: &str) {
        log::debug!("{}: stage={stage} fraction={fraction:.2} {message}", self.tool_name);
    }

    fn emit_detailed(&self, record: crate::progress::ProgressRecord) {
        log::debug!("{}: {record:?}", self.tool_name);
    }

    fn close(&self) {
        log::debug!("{}: done", self.tool_name);
    }
}

/// Converts a catalog entry into the `rmcp` wire-level `Tool` description
/// `list_tools` returns to the host.
fn to_rmcp_tool(tool: &catalog::ToolConfig) -> Tool {
    let schema = tool.build_schema();
    let schema_obj = match schema {
        Value::Object(map) => map,
        other => {
            log::warn!("tool '{}' schema did not serialize to an object: {other}", tool.name);
            serde_json::Map::new()
        }
    };
    Tool::new(Cow::Owned(tool.name.to_string()), Cow::Owned(tool.description.to_string()), Arc::new(schema_obj))
}

/// The MCP `ServerHandler`: wraps a [`Dispatcher`] and exposes the static
/// catalog as `list_tools`, routing every `call_tool` through
/// `Dispatcher::dispatch`. Holds only an `Arc`, so cloning (which `rmcp`
/// does per connection) is cheap and shares all session state.
#[derive(Clone)]
pub struct McpToolServer {
    dispatcher: Arc<Dispatcher>,
}

impl McpToolServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        McpToolServer { dispatcher }
    }
}

impl ServerHandler for McpToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().enable_tool_list_changed().build(),
            server_info: Implementation {
                name: "syncable-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Containerization and deployment workflow tools. Start with 'start_workflow', \
                 then follow each response's chain_hint through analyze_repository, \
                 generate_dockerfile, apply_dockerfile, build_image, scan_image, tag_image, \
                 push_image, generate_k8s_manifests, apply_k8s_manifests, prepare_cluster, \
                 deploy_application, and verify_deployment."
                    .to_string(),
            ),
            ..ServerInfo::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move {
            let tools = catalog::TOOLS.iter().map(to_rmcp_tool).collect();
            Ok(ListToolsResult { tools, next_cursor: None })
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.as_ref();
        let args = match request.arguments {
            Some(map) => Value::Object(map.into_iter().collect()),
            None => json!({}),
        };

        log::info!("call_tool: {name}");
        let progress = LoggingProgress { tool_name: name.to_string() };
        let output = self.dispatcher.dispatch(name, args, &progress).await;

        let structured = serde_json::to_value(&output).unwrap_or(Value::Null);
        let text = serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string());

        Ok(CallToolResult {
            content: vec![Content::text(text)],
            structured_content: Some(structured),
            is_error: Some(!output.success),
            meta: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_tool_converts_to_an_rmcp_tool() {
        for tool in catalog::TOOLS {
            let converted = to_rmcp_tool(tool);
            assert_eq!(converted.name.as_ref(), tool.name);
        }
    }
}
