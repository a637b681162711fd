use std::sync::Arc;
use std::time::Duration;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorCode, Implementation,
    InitializeRequestParam, InitializeResult, JsonObject, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo, Tool, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{Peer, RoleServer, ServerHandler, ServiceError};
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::errors::{ExecutionError, McpError, ServerError};
use crate::graphql::Gateway;
use crate::introspection::{EXECUTE_TOOL_NAME, Execute, INTROSPECT_TOOL_NAME, Introspect};
use crate::schema_source::SchemaSource;
use crate::tools::{GraphQLTool, QUERY_PARAMETER, ToolRegistry, ToolSet, VARIABLES_PARAMETER};

#[derive(Clone)]
pub(super) struct Running {
    pub(super) registry: Arc<ToolRegistry>,
    pub(super) schema_source: SchemaSource,
    pub(super) gateway: Gateway,
    pub(super) execute_tool: Option<Execute>,
    pub(super) introspect_tool: Option<Introspect>,
    pub(super) peers: Arc<RwLock<Vec<Peer<RoleServer>>>>,
    pub(super) cancellation_token: CancellationToken,
}

impl Running {
    /// Load the schema again and replace every generated tool.
    ///
    /// On failure the current tools stay in place and peers are not notified.
    #[tracing::instrument(skip_all)]
    pub(super) async fn reload(&self) -> Result<Arc<ToolSet>, ServerError> {
        let schema = self.schema_source.load().await?;
        debug!("Schema reloaded:\n{}", schema);

        let tool_set = self.registry.reload(schema)?;

        // Notify MCP clients that tools have changed
        Self::notify_tool_list_changed(self.peers.clone()).await;

        Ok(tool_set)
    }

    /// Periodically reload until the cancellation token fires
    pub(super) fn spawn_reload(&self, interval: Duration) -> JoinHandle<()> {
        let running = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately and the schema was just loaded
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = running.cancellation_token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = running.reload().await {
                            error!("Failed to reload schema, keeping current tools: {e}");
                        }
                    }
                }
            }
            debug!("Stopped schema reloading");
        })
    }

    /// Notify any peers that tools have changed. Drops unreachable peers from the list.
    #[tracing::instrument(skip_all)]
    async fn notify_tool_list_changed(peers: Arc<RwLock<Vec<Peer<RoleServer>>>>) {
        let mut peers = peers.write().await;
        if !peers.is_empty() {
            debug!("Tools changed, notifying {} peers of tool change", peers.len());
        }
        let mut retained_peers = Vec::new();
        for peer in peers.iter() {
            if !peer.is_transport_closed() {
                match peer.notify_tool_list_changed().await {
                    Ok(_) => retained_peers.push(peer.clone()),
                    Err(ServiceError::TransportSend(_) | ServiceError::TransportClosed) => {
                        error!("Failed to notify peer of tool list change - dropping peer");
                    }
                    Err(e) => {
                        error!("Failed to notify peer of tool list change {:?}", e);
                        retained_peers.push(peer.clone());
                    }
                }
            }
        }
        *peers = retained_peers;
    }

    fn list_tools_impl(&self) -> ListToolsResult {
        ListToolsResult {
            next_cursor: None,
            tools: self
                .registry
                .snapshot()
                .tools()
                .iter()
                .map(|tool| tool.tool.clone())
                .chain(self.execute_tool.as_ref().iter().map(|e| e.tool.clone()))
                .chain(self.introspect_tool.as_ref().iter().map(|e| e.tool.clone()))
                .collect(),
        }
    }

    async fn call_tool_impl(
        &self,
        tool_name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = Value::Object(arguments.unwrap_or_default());

        if tool_name == INTROSPECT_TOOL_NAME
            && let Some(introspect_tool) = &self.introspect_tool
        {
            if let Some(result) = reject_invalid_arguments(&introspect_tool.tool, &arguments) {
                return Ok(result);
            }
            match serde_json::from_value(arguments) {
                Ok(input) => Ok(introspect_tool.execute(self.registry.snapshot().schema(), input)),
                Err(e) => Ok(into_call_tool_result(Err(ExecutionError::InvalidInput(
                    e.to_string(),
                )))),
            }
        } else if tool_name == EXECUTE_TOOL_NAME
            && let Some(execute_tool) = &self.execute_tool
        {
            if let Some(result) = reject_invalid_arguments(&execute_tool.tool, &arguments) {
                return Ok(result);
            }
            Ok(into_call_tool_result(
                execute_tool.execute(&self.gateway, arguments).await,
            ))
        } else if let Some(tool) = self.registry.lookup(tool_name) {
            Ok(self.execute_generated(&tool, arguments).await)
        } else {
            Err(tool_not_found(tool_name))
        }
    }

    /// Run a generated tool with its default document unless the caller sent one
    #[tracing::instrument(skip_all, fields(tool = %tool.name, kind = %tool.kind))]
    async fn execute_generated(&self, tool: &GraphQLTool, arguments: Value) -> CallToolResult {
        if let Some(result) = reject_invalid_arguments(&tool.tool, &arguments) {
            return result;
        }

        let query = arguments
            .get(QUERY_PARAMETER)
            .and_then(Value::as_str)
            .unwrap_or(&tool.document);
        let variables = arguments.get(VARIABLES_PARAMETER);

        into_call_tool_result(self.gateway.execute(query, variables).await)
    }
}

impl ServerHandler for Running {
    #[tracing::instrument(
        skip_all,
        fields(
            client_name = request.client_info.name,
            client_version = request.client_info.version
        )
    )]
    async fn initialize(
        &self,
        request: InitializeRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        debug!("Client connected");
        let mut peers = self.peers.write().await;
        peers.push(context.peer);
        Ok(self.get_info())
    }

    #[tracing::instrument(
        skip_all,
        fields(tool_name = request.name.as_ref(), request_id = %context.id.clone())
    )]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call_tool_impl(&request.name, request.arguments).await
    }

    #[tracing::instrument(skip_all)]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(self.list_tools_impl())
    }

    fn get_info(&self) -> ServerInfo {
        let capabilities = ServerCapabilities {
            tools: Some(ToolsCapability {
                list_changed: Some(true),
            }),
            ..Default::default()
        };

        ServerInfo {
            server_info: Implementation {
                name: "GraphQL MCP Server".to_string(),
                icons: None,
                title: Some("GraphQL MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
            },
            capabilities,
            ..Default::default()
        }
    }
}

/// Check arguments against the tool's input schema.
///
/// Produces an error result listing every violation.
fn reject_invalid_arguments(tool: &Tool, arguments: &Value) -> Option<CallToolResult> {
    let schema = Value::Object((*tool.input_schema).clone());
    let validator = match jsonschema::validator_for(&schema) {
        Ok(validator) => validator,
        Err(e) => {
            warn!(
                tool = %tool.name,
                "Skipping argument validation, input schema does not compile: {e}"
            );
            return None;
        }
    };

    let violations: Vec<String> = validator
        .iter_errors(arguments)
        .map(|error| error.to_string())
        .collect();

    if violations.is_empty() {
        None
    } else {
        info!(tool = %tool.name, count = violations.len(), "Rejected invalid tool arguments");
        Some(CallToolResult::error(vec![Content::text(format!(
            "Invalid arguments for tool {}:\n{}",
            tool.name,
            violations.join("\n")
        ))]))
    }
}

fn into_call_tool_result(result: Result<Value, ExecutionError>) -> CallToolResult {
    match result {
        Ok(body) => match Content::json(body) {
            Ok(content) => CallToolResult::success(vec![content]),
            Err(e) => CallToolResult::error(vec![Content::text(e.message.to_string())]),
        },
        // Keep the GraphQL errors verbatim so the caller can act on them
        Err(ExecutionError::GraphQLResponse(body)) => {
            CallToolResult::error(vec![Content::text(body.to_string())])
        }
        Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
    }
}

fn tool_not_found(name: &str) -> McpError {
    McpError::new(
        ErrorCode::METHOD_NOT_FOUND,
        format!("Tool {name} not found"),
        None,
    )
}
