use std::sync::Arc;
use std::time::Duration;

use bon::bon;
use reqwest::header::HeaderMap;
use rmcp::{ServiceExt as _, transport::stdio};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use url::Url;

use crate::errors::ServerError;
use crate::graphql::Gateway;
use crate::introspection::{Execute, Introspect};
use crate::schema_source::SchemaSource;
use crate::tools::{ToolPolicy, ToolRegistry};

mod running;

use running::Running;

/// A GraphQL MCP Server
pub struct Server {
    schema_source: SchemaSource,
    endpoint: Url,
    headers: HeaderMap,
    policy: ToolPolicy,
    execute_introspection: bool,
    introspect_introspection: bool,
    reload_interval: Option<Duration>,
}

#[bon]
impl Server {
    #[builder]
    pub fn new(
        schema_source: SchemaSource,
        endpoint: Url,
        headers: HeaderMap,
        policy: ToolPolicy,
        execute_introspection: bool,
        introspect_introspection: bool,
        reload_interval: Option<Duration>,
    ) -> Self {
        Self {
            schema_source,
            endpoint,
            headers,
            policy,
            execute_introspection,
            introspect_introspection,
            reload_interval,
        }
    }

    /// Load the schema, then serve MCP over stdio until the client disconnects
    pub async fn start(self) -> Result<(), ServerError> {
        let schema = self.schema_source.load().await?;
        debug!("Loaded schema:\n{}", schema);

        let allow_mutations = self.policy.allow_mutations;
        let registry = ToolRegistry::build(self.policy, schema)?;

        let running = Running {
            registry: Arc::new(registry),
            schema_source: self.schema_source,
            gateway: Gateway::new(self.endpoint, &self.headers, allow_mutations),
            execute_tool: self
                .execute_introspection
                .then(|| Execute::new(allow_mutations)),
            introspect_tool: self
                .introspect_introspection
                .then(|| Introspect::new(allow_mutations)),
            peers: Arc::new(RwLock::new(vec![])),
            cancellation_token: CancellationToken::new(),
        };

        let reload_task = self
            .reload_interval
            .map(|interval| running.spawn_reload(interval));

        info!("Starting MCP server in stdio mode");
        let service = running
            .clone()
            .serve(stdio())
            .await
            .inspect_err(|e| {
                error!("serving error: {:?}", e);
            })
            .map_err(Box::new)?;
        service.waiting().await.map_err(ServerError::Startup)?;

        running.cancellation_token.cancel();
        if let Some(reload_task) = reload_task {
            reload_task.await?;
        }

        Ok(())
    }
}
