use std::fmt;
use std::path::PathBuf;

use apollo_compiler::validation::WithErrors;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::task::JoinError;

use crate::operations::OperationKind;

/// A wrapper around WithErrors that provides safe UTF-8 formatting
/// This avoids the ariadne UTF-8 multibyte character bug
pub(crate) struct SafeWithErrors<'a, T>(pub(crate) &'a WithErrors<T>);

impl<T> fmt::Display for SafeWithErrors<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Extract error messages without using ariadne's Display implementation
        let errors = &self.0.errors;

        if errors.is_empty() {
            return write!(f, "Unknown error");
        }

        writeln!(f, "GraphQL validation errors:")?;
        for (i, diagnostic) in errors.iter().enumerate() {
            write!(f, "  {}. {}", i + 1, diagnostic.error)?;
            writeln!(f)?;
        }

        Ok(())
    }
}

/// An error while loading the GraphQL schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Introspection request failed with status {status}: {body}")]
    Transport { status: StatusCode, body: String },

    #[error("Introspection request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid introspection response: {0}")]
    Introspection(String),

    #[error("Could not parse GraphQL schema: {}", SafeWithErrors(.0.as_ref()))]
    Parse(Box<WithErrors<apollo_compiler::Schema>>),

    #[error("Could not read schema file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An error while synthesizing tools from a schema
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Extraction only produces named root fields, so this indicates a bug
    #[error("Found a {kind} operation without a name")]
    UnnamedOperation { kind: OperationKind },
}

/// An error while executing a GraphQL request against the endpoint
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Could not parse GraphQL operation: {0}")]
    QuerySyntax(String),

    #[error("Mutations are not allowed by this server")]
    MutationsDisabled,

    #[error("Subscriptions are not supported")]
    SubscriptionsUnsupported,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("GraphQL request failed with status {status}: {body}")]
    Transport { status: StatusCode, body: String },

    #[error("GraphQL request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request executed but the response carries a non-empty `errors` array
    #[error("GraphQL response contained errors: {0}")]
    GraphQLResponse(Value),
}

/// An error in server initialization
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to build tools: {0}")]
    Tool(#[from] ToolError),

    #[error("Failed to initialize MCP server: {0}")]
    McpInitialize(#[from] Box<rmcp::service::ServerInitializeError>),

    #[error("Failed to start server: {0}")]
    Startup(#[from] JoinError),
}

/// An MCP tool error
pub type McpError = rmcp::model::ErrorData;
