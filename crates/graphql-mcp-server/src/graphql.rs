//! Execute GraphQL operations against the configured endpoint

use apollo_compiler::ast::{Definition, OperationType};
use apollo_compiler::parser::Parser;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::errors::{ExecutionError, SafeWithErrors};

/// Sends GraphQL requests to a single endpoint
#[derive(Debug, Clone)]
pub struct Gateway {
    client: reqwest::Client,
    endpoint: Url,
    headers: HeaderMap,
    allow_mutations: bool,
}

impl Gateway {
    pub fn new(endpoint: Url, headers: &HeaderMap, allow_mutations: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            headers: json_headers(headers),
            allow_mutations,
        }
    }

    /// Check and send a document.
    ///
    /// The document is classified before anything goes over the wire, so
    /// malformed or forbidden operations never reach the endpoint. A 2xx
    /// response with a non-empty `errors` array is still an error; its body is
    /// returned untouched inside [`ExecutionError::GraphQLResponse`].
    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint))]
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<&Value>,
    ) -> Result<Value, ExecutionError> {
        classify(query, self.allow_mutations)?;

        let mut request_body = Map::new();
        request_body.insert("query".to_string(), Value::String(query.to_string()));
        if let Some(variables) = variables.filter(|variables| !variables.is_null()) {
            request_body.insert("variables".to_string(), variables.clone());
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutionError::Transport { status, body });
        }

        let body = response.json::<Value>().await?;
        let has_errors = body
            .get("errors")
            .and_then(Value::as_array)
            .is_some_and(|errors| !errors.is_empty());
        if has_errors {
            debug!("GraphQL response contained errors");
            return Err(ExecutionError::GraphQLResponse(body));
        }

        Ok(body)
    }
}

/// Parse a document and reject what this server refuses to run
pub fn classify(query: &str, allow_mutations: bool) -> Result<(), ExecutionError> {
    let document = Parser::new()
        .parse_ast(query, "operation.graphql")
        .map_err(|errors| ExecutionError::QuerySyntax(SafeWithErrors(&errors).to_string()))?;

    let mut operation_types = document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::OperationDefinition(operation) => Some(operation.operation_type),
            _ => None,
        })
        .peekable();

    if operation_types.peek().is_none() {
        return Err(ExecutionError::QuerySyntax(
            "document does not contain an operation".to_string(),
        ));
    }

    for operation_type in operation_types {
        match operation_type {
            OperationType::Query => {}
            OperationType::Mutation if allow_mutations => {}
            OperationType::Mutation => return Err(ExecutionError::MutationsDisabled),
            OperationType::Subscription => return Err(ExecutionError::SubscriptionsUnsupported),
        }
    }

    Ok(())
}

/// The configured headers with a JSON content type underneath them
pub(crate) fn json_headers(headers: &HeaderMap) -> HeaderMap {
    let mut merged = HeaderMap::new();
    merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    merged.extend(headers.clone());
    merged
}
