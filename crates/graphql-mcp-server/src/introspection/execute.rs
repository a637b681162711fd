use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::ExecutionError;
use crate::graphql::Gateway;
use crate::schema_from_type;

/// The name of the tool to execute an ad hoc GraphQL operation
pub const EXECUTE_TOOL_NAME: &str = "execute";

#[derive(Debug, Clone)]
pub struct Execute {
    pub tool: Tool,
}

/// Input for the execute tool.
#[derive(Debug, JsonSchema, Deserialize)]
pub struct Input {
    /// The GraphQL operation
    query: String,

    /// The variable values, as a JSON object or a JSON-encoded string
    #[serde(default)]
    variables: Option<Value>,
}

impl Input {
    fn variables(&self) -> Result<Option<Value>, ExecutionError> {
        match &self.variables {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => serde_json::from_str(s)
                .map(Some)
                .map_err(|e| ExecutionError::InvalidInput(format!("Invalid variables: {e}"))),
            Some(object @ Value::Object(_)) => Ok(Some(object.clone())),
            Some(_) => Err(ExecutionError::InvalidInput(
                "Variables must be a JSON object or string".into(),
            )),
        }
    }
}

impl Execute {
    pub fn new(allow_mutations: bool) -> Self {
        let mutations = if allow_mutations {
            "Queries and mutations are allowed."
        } else {
            "Only queries are allowed."
        };
        Self {
            tool: Tool::new(
                EXECUTE_TOOL_NAME,
                format!(
                    "Execute a GraphQL operation. Use the `introspect` tool to get information about the GraphQL schema. Always use the schema to create operations - do not try arbitrary operations. DO NOT try to execute introspection queries. {mutations}"
                ),
                schema_from_type!(Input),
            ),
        }
    }

    /// Run the caller's document through the gateway
    #[tracing::instrument(skip_all)]
    pub async fn execute(
        &self,
        gateway: &Gateway,
        arguments: Value,
    ) -> Result<Value, ExecutionError> {
        let input = serde_json::from_value::<Input>(arguments)
            .map_err(|e| ExecutionError::InvalidInput(e.to_string()))?;
        let variables = input.variables()?;
        gateway.execute(&input.query, variables.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderMap;
    use serde_json::json;
    use url::Url;

    use super::*;

    fn input(value: Value) -> Input {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn variables_as_string() {
        let variables = json!({ "id": "123" });

        let input = input(json!({
            "query": "query GetUser($id: ID!) { user(id: $id) { id name } }",
            "variables": variables.to_string()
        }));

        assert_eq!(input.variables().unwrap(), Some(variables));
    }

    #[test]
    fn variables_as_json() {
        let variables = json!({ "id": "123" });

        let input = input(json!({
            "query": "query GetUser($id: ID!) { user(id: $id) { id name } }",
            "variables": variables
        }));

        assert_eq!(input.variables().unwrap(), Some(variables));
    }

    #[test]
    fn without_variables() {
        let input = input(json!({ "query": "{ a }" }));

        assert_eq!(input.variables().unwrap(), None);
    }

    #[test]
    fn invalid_variables() {
        let garbage = input(json!({ "query": "{ a }", "variables": "garbage" }));
        let number = input(json!({ "query": "{ a }", "variables": 4 }));

        assert!(matches!(
            garbage.variables(),
            Err(ExecutionError::InvalidInput(msg)) if msg.starts_with("Invalid variables")
        ));
        assert!(matches!(
            number.variables(),
            Err(ExecutionError::InvalidInput(msg)) if msg == "Variables must be a JSON object or string"
        ));
    }

    #[test]
    fn input_schema_accepts_object_or_string_variables() {
        let execute = Execute::new(false);

        let schema = Value::Object((*execute.tool.input_schema).clone());

        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["query"]["type"], json!("string"));
        assert!(schema["properties"]["variables"].get("type").is_none());
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").expect(0).create_async().await;
        let gateway = Gateway::new(Url::parse(&server.url()).unwrap(), &HeaderMap::new(), false);

        let result = Execute::new(false)
            .execute(&gateway, json!({ "nonsense": "whatever" }))
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ExecutionError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn executes_through_the_gateway() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::Json(json!({
                "query": "query GetUser($id: ID!) { user(id: $id) { id } }",
                "variables": {"id": "7"}
            })))
            .with_status(200)
            .with_body(r#"{"data": {"user": {"id": "7"}}}"#)
            .create_async()
            .await;
        let gateway = Gateway::new(Url::parse(&server.url()).unwrap(), &HeaderMap::new(), false);

        let result = Execute::new(false)
            .execute(
                &gateway,
                json!({
                    "query": "query GetUser($id: ID!) { user(id: $id) { id } }",
                    "variables": "{\"id\": \"7\"}"
                }),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!({"data": {"user": {"id": "7"}}}));
    }
}
