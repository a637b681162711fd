//! Schema loading
//!
//! A schema comes either from live introspection of the GraphQL endpoint or
//! from a static SDL file on disk.

mod introspection;

pub use introspection::INTROSPECTION_QUERY;

use std::path::{Path, PathBuf};

use apollo_compiler::Schema;
use apollo_compiler::validation::Valid;
use reqwest::header::HeaderMap;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::errors::SchemaError;
use crate::graphql::json_headers;
use introspection::IntrospectionResponse;

/// Where to load the GraphQL schema from
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Introspect the live endpoint
    Endpoint { url: Url, headers: HeaderMap },

    /// Read SDL from a local file
    File(PathBuf),
}

impl SchemaSource {
    /// Load the schema from whichever source is configured
    pub async fn load(&self) -> Result<Valid<Schema>, SchemaError> {
        match self {
            SchemaSource::Endpoint { url, headers } => load_from_endpoint(url, headers).await,
            SchemaSource::File(path) => load_from_file(path),
        }
    }
}

/// Fetch the schema of a live endpoint through the standard introspection query
#[tracing::instrument(skip_all, fields(%url))]
pub async fn load_from_endpoint(
    url: &Url,
    headers: &HeaderMap,
) -> Result<Valid<Schema>, SchemaError> {
    let response = reqwest::Client::new()
        .post(url.clone())
        .headers(json_headers(headers))
        .json(&json!({
            "query": INTROSPECTION_QUERY,
            "operationName": "IntrospectionQuery",
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SchemaError::Transport { status, body });
    }

    let body = response.text().await?;
    debug!(bytes = body.len(), "Received introspection response");
    serde_json::from_str::<IntrospectionResponse>(&body)
        .map_err(|e| SchemaError::Introspection(format!("malformed response body: {e}")))?
        .into_schema()
}

/// Read and validate a schema from an SDL file
#[tracing::instrument]
pub fn load_from_file(path: &Path) -> Result<Valid<Schema>, SchemaError> {
    let sdl = std::fs::read_to_string(path).map_err(|source| SchemaError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    Schema::parse_and_validate(sdl, path).map_err(|errors| SchemaError::Parse(Box::new(errors)))
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use reqwest::header::{AUTHORIZATION, HeaderValue};
    use serde_json::Value;

    use super::*;

    const SDL: &str = r#"
        type Query { user(id: ID!): User }
        type User { id: ID! name: String }
    "#;

    fn introspection_body() -> Value {
        json!({
            "data": {
                "__schema": {
                    "queryType": {"name": "Query"},
                    "mutationType": null,
                    "subscriptionType": null,
                    "types": [{
                        "kind": "OBJECT",
                        "name": "Query",
                        "description": null,
                        "fields": [{
                            "name": "hello",
                            "description": null,
                            "args": [],
                            "type": {"kind": "SCALAR", "name": "String", "ofType": null},
                            "isDeprecated": false,
                            "deprecationReason": null
                        }],
                        "inputFields": null,
                        "interfaces": [],
                        "enumValues": null,
                        "possibleTypes": null
                    }]
                }
            }
        })
    }

    #[tokio::test]
    async fn introspects_the_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("content-type", "application/json")
            .match_header("authorization", "Bearer secret")
            .match_body(mockito::Matcher::PartialJson(
                json!({"operationName": "IntrospectionQuery"}),
            ))
            .with_status(200)
            .with_body(introspection_body().to_string())
            .create_async()
            .await;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        let url = Url::parse(&format!("{}/graphql", server.url())).unwrap();

        let schema = SchemaSource::Endpoint { url, headers }.load().await.unwrap();

        mock.assert_async().await;
        assert!(schema.get_object("Query").unwrap().fields.contains_key("hello"));
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(503)
            .with_body("try later")
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap();
        let error = load_from_endpoint(&url, &HeaderMap::new())
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Introspection request failed with status 503 Service Unavailable: try later"
        );
    }

    #[tokio::test]
    async fn non_json_body_is_an_introspection_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("<html>not graphql</html>")
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap();
        let error = load_from_endpoint(&url, &HeaderMap::new())
            .await
            .unwrap_err();

        assert!(matches!(error, SchemaError::Introspection(_)));
    }

    #[test]
    fn loads_sdl_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file("schema.graphql", SDL)?;

            let schema = load_from_file(Path::new("schema.graphql")).unwrap();

            assert!(schema.get_object("User").is_some());
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_a_read_error() {
        Jail::expect_with(|_| {
            let error = load_from_file(Path::new("missing.graphql")).unwrap_err();

            assert!(matches!(
                error,
                SchemaError::ReadFile { ref path, .. } if path == Path::new("missing.graphql")
            ));
            Ok(())
        });
    }

    #[test]
    fn malformed_sdl_is_a_parse_error() {
        Jail::expect_with(|jail| {
            jail.create_file("schema.graphql", "type Query { user(: User }")?;

            let error = load_from_file(Path::new("schema.graphql")).unwrap_err();

            assert!(matches!(error, SchemaError::Parse(_)));
            Ok(())
        });
    }
}
