use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use graphql_mcp_server::schema_source::SchemaSource;
use graphql_mcp_server::tools::ToolPolicy;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use url::Url;

use super::logging::Logging;

/// Configuration for the MCP server
#[derive(Debug, Deserialize)]
pub struct Config {
    /// The target GraphQL endpoint
    #[serde(default = "defaults::endpoint")]
    pub endpoint: Url,

    /// A local SDL file to read the schema from instead of introspecting the endpoint
    #[serde(default)]
    pub schema: Option<PathBuf>,

    /// List of hard-coded headers to include in all GraphQL requests
    #[serde(default, deserialize_with = "parsers::map_from_str")]
    pub headers: HeaderMap,

    /// Expose mutation tools and accept mutation documents
    #[serde(default)]
    pub allow_mutations: bool,

    /// Query root fields that never become tools
    #[serde(default)]
    pub exclude_queries: HashSet<String>,

    /// Mutation root fields that never become tools
    #[serde(default)]
    pub exclude_mutations: HashSet<String>,

    /// Built-in tools
    #[serde(default)]
    pub introspection: Introspection,

    /// Overrides for server behaviour
    #[serde(default)]
    pub overrides: Overrides,

    /// How often to reload the schema and rebuild the tools
    #[serde(default, with = "humantime_serde")]
    pub reload_interval: Option<Duration>,

    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,
}

/// Built-in tool configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Introspection {
    /// The ad hoc `execute` tool
    pub execute: ToolConfig,

    /// The `introspect` tool
    pub introspect: ToolConfig,
}

#[derive(Debug, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
        }
    }
}

/// Overridable flags
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Overrides {
    /// Disable type descriptions to save on context-window space
    pub disable_type_description: bool,
}

impl Config {
    /// A schema file wins over introspection of the endpoint
    pub fn schema_source(&self) -> SchemaSource {
        match &self.schema {
            Some(path) => SchemaSource::File(path.clone()),
            None => SchemaSource::Endpoint {
                url: self.endpoint.clone(),
                headers: self.headers.clone(),
            },
        }
    }

    pub fn tool_policy(&self) -> ToolPolicy {
        ToolPolicy {
            allow_mutations: self.allow_mutations,
            exclude_queries: self.exclude_queries.clone(),
            exclude_mutations: self.exclude_mutations.clone(),
            disable_type_description: self.overrides.disable_type_description,
        }
    }
}

mod defaults {
    use url::Url;

    pub(super) fn endpoint() -> Url {
        #[allow(clippy::unwrap_used)]
        Url::parse("http://127.0.0.1:4000/graphql").unwrap()
    }

    pub(super) const fn enabled() -> bool {
        true
    }
}

mod parsers {
    use std::str::FromStr;

    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
    use serde::Deserializer;

    pub(super) fn map_from_str<'de, D>(deserializer: D) -> Result<HeaderMap, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MapFromStrVisitor;
        impl<'de> serde::de::Visitor<'de> for MapFromStrVisitor {
            type Value = HeaderMap;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a map of header string keys and values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut parsed = HeaderMap::with_capacity(map.size_hint().unwrap_or(0));

                while let Some((key, value)) = map.next_entry::<String, String>()? {
                    let key = HeaderName::from_str(&key)
                        .map_err(|e| serde::de::Error::custom(e.to_string()))?;
                    let value = HeaderValue::from_str(&value)
                        .map_err(|e| serde::de::Error::custom(e.to_string()))?;

                    parsed.insert(key, value);
                }

                Ok(parsed)
            }
        }

        deserializer.deserialize_map(MapFromStrVisitor)
    }
}
