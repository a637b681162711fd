//! Expose a GraphQL API to MCP clients as one tool per root field

pub mod errors;
pub mod graphql;
mod introspection;
pub(crate) mod json_schema;
pub mod minify;
pub mod operations;
pub mod schema_source;
pub mod schema_walker;
pub mod server;
pub mod tools;
