//! Input type translation
//!
//! The types in this module re-express GraphQL input types as [`SchemaNode`]
//! trees by walking the types recursively, and project those trees into JSON
//! Schema for MCP clients.

mod input;
mod node;

pub use input::{DEFAULT_DEPTH, map_input_type, value_to_json};
pub use node::{ObjectField, SchemaNode};
