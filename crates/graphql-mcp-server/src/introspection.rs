//! Built-in MCP tools that let an AI agent introspect the GraphQL schema and
//! execute ad hoc operations.

pub mod execute;
pub mod introspect;

pub use execute::{EXECUTE_TOOL_NAME, Execute};
pub use introspect::{INTROSPECT_TOOL_NAME, Introspect};
