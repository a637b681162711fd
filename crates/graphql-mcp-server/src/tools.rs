//! Tool synthesis and the registry of generated tools
//!
//! Each allowed root field turns into one [`GraphQLTool`] named
//! `{kind}-{field}`. The [`ToolRegistry`] owns the current set and swaps it
//! atomically when the schema changes.

mod document;
mod registry;
mod synthesize;

pub use document::default_document;
pub use registry::{ToolPolicy, ToolRegistry, ToolSet};
pub use synthesize::{
    GraphQLTool, QUERY_PARAMETER, SynthesisOptions, VARIABLES_PARAMETER, synthesize,
};
