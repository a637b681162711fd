use apollo_compiler::Schema;
use apollo_compiler::ast::OperationType;
use rmcp::model::{CallToolResult, Content, Tool};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::minify::MinifyExt as _;
use crate::schema_from_type;

/// The name of the tool to get GraphQL schema type information
pub const INTROSPECT_TOOL_NAME: &str = "introspect";

/// A tool to get the GraphQL schema, or details about one of its types.
#[derive(Debug, Clone)]
pub struct Introspect {
    allow_mutations: bool,
    pub tool: Tool,
}

/// Input for the introspect tool.
#[derive(Debug, JsonSchema, Deserialize)]
pub struct Input {
    /// The name of the type to get information about. Omit it to get the whole schema.
    #[serde(default)]
    type_name: Option<String>,
}

impl Introspect {
    pub fn new(allow_mutations: bool) -> Self {
        Self {
            allow_mutations,
            tool: Tool::new(
                INTROSPECT_TOOL_NAME,
                "Get GraphQL type information;T=type,I=input,E=enum,U=union,F=interface;s=String,i=Int,f=Float,b=Boolean,d=ID;!=required,[]=list;",
                schema_from_type!(Input),
            ),
        }
    }

    pub fn execute(&self, schema: &Schema, input: Input) -> CallToolResult {
        let Some(type_name) = input.type_name else {
            return CallToolResult::success(vec![Content::text(self.visible_sdl(schema))]);
        };

        let hidden = !self.allow_mutations
            && schema
                .root_operation(OperationType::Mutation)
                .is_some_and(|root_name| root_name.as_str() == type_name);

        match schema.types.get(type_name.as_str()) {
            Some(extended_type) if !hidden => {
                CallToolResult::success(vec![Content::text(extended_type.minify())])
            }
            _ => CallToolResult::error(vec![Content::text(format!(
                "Type {type_name} not found in the schema"
            ))]),
        }
    }

    /// The schema as SDL, without the mutation root unless mutations are allowed
    fn visible_sdl(&self, schema: &Schema) -> String {
        match schema.root_operation(OperationType::Mutation) {
            Some(root_name) if !self.allow_mutations => {
                let mut visible = schema.clone();
                visible.types.shift_remove(root_name.as_str());
                visible.schema_definition.make_mut().mutation = None;
                visible.to_string()
            }
            _ => schema.to_string(),
        }
    }
}
