use apollo_compiler::Schema;
use apollo_compiler::ast::Type;
use apollo_compiler::schema::ExtendedType;
use rmcp::model::{Tool, ToolAnnotations};
use tracing::info;

use super::document::default_document;
use crate::errors::ToolError;
use crate::json_schema::into_json_object;
use crate::minify::minify_named_type;
use crate::operations::{OperationDescriptor, OperationKind};
use crate::schema_walker::{DEFAULT_DEPTH, ObjectField, SchemaNode, map_input_type, value_to_json};

/// The parameter slot holding a caller-supplied document
pub const QUERY_PARAMETER: &str = "query";

/// The parameter slot holding the operation's variables
pub const VARIABLES_PARAMETER: &str = "variables";

/// Knobs that change how tools are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Leave the return type shape out of tool descriptions
    pub disable_type_description: bool,
}

/// A root field of the schema, exposed as an MCP tool
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLTool {
    pub name: String,
    pub kind: OperationKind,
    pub operation_name: String,
    pub parameters: SchemaNode,
    pub document: String,
    pub tool: Tool,
}

impl GraphQLTool {
    pub fn description(&self) -> &str {
        self.tool.description.as_deref().unwrap_or_default()
    }

    /// The node describing the `variables` slot
    pub fn variables(&self) -> Option<&SchemaNode> {
        self.parameters
            .field(VARIABLES_PARAMETER)
            .map(|field| &field.node)
    }
}

/// Turn one operation into a tool. Pure: reads the schema, performs no I/O.
pub fn synthesize(
    operation: &OperationDescriptor,
    schema: &Schema,
    options: SynthesisOptions,
) -> Result<GraphQLTool, ToolError> {
    if operation.name.is_empty() {
        return Err(ToolError::UnnamedOperation {
            kind: operation.kind,
        });
    }

    let name = format!("{}-{}", operation.kind, operation.name);
    let parameters = parameters(operation, schema);
    let description = tool_description(operation, schema, options);
    let document = default_document(operation, schema);

    let tool = Tool::new(
        name.clone(),
        description,
        into_json_object(parameters.to_json_schema()),
    )
    .annotate(ToolAnnotations::new().read_only(operation.kind == OperationKind::Query));

    match tool_character_length(&tool) {
        Ok(length) => info!(
            "Tool {} loaded with a character count of {}. Estimated tokens: {}",
            name,
            length,
            length / 4
        ),
        Err(_) => info!("Tool {} loaded with an unknown character count", name),
    }

    Ok(GraphQLTool {
        name,
        kind: operation.kind,
        operation_name: operation.name.clone(),
        parameters,
        document,
        tool,
    })
}

fn parameters(operation: &OperationDescriptor, schema: &Schema) -> SchemaNode {
    let arguments: Vec<_> = operation
        .arguments
        .iter()
        .map(|argument| {
            ObjectField::new(
                argument.name.as_str(),
                map_input_type(&argument.ty, schema, DEFAULT_DEPTH),
                argument.ty.is_non_null(),
            )
            .with_description(argument.description.clone())
            .with_default(argument.default_value.as_deref().map(value_to_json))
        })
        .collect();
    let any_required = arguments.iter().any(|argument| argument.required);

    SchemaNode::Object(vec![
        ObjectField::new(QUERY_PARAMETER, SchemaNode::String, false).with_description(Some(
            format!(
                "A GraphQL document to run instead of the default `{}` {}",
                operation.name, operation.kind
            ),
        )),
        ObjectField::new(VARIABLES_PARAMETER, SchemaNode::Object(arguments), any_required),
    ])
}

/// Generate a description from the schema documentation and the return type
fn tool_description(
    operation: &OperationDescriptor,
    schema: &Schema,
    options: SynthesisOptions,
) -> String {
    let mut lines = vec![
        operation
            .description
            .clone()
            .unwrap_or_else(|| format!("Anonymous {}", operation.kind)),
    ];

    if !options.disable_type_description {
        lines.push(type_description(&operation.return_type));
        let is_scalar = matches!(
            schema.types.get(operation.return_type.inner_named_type()),
            Some(ExtendedType::Scalar(_))
        );
        if !is_scalar {
            lines.extend(minify_named_type(&operation.return_type, schema));
        }
    }

    lines.join("\n")
}

fn type_description(ty: &Type) -> String {
    let optional = if ty.is_non_null() {
        ""
    } else {
        "is optional and "
    };
    let array = if ty.is_list() {
        "is an array of type"
    } else {
        "has type"
    };
    format!(
        "The returned value {optional}{array} `{}`",
        ty.inner_named_type()
    )
}

fn tool_character_length(tool: &Tool) -> Result<usize, serde_json::Error> {
    let tool_schema_string = serde_json::to_string_pretty(&*tool.input_schema)?;
    Ok(tool.name.len()
        + tool.description.as_ref().map(|d| d.len()).unwrap_or(0)
        + tool_schema_string.len())
}
