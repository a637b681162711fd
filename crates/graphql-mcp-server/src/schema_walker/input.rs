use apollo_compiler::ast::{Type, Value as GraphQLValue};
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::{Name, Schema};
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use super::node::{ObjectField, SchemaNode};

/// How many input object levels are expanded below each top-level argument
pub const DEFAULT_DEPTH: usize = 3;

/// Map a GraphQL input type into a [`SchemaNode`].
///
/// `depth` drops by one on each input object descent; non-null and list
/// wrappers leave it untouched. At zero the walk stops with
/// [`SchemaNode::Any`], which bounds the recursion for cyclic input types.
pub fn map_input_type(ty: &Type, schema: &Schema, depth: usize) -> SchemaNode {
    if depth == 0 {
        return SchemaNode::Any;
    }

    match ty {
        Type::NonNullNamed(name) | Type::Named(name) => map_named_type(name, schema, depth),
        Type::NonNullList(inner) | Type::List(inner) => {
            SchemaNode::List(Box::new(map_input_type(inner, schema, depth)))
        }
    }
}

fn map_named_type(name: &Name, schema: &Schema, depth: usize) -> SchemaNode {
    match name.as_str() {
        "String" | "ID" => SchemaNode::String,
        "Int" => SchemaNode::Int,
        "Float" => SchemaNode::Float,
        "Boolean" => SchemaNode::Boolean,

        other => match schema.types.get(other) {
            Some(ExtendedType::Scalar(_)) => {
                debug!(scalar = other, "Custom scalar mapped to a string");
                SchemaNode::String
            }
            Some(ExtendedType::Enum(enum_type)) => SchemaNode::Enum(
                enum_type
                    .values
                    .keys()
                    .map(|value| value.to_string())
                    .collect(),
            ),
            Some(ExtendedType::InputObject(input_object)) => SchemaNode::Object(
                input_object
                    .fields
                    .iter()
                    .map(|(field_name, field)| {
                        ObjectField::new(
                            field_name.as_str(),
                            map_input_type(&field.ty, schema, depth - 1),
                            field.ty.is_non_null(),
                        )
                        .with_description(field.description.as_ref().map(|d| d.to_string()))
                        .with_default(field.default_value.as_deref().map(value_to_json))
                    })
                    .collect(),
            ),
            Some(_) => {
                warn!(type_name = other, "Output type used in an input position");
                SchemaNode::Any
            }
            None => {
                warn!(type_name = other, "Type not found in schema");
                SchemaNode::Any
            }
        },
    }
}

/// Convert a GraphQL literal (as found in default values) into JSON
pub fn value_to_json(value: &GraphQLValue) -> Value {
    match value {
        GraphQLValue::Null | GraphQLValue::Variable(_) => Value::Null,
        GraphQLValue::Enum(name) => Value::String(name.to_string()),
        GraphQLValue::String(string) => Value::String(string.to_string()),
        GraphQLValue::Boolean(boolean) => Value::Bool(*boolean),
        GraphQLValue::Int(int) => int
            .as_str()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| number_or_string(int.as_str())),
        GraphQLValue::Float(float) => number_or_string(float.as_str()),
        GraphQLValue::List(items) => {
            Value::Array(items.iter().map(|item| value_to_json(item)).collect())
        }
        GraphQLValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), value_to_json(value)))
                .collect::<Map<_, _>>(),
        ),
    }
}

fn number_or_string(literal: &str) -> Value {
    literal
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(literal.to_string()))
}
