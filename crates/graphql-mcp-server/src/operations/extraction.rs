use apollo_compiler::ast::{FieldDefinition, InputValueDefinition, Type, Value};
use apollo_compiler::{Node, Schema};
use tracing::debug;

use super::OperationKind;

/// A root field of the schema, described as an invocable operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub name: String,
    pub kind: OperationKind,
    pub description: Option<String>,
    pub arguments: Vec<ArgumentDescriptor>,
    pub return_type: Type,
}

/// A single argument of a root field, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub ty: Type,
    pub default_value: Option<Node<Value>>,
    pub description: Option<String>,
}

impl OperationDescriptor {
    fn from_field(kind: OperationKind, field: &FieldDefinition) -> Self {
        Self {
            name: field.name.to_string(),
            kind,
            description: field.description.as_ref().map(|d| d.to_string()),
            arguments: field
                .arguments
                .iter()
                .map(|argument| ArgumentDescriptor::from(&**argument))
                .collect(),
            return_type: field.ty.clone(),
        }
    }
}

impl From<&InputValueDefinition> for ArgumentDescriptor {
    fn from(argument: &InputValueDefinition) -> Self {
        Self {
            name: argument.name.to_string(),
            ty: Type::clone(&argument.ty),
            default_value: argument.default_value.clone(),
            description: argument.description.as_ref().map(|d| d.to_string()),
        }
    }
}

/// List the root fields of every allowed operation kind.
///
/// Fields come out in the schema's declaration order, query fields before
/// mutation fields. Only the root fields and their direct arguments are read.
pub fn extract_operations(
    schema: &Schema,
    allowed_kinds: &[OperationKind],
) -> Vec<OperationDescriptor> {
    let mut operations = Vec::new();
    for kind in allowed_kinds {
        let Some(root) = schema
            .root_operation((*kind).into())
            .and_then(|root_name| schema.get_object(root_name))
        else {
            debug!(%kind, "Schema has no root type for operation kind");
            continue;
        };

        operations.extend(
            root.fields
                .values()
                .map(|field| OperationDescriptor::from_field(*kind, field)),
        );
    }
    operations
}

#[cfg(test)]
mod tests {
    use apollo_compiler::validation::Valid;

    use super::*;

    fn schema(sdl: &str) -> Valid<Schema> {
        Schema::parse_and_validate(sdl, "schema.graphql").unwrap()
    }

    #[test]
    fn extracts_a_single_query() {
        let schema = schema(
            r#"
            type Query { user(id: ID!): User }
            type User { id: ID! name: String }
            "#,
        );

        let operations = extract_operations(&schema, OperationKind::allowed(true));

        assert_eq!(
            operations,
            vec![OperationDescriptor {
                name: "user".to_string(),
                kind: OperationKind::Query,
                description: None,
                arguments: vec![ArgumentDescriptor {
                    name: "id".to_string(),
                    ty: Type::Named(apollo_compiler::name!("ID")).non_null(),
                    default_value: None,
                    description: None,
                }],
                return_type: Type::Named(apollo_compiler::name!("User")),
            }]
        );
    }

    #[test]
    fn keeps_declaration_order() {
        let schema = schema(
            r#"
            type Query { zebra: String apple: String mango: String }
            type Mutation { second: String first: String }
            "#,
        );

        let names: Vec<_> = extract_operations(&schema, OperationKind::allowed(true))
            .into_iter()
            .map(|op| format!("{}:{}", op.kind, op.name))
            .collect();

        assert_eq!(
            names,
            vec![
                "query:zebra",
                "query:apple",
                "query:mango",
                "mutation:second",
                "mutation:first"
            ]
        );
    }

    #[test]
    fn skips_mutations_unless_allowed() {
        let schema = schema(
            r#"
            type Query { a: String }
            type Mutation { b: String }
            "#,
        );

        let operations = extract_operations(&schema, OperationKind::allowed(false));

        assert_eq!(operations.len(), 1);
        assert!(operations.iter().all(|op| op.kind == OperationKind::Query));
    }

    #[test]
    fn missing_mutation_root_yields_nothing() {
        let schema = schema("type Query { a: String }");

        let operations = extract_operations(&schema, &[OperationKind::Mutation]);

        assert!(operations.is_empty());
    }

    #[test]
    fn uses_renamed_root_types() {
        let schema = schema(
            r#"
            schema { query: RootQuery }
            type RootQuery { ping: Boolean }
            "#,
        );

        let operations = extract_operations(&schema, &[OperationKind::Query]);

        assert_eq!(operations.len(), 1);
        assert_eq!(operations[0].name, "ping");
    }

    #[test]
    fn captures_descriptions_and_defaults() {
        let schema = schema(
            r#"
            type Query {
              "Search all the things"
              search("What to look for" term: String = "all", limit: Int = 10): [String]
            }
            "#,
        );

        let operation = extract_operations(&schema, &[OperationKind::Query])
            .pop()
            .unwrap();

        assert_eq!(operation.description.as_deref(), Some("Search all the things"));
        assert_eq!(operation.arguments.len(), 2);
        assert_eq!(
            operation.arguments[0].description.as_deref(),
            Some("What to look for")
        );
        assert_eq!(
            operation.arguments[0]
                .default_value
                .as_ref()
                .map(|v| v.to_string()),
            Some("\"all\"".to_string())
        );
        assert_eq!(
            operation.arguments[1]
                .default_value
                .as_ref()
                .map(|v| v.to_string()),
            Some("10".to_string())
        );
    }
}
