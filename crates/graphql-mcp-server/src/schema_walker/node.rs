use schemars::{Schema as JSONSchema, json_schema};
use serde_json::{Map, Value};

/// The validation shape of a GraphQL input type, after non-null unwrapping
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    Int,
    Float,
    Boolean,
    /// A string restricted to the values of a GraphQL enum
    Enum(Vec<String>),
    List(Box<SchemaNode>),
    /// Fields in declaration order
    Object(Vec<ObjectField>),
    /// Unchecked passthrough, used once the recursion budget runs out
    Any,
}

/// A named entry of an [`SchemaNode::Object`]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub name: String,
    pub node: SchemaNode,
    pub required: bool,
    pub description: Option<String>,
    pub default: Option<Value>,
}

impl ObjectField {
    pub fn new(name: impl Into<String>, node: SchemaNode, required: bool) -> Self {
        Self {
            name: name.into(),
            node,
            required,
            description: None,
            default: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_default(mut self, default: Option<Value>) -> Self {
        self.default = default;
        self
    }
}

impl SchemaNode {
    /// Look up a field of an object node
    pub fn field(&self, name: &str) -> Option<&ObjectField> {
        match self {
            SchemaNode::Object(fields) => fields.iter().find(|field| field.name == name),
            _ => None,
        }
    }

    /// How many object levels this tree nests. Lists are transparent.
    pub fn depth(&self) -> usize {
        match self {
            SchemaNode::Object(fields) => {
                1 + fields
                    .iter()
                    .map(|field| field.node.depth())
                    .max()
                    .unwrap_or_default()
            }
            SchemaNode::List(inner) => inner.depth(),
            _ => 0,
        }
    }

    /// Project the tree into a JSON Schema, one node for one node
    pub fn to_json_schema(&self) -> JSONSchema {
        match self {
            SchemaNode::String => json_schema!({"type": "string"}),
            SchemaNode::Int => json_schema!({"type": "integer"}),
            SchemaNode::Float => json_schema!({"type": "number"}),
            SchemaNode::Boolean => json_schema!({"type": "boolean"}),
            SchemaNode::Enum(values) => json_schema!({
                "type": "string",
                "enum": values
            }),
            SchemaNode::List(items) => json_schema!({
                "type": "array",
                "items": items.to_json_schema()
            }),
            SchemaNode::Object(fields) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in fields {
                    properties.insert(field.name.clone(), field.to_json_schema().into());
                    if field.required {
                        required.push(Value::String(field.name.clone()));
                    }
                }

                let mut schema = json_schema!({
                    "type": "object",
                    "properties": properties
                });
                if !required.is_empty() {
                    schema
                        .ensure_object()
                        .insert("required".to_string(), required.into());
                }
                schema
            }
            SchemaNode::Any => json_schema!({}),
        }
    }
}

impl ObjectField {
    fn to_json_schema(&self) -> JSONSchema {
        let mut schema = self.node.to_json_schema();
        if let Some(description) = &self.description {
            schema
                .ensure_object()
                .entry("description")
                .or_insert(description.clone().into());
        }
        if let Some(default) = &self.default {
            schema
                .ensure_object()
                .insert("default".to_string(), default.clone());
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(SchemaNode::String, json!({"type": "string"}))]
    #[case(SchemaNode::Int, json!({"type": "integer"}))]
    #[case(SchemaNode::Float, json!({"type": "number"}))]
    #[case(SchemaNode::Boolean, json!({"type": "boolean"}))]
    #[case(SchemaNode::Any, json!({}))]
    fn projects_leaves(#[case] node: SchemaNode, #[case] expected: Value) {
        assert_eq!(Value::from(node.to_json_schema()), expected);
    }

    #[test]
    fn projects_nested_structure() {
        let node = SchemaNode::Object(vec![
            ObjectField::new("id", SchemaNode::String, true)
                .with_description(Some("The identifier".to_string())),
            ObjectField::new(
                "tags",
                SchemaNode::List(Box::new(SchemaNode::Enum(vec![
                    "RED".to_string(),
                    "BLUE".to_string(),
                ]))),
                false,
            ),
            ObjectField::new("limit", SchemaNode::Int, false).with_default(Some(json!(10))),
        ]);

        assert_eq!(
            Value::from(node.to_json_schema()),
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "description": "The identifier"},
                    "tags": {
                        "type": "array",
                        "items": {"type": "string", "enum": ["RED", "BLUE"]}
                    },
                    "limit": {"type": "integer", "default": 10}
                },
                "required": ["id"]
            })
        );
    }

    #[test]
    fn omits_empty_required_list() {
        let node = SchemaNode::Object(vec![ObjectField::new("a", SchemaNode::Any, false)]);

        let schema = Value::from(node.to_json_schema());

        assert!(schema.get("required").is_none());
        assert_eq!(schema["properties"]["a"], json!({}));
    }

    #[test]
    fn depth_counts_object_levels_through_lists() {
        let node = SchemaNode::Object(vec![ObjectField::new(
            "children",
            SchemaNode::List(Box::new(SchemaNode::Object(vec![ObjectField::new(
                "leaf",
                SchemaNode::String,
                false,
            )]))),
            false,
        )]);

        assert_eq!(node.depth(), 2);
        assert_eq!(SchemaNode::List(Box::new(SchemaNode::Int)).depth(), 0);
    }
}
