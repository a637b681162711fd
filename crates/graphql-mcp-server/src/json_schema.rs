use rmcp::model::JsonObject;
use schemars::Schema as JSONSchema;
use serde_json::Value;

/// Macro to generate a JSON schema from a type
#[macro_export]
macro_rules! schema_from_type {
    ($type:ty) => {{
        // Draft-07 for MCP clients that don't support newer drafts
        let settings = schemars::generate::SchemaSettings::draft07();
        let generator = settings.into_generator();
        let schema = generator.into_root_schema_for::<$type>();
        $crate::json_schema::into_json_object(schema)
    }};
}

/// Unwrap a schema into the object form MCP tools carry.
///
/// Boolean schemas become the equivalent object: `true` is `{}` and `false`
/// is `{"not": {}}`.
pub fn into_json_object(schema: JSONSchema) -> JsonObject {
    match Value::from(schema) {
        Value::Object(object) => object,
        Value::Bool(false) => {
            let mut object = JsonObject::new();
            object.insert("not".to_string(), Value::Object(JsonObject::new()));
            object
        }
        _ => JsonObject::new(),
    }
}
