//! Client-side rendering of an introspection result back into SDL

use apollo_compiler::Schema;
use apollo_compiler::validation::Valid;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{SafeWithErrors, SchemaError};

/// The standard introspection document, including deprecated fields and enum values
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types { ...FullType }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args { ...InputValue }
    type { ...TypeRef }
    isDeprecated
    deprecationReason
  }
  inputFields { ...InputValue }
  interfaces { ...TypeRef }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes { ...TypeRef }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType { kind name }
            }
          }
        }
      }
    }
  }
}
"#;

const BUILT_IN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

#[derive(Debug, Deserialize)]
pub(super) struct IntrospectionResponse {
    data: Option<IntrospectionData>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct IntrospectionData {
    #[serde(rename = "__schema")]
    schema: Option<IntrospectionSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionSchema {
    query_type: Option<NamedRef>,
    mutation_type: Option<NamedRef>,
    subscription_type: Option<NamedRef>,
    types: Vec<FullType>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullType {
    kind: TypeKind,
    name: String,
    description: Option<String>,
    fields: Option<Vec<Field>>,
    input_fields: Option<Vec<InputValue>>,
    interfaces: Option<Vec<TypeRef>>,
    enum_values: Option<Vec<EnumValue>>,
    possible_types: Option<Vec<TypeRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Field {
    name: String,
    description: Option<String>,
    #[serde(default)]
    args: Vec<InputValue>,
    #[serde(rename = "type")]
    ty: TypeRef,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputValue {
    name: String,
    description: Option<String>,
    #[serde(rename = "type")]
    ty: TypeRef,
    default_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnumValue {
    name: String,
    description: Option<String>,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeRef {
    kind: TypeKind,
    name: Option<String>,
    of_type: Option<Box<TypeRef>>,
}

impl IntrospectionResponse {
    /// Turn the response body into a validated schema
    pub(super) fn into_schema(self) -> Result<Valid<Schema>, SchemaError> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            return Err(SchemaError::Introspection(format!(
                "response contained errors: {}",
                Value::Array(errors)
            )));
        }

        let schema = self
            .data
            .and_then(|data| data.schema)
            .ok_or_else(|| SchemaError::Introspection("missing data.__schema".to_string()))?;

        let sdl = schema.to_sdl()?;
        Schema::parse_and_validate(sdl, "introspection.graphql").map_err(|errors| {
            SchemaError::Introspection(SafeWithErrors(&errors).to_string())
        })
    }
}

impl IntrospectionSchema {
    fn to_sdl(&self) -> Result<String, SchemaError> {
        let mut definitions = vec![self.schema_definition()];
        for full_type in self.types.iter().filter(|ty| is_user_type(ty)) {
            definitions.push(full_type.to_sdl()?);
        }
        Ok(definitions.join("\n\n"))
    }

    fn schema_definition(&self) -> String {
        let roots = [
            ("query", &self.query_type),
            ("mutation", &self.mutation_type),
            ("subscription", &self.subscription_type),
        ];
        let lines: Vec<_> = roots
            .into_iter()
            .filter_map(|(kind, root)| {
                root.as_ref()
                    .map(|root| format!("  {kind}: {}", root.name))
            })
            .collect();
        format!("schema {{\n{}\n}}", lines.join("\n"))
    }
}

fn is_user_type(ty: &FullType) -> bool {
    !ty.name.starts_with("__")
        && !(ty.kind == TypeKind::Scalar && BUILT_IN_SCALARS.contains(&ty.name.as_str()))
}

impl FullType {
    fn to_sdl(&self) -> Result<String, SchemaError> {
        let mut sdl = description("", self.description.as_deref());
        match self.kind {
            TypeKind::Scalar => sdl.push_str(&format!("scalar {}", self.name)),
            TypeKind::Object | TypeKind::Interface => {
                let keyword = if self.kind == TypeKind::Object {
                    "type"
                } else {
                    "interface"
                };
                sdl.push_str(&format!("{keyword} {}", self.name));

                let interfaces = self
                    .interfaces
                    .iter()
                    .flatten()
                    .map(TypeRef::name)
                    .collect::<Result<Vec<_>, _>>()?;
                if !interfaces.is_empty() {
                    sdl.push_str(&format!(" implements {}", interfaces.join(" & ")));
                }

                let fields = self
                    .fields
                    .iter()
                    .flatten()
                    .map(Field::to_sdl)
                    .collect::<Result<Vec<_>, _>>()?;
                sdl.push_str(&block(&fields));
            }
            TypeKind::Union => {
                let members = self
                    .possible_types
                    .iter()
                    .flatten()
                    .map(TypeRef::name)
                    .collect::<Result<Vec<_>, _>>()?;
                sdl.push_str(&format!("union {} = {}", self.name, members.join(" | ")));
            }
            TypeKind::Enum => {
                sdl.push_str(&format!("enum {}", self.name));
                let values: Vec<_> = self
                    .enum_values
                    .iter()
                    .flatten()
                    .map(EnumValue::to_sdl)
                    .collect();
                sdl.push_str(&block(&values));
            }
            TypeKind::InputObject => {
                sdl.push_str(&format!("input {}", self.name));
                let fields = self
                    .input_fields
                    .iter()
                    .flatten()
                    .map(|field| field.to_sdl("  "))
                    .collect::<Result<Vec<_>, _>>()?;
                sdl.push_str(&block(&fields));
            }
            TypeKind::List | TypeKind::NonNull => {
                return Err(SchemaError::Introspection(format!(
                    "wrapping type kind found for named type {}",
                    self.name
                )));
            }
        }
        Ok(sdl)
    }
}

impl Field {
    fn to_sdl(&self) -> Result<String, SchemaError> {
        let mut sdl = description("  ", self.description.as_deref());
        sdl.push_str(&format!("  {}", self.name));
        if !self.args.is_empty() {
            let args = self
                .args
                .iter()
                .map(|arg| arg.to_sdl("    "))
                .collect::<Result<Vec<_>, _>>()?;
            sdl.push_str(&format!("(\n{}\n  )", args.join("\n")));
        }
        sdl.push_str(&format!(": {}", self.ty.render()?));
        sdl.push_str(&deprecation(self.is_deprecated, self.deprecation_reason.as_deref()));
        Ok(sdl)
    }
}

impl InputValue {
    fn to_sdl(&self, indent: &str) -> Result<String, SchemaError> {
        let mut sdl = description(indent, self.description.as_deref());
        sdl.push_str(&format!("{indent}{}: {}", self.name, self.ty.render()?));
        if let Some(default_value) = &self.default_value {
            sdl.push_str(&format!(" = {default_value}"));
        }
        Ok(sdl)
    }
}

impl EnumValue {
    fn to_sdl(&self) -> String {
        let mut sdl = description("  ", self.description.as_deref());
        sdl.push_str(&format!("  {}", self.name));
        sdl.push_str(&deprecation(self.is_deprecated, self.deprecation_reason.as_deref()));
        sdl
    }
}

impl TypeRef {
    fn name(&self) -> Result<&str, SchemaError> {
        self.name.as_deref().ok_or_else(|| {
            SchemaError::Introspection(format!("{:?} type reference without a name", self.kind))
        })
    }

    fn of_type(&self) -> Result<&TypeRef, SchemaError> {
        self.of_type.as_deref().ok_or_else(|| {
            SchemaError::Introspection(format!("{:?} type reference without ofType", self.kind))
        })
    }

    /// Render the reference in type position, e.g. `[User!]!`
    fn render(&self) -> Result<String, SchemaError> {
        match self.kind {
            TypeKind::NonNull => Ok(format!("{}!", self.of_type()?.render()?)),
            TypeKind::List => Ok(format!("[{}]", self.of_type()?.render()?)),
            _ => self.name().map(str::to_string),
        }
    }
}

fn block(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!(" {{\n{}\n}}", lines.join("\n"))
    }
}

/// Render a block string with every line at `indent`, so dedenting restores the original text
fn description(indent: &str, description: Option<&str>) -> String {
    let Some(description) = description.filter(|description| !description.trim().is_empty())
    else {
        return String::new();
    };

    let lines: Vec<_> = description
        .replace("\"\"\"", "\\\"\"\"")
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect();
    format!("{indent}\"\"\"\n{}\n{indent}\"\"\"\n", lines.join("\n"))
}

fn deprecation(is_deprecated: bool, reason: Option<&str>) -> String {
    match (is_deprecated, reason) {
        (false, _) => String::new(),
        (true, Some(reason)) => format!(
            " @deprecated(reason: {})",
            Value::String(reason.to_string())
        ),
        (true, None) => " @deprecated".to_string(),
    }
}
