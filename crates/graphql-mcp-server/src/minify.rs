//! Compact type definitions for tool descriptions
//!
//! Format: a one-letter kind prefix (`T` object, `F` interface, `U` union,
//! `E` enum, `I` input), the type name, then its members. Built-in scalars are
//! shortened to `s`, `i`, `f`, `b` and `d`, and descriptions are inlined as
//! quoted strings in front of what they describe.

use std::sync::OnceLock;

use apollo_compiler::collections::IndexMap;
use apollo_compiler::schema::{Component, ExtendedType, FieldDefinition, Type};
use apollo_compiler::{Name, Schema};
use regex::Regex;

pub trait MinifyExt {
    /// Serialize in minified form
    fn minify(&self) -> String;
}

impl MinifyExt for ExtendedType {
    fn minify(&self) -> String {
        match self {
            ExtendedType::Scalar(scalar_type) => {
                shorten_scalar_names(scalar_type.name.as_str()).to_string()
            }
            ExtendedType::Object(object_type) => {
                let name = described(object_type.description.as_deref(), &object_type.name);
                let fields = minify_fields(&object_type.fields);
                let interfaces = object_type
                    .implements_interfaces
                    .iter()
                    .map(|interface| interface.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                if interfaces.is_empty() {
                    format!("T:{name}:{fields}")
                } else {
                    format!("T:{name}<{interfaces}>:{fields}")
                }
            }
            ExtendedType::Interface(interface_type) => {
                let name = described(interface_type.description.as_deref(), &interface_type.name);
                format!("F:{name}:{}", minify_fields(&interface_type.fields))
            }
            ExtendedType::Union(union_type) => {
                let name = described(union_type.description.as_deref(), &union_type.name);
                let members = union_type
                    .members
                    .iter()
                    .map(|member| member.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("U:{name}:{members}")
            }
            ExtendedType::Enum(enum_type) => {
                let name = described(enum_type.description.as_deref(), &enum_type.name);
                let values = enum_type
                    .values
                    .keys()
                    .map(|value| value.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("E:{name}:{values}")
            }
            ExtendedType::InputObject(input_object_type) => {
                let name = described(
                    input_object_type.description.as_deref(),
                    &input_object_type.name,
                );
                let fields = input_object_type
                    .fields
                    .values()
                    .map(|field| {
                        format!(
                            "{}:{}",
                            described(field.description.as_deref(), &field.name),
                            type_name(&field.ty)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                format!("I:{name}:{fields}")
            }
        }
    }
}

fn minify_fields(fields: &IndexMap<Name, Component<FieldDefinition>>) -> String {
    fields
        .values()
        .map(|field| {
            let mut minified = described(field.description.as_deref(), &field.name);
            if !field.arguments.is_empty() {
                let arguments = field
                    .arguments
                    .iter()
                    .map(|argument| {
                        format!(
                            "{}:{}",
                            described(argument.description.as_deref(), &argument.name),
                            type_name(&argument.ty)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                minified.push_str(&format!("({arguments})"));
            }
            minified.push(':');
            minified.push_str(&type_name(&field.ty));
            minified
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn described(description: Option<&str>, name: &Name) -> String {
    match description {
        Some(description) => format!("\"{}\"{name}", normalize_description(description)),
        None => name.to_string(),
    }
}

/// Render a type reference with shortened scalar names, e.g. `[s!]!`
pub fn type_name(ty: &Type) -> String {
    match ty {
        Type::Named(name) => shorten_scalar_names(name.as_str()).to_string(),
        Type::NonNullNamed(name) => format!("{}!", shorten_scalar_names(name.as_str())),
        Type::List(inner) => format!("[{}]", type_name(inner)),
        Type::NonNullList(inner) => format!("[{}]!", type_name(inner)),
    }
}

fn shorten_scalar_names(name: &str) -> &str {
    match name {
        "String" => "s",
        "Int" => "i",
        "Float" => "f",
        "Boolean" => "b",
        "ID" => "d",
        _ => name,
    }
}

/// Collapse runs of whitespace and drop quotes that would end the inline string
#[allow(clippy::expect_used)]
fn normalize_description(desc: &str) -> String {
    static WHITESPACE_PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE_PATTERN.get_or_init(|| Regex::new(r"\s+").expect("regex pattern compiles"));
    re.replace_all(desc.trim(), " ").replace('"', "'")
}

/// Minify the named type at the core of `ty`, if the schema defines it
pub fn minify_named_type(ty: &Type, schema: &Schema) -> Option<String> {
    schema
        .types
        .get(ty.inner_named_type())
        .map(|extended_type| extended_type.minify())
}
