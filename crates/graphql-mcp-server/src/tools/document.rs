use apollo_compiler::Schema;
use apollo_compiler::ast::FieldDefinition;
use apollo_compiler::schema::ExtendedType;

use crate::operations::OperationDescriptor;

/// Build the document a tool runs when the caller does not supply one.
///
/// Every argument becomes a variable of the same name and type. Object and
/// interface return types select their leaf fields, other composite types only
/// `__typename`, and leaf return types nothing at all.
pub fn default_document(operation: &OperationDescriptor, schema: &Schema) -> String {
    let variables = operation
        .arguments
        .iter()
        .map(|argument| format!("${}: {}", argument.name, argument.ty))
        .collect::<Vec<_>>()
        .join(", ");
    let arguments = operation
        .arguments
        .iter()
        .map(|argument| format!("{}: ${}", argument.name, argument.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut document = format!("{} {}", operation.kind, operation.name);
    if !variables.is_empty() {
        document.push_str(&format!("({variables})"));
    }
    document.push_str(&format!(" {{ {}", operation.name));
    if !arguments.is_empty() {
        document.push_str(&format!("({arguments})"));
    }
    if let Some(selection) = selection_set(operation.return_type.inner_named_type(), schema) {
        document.push_str(&format!(" {{ {selection} }}"));
    }
    document.push_str(" }");
    document
}

fn selection_set(type_name: &str, schema: &Schema) -> Option<String> {
    let fields = match schema.types.get(type_name)? {
        ExtendedType::Scalar(_) | ExtendedType::Enum(_) => return None,
        ExtendedType::Object(object) => Some(&object.fields),
        ExtendedType::Interface(interface) => Some(&interface.fields),
        ExtendedType::Union(_) | ExtendedType::InputObject(_) => None,
    };

    let leaves: Vec<_> = fields
        .into_iter()
        .flat_map(|fields| fields.values())
        .filter(|field| is_selectable_leaf(field, schema))
        .map(|field| field.name.as_str())
        .collect();

    if leaves.is_empty() {
        Some("__typename".to_string())
    } else {
        Some(leaves.join(" "))
    }
}

fn is_selectable_leaf(field: &FieldDefinition, schema: &Schema) -> bool {
    let is_leaf = matches!(
        schema.types.get(field.ty.inner_named_type()),
        Some(ExtendedType::Scalar(_) | ExtendedType::Enum(_))
    );
    let needs_arguments = field
        .arguments
        .iter()
        .any(|argument| argument.is_required());
    is_leaf && !needs_arguments
}
