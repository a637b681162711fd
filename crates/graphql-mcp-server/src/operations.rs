//! Operations
//!
//! This module enumerates the root fields of a GraphQL schema as the operations
//! that get exposed as MCP tools.

mod extraction;

pub use extraction::{ArgumentDescriptor, OperationDescriptor, extract_operations};

use std::fmt;

use apollo_compiler::ast::OperationType;
use serde::Serialize;

/// The root operation types that can be translated into tools.
///
/// Subscriptions are intentionally absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }

    /// The kinds that may be exposed, given the mutation gate
    pub fn allowed(allow_mutations: bool) -> &'static [OperationKind] {
        if allow_mutations {
            &[OperationKind::Query, OperationKind::Mutation]
        } else {
            &[OperationKind::Query]
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OperationKind> for OperationType {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Query => OperationType::Query,
            OperationKind::Mutation => OperationType::Mutation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutations_are_gated() {
        assert_eq!(OperationKind::allowed(false), &[OperationKind::Query]);
        assert_eq!(
            OperationKind::allowed(true),
            &[OperationKind::Query, OperationKind::Mutation]
        );
    }

    #[test]
    fn kind_displays_lowercase() {
        assert_eq!(OperationKind::Query.to_string(), "query");
        assert_eq!(OperationKind::Mutation.to_string(), "mutation");
    }
}
