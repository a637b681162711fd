use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use apollo_compiler::Schema;
use apollo_compiler::validation::Valid;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::synthesize::{GraphQLTool, SynthesisOptions, synthesize};
use crate::errors::ToolError;
use crate::operations::{OperationDescriptor, OperationKind, extract_operations};

/// Which operations become tools
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPolicy {
    /// Expose mutation root fields as tools
    pub allow_mutations: bool,

    /// Query root fields to leave out
    pub exclude_queries: HashSet<String>,

    /// Mutation root fields to leave out
    pub exclude_mutations: HashSet<String>,

    /// Leave the return type shape out of tool descriptions
    pub disable_type_description: bool,
}

impl ToolPolicy {
    /// Exclusion lists only apply to their own kind
    fn is_excluded(&self, operation: &OperationDescriptor) -> bool {
        match operation.kind {
            OperationKind::Query => self.exclude_queries.contains(&operation.name),
            OperationKind::Mutation => self.exclude_mutations.contains(&operation.name),
        }
    }

    fn synthesis_options(&self) -> SynthesisOptions {
        SynthesisOptions {
            disable_type_description: self.disable_type_description,
        }
    }
}

/// An immutable schema and the tools built from it
#[derive(Debug)]
pub struct ToolSet {
    schema: Arc<Valid<Schema>>,
    tools: HashMap<String, Arc<GraphQLTool>>,
}

impl ToolSet {
    fn build(policy: &ToolPolicy, schema: Valid<Schema>) -> Result<Self, ToolError> {
        let options = policy.synthesis_options();
        let tools = extract_operations(&schema, OperationKind::allowed(policy.allow_mutations))
            .into_iter()
            .filter(|operation| {
                let excluded = policy.is_excluded(operation);
                if excluded {
                    debug!(
                        kind = %operation.kind,
                        name = %operation.name,
                        "Skipping excluded operation"
                    );
                }
                !excluded
            })
            .map(|operation| {
                synthesize(&operation, &schema, options)
                    .map(|tool| (tool.name.clone(), Arc::new(tool)))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            schema: Arc::new(schema),
            tools,
        })
    }

    pub fn schema(&self) -> &Arc<Valid<Schema>> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Arc<GraphQLTool>> {
        self.tools.get(name)
    }

    /// All tools, sorted by name
    pub fn tools(&self) -> Vec<Arc<GraphQLTool>> {
        let mut tools: Vec<_> = self.tools.values().cloned().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Owns the current [`ToolSet`] and replaces it wholesale on reload.
///
/// The lock is only held to read or swap the `Arc`, so readers either see the
/// old set or the new one, never a mix.
#[derive(Debug)]
pub struct ToolRegistry {
    policy: ToolPolicy,
    current: RwLock<Arc<ToolSet>>,
}

impl ToolRegistry {
    pub fn build(policy: ToolPolicy, schema: Valid<Schema>) -> Result<Self, ToolError> {
        let tool_set = ToolSet::build(&policy, schema)?;
        info!(count = tool_set.len(), "Built tools from schema");
        Ok(Self {
            policy,
            current: RwLock::new(Arc::new(tool_set)),
        })
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<GraphQLTool>> {
        self.current.read().get(name).cloned()
    }

    pub fn snapshot(&self) -> Arc<ToolSet> {
        Arc::clone(&self.current.read())
    }

    /// Rebuild every tool from a new schema and install the result.
    ///
    /// The old set stays installed if the rebuild fails.
    pub fn reload(&self, schema: Valid<Schema>) -> Result<Arc<ToolSet>, ToolError> {
        let tool_set = Arc::new(ToolSet::build(&self.policy, schema)?);
        *self.current.write() = Arc::clone(&tool_set);
        info!(count = tool_set.len(), "Reloaded tools from schema");
        Ok(tool_set)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const SCHEMA: &str = r#"
        type Query { user(id: ID!): User users: [User] stats: Int }
        type Mutation { createUser(name: String!): User stats: Int }
        type User { id: ID! name: String }
    "#;

    fn schema(sdl: &str) -> Valid<Schema> {
        Schema::parse_and_validate(sdl, "schema.graphql").unwrap()
    }

    fn names(tool_set: &ToolSet) -> Vec<String> {
        tool_set.tools().iter().map(|tool| tool.name.clone()).collect()
    }

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn builds_one_tool_per_query() {
        let registry = ToolRegistry::build(ToolPolicy::default(), schema(SCHEMA)).unwrap();

        assert_eq!(
            names(&registry.snapshot()),
            vec!["query-stats", "query-user", "query-users"]
        );
    }

    #[test]
    fn exposes_mutations_only_when_allowed() {
        let policy = ToolPolicy {
            allow_mutations: true,
            ..Default::default()
        };

        let registry = ToolRegistry::build(policy, schema(SCHEMA)).unwrap();

        assert_eq!(
            names(&registry.snapshot()),
            vec![
                "mutation-createUser",
                "mutation-stats",
                "query-stats",
                "query-user",
                "query-users"
            ]
        );
    }

    #[rstest]
    #[case(
        set(&["stats"]),
        set(&[]),
        vec!["mutation-createUser", "mutation-stats", "query-user", "query-users"]
    )]
    #[case(
        set(&[]),
        set(&["stats"]),
        vec!["mutation-createUser", "query-stats", "query-user", "query-users"]
    )]
    #[case(
        set(&["user", "createUser"]),
        set(&["user"]),
        vec!["mutation-createUser", "mutation-stats", "query-stats", "query-users"]
    )]
    #[case(
        set(&["missing"]),
        set(&["missing"]),
        vec!["mutation-createUser", "mutation-stats", "query-stats", "query-user", "query-users"]
    )]
    fn exclusion_is_scoped_to_its_kind(
        #[case] exclude_queries: HashSet<String>,
        #[case] exclude_mutations: HashSet<String>,
        #[case] expected: Vec<&str>,
    ) {
        let policy = ToolPolicy {
            allow_mutations: true,
            exclude_queries,
            exclude_mutations,
            ..Default::default()
        };

        let registry = ToolRegistry::build(policy, schema(SCHEMA)).unwrap();

        assert_eq!(names(&registry.snapshot()), expected);
    }

    #[test]
    fn excluded_operations_are_never_registered() {
        let policy = ToolPolicy {
            allow_mutations: true,
            exclude_queries: set(&["user", "users", "stats"]),
            exclude_mutations: set(&["createUser", "stats"]),
            ..Default::default()
        };

        let registry = ToolRegistry::build(policy, schema(SCHEMA)).unwrap();

        assert!(registry.snapshot().is_empty());
        assert!(registry.lookup("query-user").is_none());
    }

    #[test]
    fn keys_match_tool_names() {
        let policy = ToolPolicy {
            allow_mutations: true,
            ..Default::default()
        };
        let registry = ToolRegistry::build(policy, schema(SCHEMA)).unwrap();
        let snapshot = registry.snapshot();

        for (key, tool) in &snapshot.tools {
            assert_eq!(key, &tool.name);
            assert_eq!(key, &tool.tool.name);
        }
    }

    #[test]
    fn builds_are_deterministic() {
        let first = ToolRegistry::build(ToolPolicy::default(), schema(SCHEMA)).unwrap();
        let second = ToolRegistry::build(ToolPolicy::default(), schema(SCHEMA)).unwrap();

        let first = first.snapshot().tools();
        let second = second.snapshot().tools();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn looks_up_tools_by_name() {
        let registry = ToolRegistry::build(ToolPolicy::default(), schema(SCHEMA)).unwrap();

        let tool = registry.lookup("query-user").unwrap();

        assert_eq!(tool.operation_name, "user");
        assert!(registry.lookup("user").is_none());
        assert!(registry.lookup("mutation-createUser").is_none());
    }

    #[test]
    fn reload_swaps_the_whole_set() {
        let registry = ToolRegistry::build(ToolPolicy::default(), schema(SCHEMA)).unwrap();
        let before = registry.snapshot();

        let after = registry
            .reload(schema("type Query { ping: Boolean }"))
            .unwrap();

        assert_eq!(names(&before), vec!["query-stats", "query-user", "query-users"]);
        assert_eq!(names(&after), vec!["query-ping"]);
        assert_eq!(names(&registry.snapshot()), vec!["query-ping"]);
        assert!(registry.lookup("query-user").is_none());
        assert!(registry.snapshot().schema().get_object("User").is_none());
    }
}
