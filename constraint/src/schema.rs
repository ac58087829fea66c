//! Extra body schemas applied to chosen node types.

use crate::support::require_node_types;
use loom_core::jsonpath::concat_json_path;
use loom_core::{LoomError, LoomResult};
use loom_environment::{IssueScan, JsonSchema, LoomConstraint, LoomEnvironment};
use loom_graph::{LoomGraph, LoomNode};
use loom_validation::{issue_types, CheckResult, Context, ValidationIssueCollector};
use regex_lite::Regex;
use std::collections::BTreeSet;

/// Validates the bodies of selected nodes against one JSON schema.
///
/// A node is selected when its type is listed, or fully matches one of the
/// type patterns.
#[derive(Debug, Clone)]
pub struct NodeBodySchemaConstraint {
    node_types: BTreeSet<String>,
    node_type_patterns: Vec<Regex>,
    body_schema: JsonSchema,
}

impl NodeBodySchemaConstraint {
    pub fn new(body_schema: JsonSchema) -> Self {
        Self {
            node_types: BTreeSet::new(),
            node_type_patterns: Vec::new(),
            body_schema,
        }
    }

    pub fn node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_types.insert(node_type.into());
        self
    }

    /// Select every node type matching `pattern` in full.
    pub fn node_type_pattern(mut self, pattern: &str) -> LoomResult<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|err| LoomError::config(format!("invalid node type pattern {pattern:?}: {err}")))?;
        self.node_type_patterns.push(regex);
        Ok(self)
    }

    pub fn node_types(&self) -> &BTreeSet<String> {
        &self.node_types
    }

    pub fn body_schema(&self) -> &JsonSchema {
        &self.body_schema
    }

    pub fn applies_to(&self, node_type: &str) -> bool {
        self.node_types.contains(node_type)
            || self.node_type_patterns.iter().any(|p| p.is_match(node_type))
    }

    fn check_node(&self, node: &LoomNode, collector: &mut ValidationIssueCollector) {
        let body_path = concat_json_path([node.json_path().as_str(), "body"]);
        IssueScan::new(&self.body_schema, issue_types::NODE_SCHEMA_ERROR)
            .summary_prefix("Body ")
            .json_path_prefix(body_path)
            .param("nodeType", node.node_type())
            .context(node.as_validation_context("Node"))
            .context(Context::new("Body Schema").with_data(self.body_schema.source()))
            .scan(&node.body().to_value(), collector);
    }
}

impl LoomConstraint for NodeBodySchemaConstraint {
    fn name(&self) -> &str {
        "NodeBodySchemaConstraint"
    }

    fn check_requirements(&self, env: &LoomEnvironment) -> LoomResult<()> {
        let node_types: Vec<&str> = self.node_types.iter().map(String::as_str).collect();
        require_node_types(self.name(), env, &node_types)
    }

    fn validate_constraint(
        &self,
        _env: &LoomEnvironment,
        graph: &LoomGraph,
        collector: &mut ValidationIssueCollector,
    ) -> CheckResult {
        for node in graph.nodes().filter(|n| self.applies_to(n.node_type())) {
            self.check_node(node, collector);
        }
        Ok(())
    }
}
