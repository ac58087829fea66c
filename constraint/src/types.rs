//! Allow-lists of node and annotation types.

use loom_environment::{LoomConstraint, LoomEnvironment};
use loom_graph::{LoomGraph, LoomNode};
use loom_validation::{issue_types, CheckResult, Context, ValidationIssue, ValidationIssueCollector};
use std::collections::BTreeSet;

/// Rejects nodes whose type, or any of whose annotation keys, is not allowed.
#[derive(Debug, Clone, Default)]
pub struct TypeRestrictionConstraint {
    node_types: BTreeSet<String>,
    annotation_types: BTreeSet<String>,
}

impl TypeRestrictionConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_types.insert(node_type.into());
        self
    }

    pub fn annotation_type(mut self, key: impl Into<String>) -> Self {
        self.annotation_types.insert(key.into());
        self
    }

    pub fn allows_node_type(&self, node_type: &str) -> bool {
        self.node_types.contains(node_type)
    }

    pub fn allows_annotation_type(&self, key: &str) -> bool {
        self.annotation_types.contains(key)
    }

    fn check_type(
        node: &LoomNode,
        description: &str,
        value: &str,
        valid: &BTreeSet<String>,
        collector: &mut ValidationIssueCollector,
    ) {
        if valid.contains(value) {
            return;
        }
        collector.add(
            ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                .summary(format!("Illegal {description} type"))
                .param("type", value)
                .context(Context::new("Valid Types").with_data(valid))
                .context(node.as_validation_context("Node")),
        );
    }
}

impl LoomConstraint for TypeRestrictionConstraint {
    fn name(&self) -> &str {
        "TypeRestrictionConstraint"
    }

    fn validate_constraint(
        &self,
        _env: &LoomEnvironment,
        graph: &LoomGraph,
        collector: &mut ValidationIssueCollector,
    ) -> CheckResult {
        for node in graph.nodes() {
            Self::check_type(node, "node", node.node_type(), &self.node_types, collector);
            for key in node.annotations().keys() {
                Self::check_type(node, "annotation", key, &self.annotation_types, collector);
            }
        }
        Ok(())
    }
}
