//! The validation environment and its orchestration.

use crate::{EnvironmentBuilder, LoomConstraint, NodeCheck, SchemaSite, TypeSchema};
use loom_core::{LoomError, LoomResult};
use loom_graph::{LoomGraph, LoomNode};
use loom_validation::{
    issue_types, CheckError, CheckResult, ValidationIssue, ValidationIssueCollector,
    ValidationReport,
};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// A node type registered with an environment.
#[derive(Clone)]
pub(crate) struct TypeBinding {
    pub(crate) name: String,
    pub(crate) schema: TypeSchema,
    pub(crate) check: Option<NodeCheck>,
}

/// A registered constraint, kept both as a trait object and as `Any` for lookup by type.
#[derive(Clone)]
pub(crate) struct ConstraintEntry {
    pub(crate) constraint: Arc<dyn LoomConstraint>,
    any: Arc<dyn Any + Send + Sync>,
}

impl ConstraintEntry {
    pub(crate) fn new<C: LoomConstraint>(constraint: C) -> Self {
        let shared = Arc::new(constraint);
        Self {
            constraint: shared.clone(),
            any: shared,
        }
    }
}

/// The registry of type bindings, annotation schemas, constraints and
/// aliases that graphs are validated against.
///
/// Built with [`LoomEnvironment::builder`]; immutable afterwards.
#[derive(Clone)]
pub struct LoomEnvironment {
    pub(crate) types: BTreeMap<String, TypeBinding>,
    pub(crate) annotation_types: BTreeMap<String, TypeSchema>,
    pub(crate) constraints: Vec<ConstraintEntry>,
    pub(crate) type_aliases: BTreeMap<String, String>,
    pub(crate) url_aliases: BTreeMap<String, String>,
}

impl fmt::Debug for LoomEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constraints: Vec<&str> = self.constraints.iter().map(|e| e.constraint.name()).collect();
        f.debug_struct("LoomEnvironment")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("annotation_types", &self.annotation_types.keys().collect::<Vec<_>>())
            .field("constraints", &constraints)
            .field("type_aliases", &self.type_aliases)
            .field("url_aliases", &self.url_aliases)
            .finish()
    }
}

impl LoomEnvironment {
    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::new()
    }

    // ==================== Types ====================

    pub fn supports_node_type(&self, node_type: &str) -> bool {
        self.types.contains_key(node_type)
    }

    pub fn assert_supports_node_type(&self, node_type: &str) -> LoomResult<()> {
        if self.supports_node_type(node_type) {
            Ok(())
        } else {
            Err(LoomError::UnsupportedType(node_type.to_string()))
        }
    }

    /// Registered node type names, sorted.
    pub fn node_types(&self) -> impl Iterator<Item = &str> + '_ {
        self.types.values().map(|b| b.name.as_str())
    }

    pub fn type_schema(&self, node_type: &str) -> Option<&TypeSchema> {
        self.types.get(node_type).map(|b| &b.schema)
    }

    pub fn supports_annotation_type(&self, key: &str) -> bool {
        self.annotation_types.contains_key(key)
    }

    /// Registered annotation keys, sorted.
    pub fn annotation_types(&self) -> impl Iterator<Item = &str> + '_ {
        self.annotation_types.keys().map(String::as_str)
    }

    pub fn annotation_schema(&self, key: &str) -> Option<&TypeSchema> {
        self.annotation_types.get(key)
    }

    // ==================== Aliases ====================

    /// Display name of a type: its exact alias, else its url alias, else the name itself.
    pub fn get_type_alias(&self, node_type: &str) -> String {
        if let Some(alias) = self.type_aliases.get(node_type) {
            return alias.clone();
        }
        self.url_alias(node_type)
    }

    /// Rewrite `<url>#.../Name` to `<alias>:Name` when `url` has an alias.
    pub fn url_alias(&self, node_type: &str) -> String {
        if let Some((url, path)) = node_type.split_once('#') {
            if let Some(alias) = self.url_aliases.get(url) {
                let name = path.rsplit('/').next().unwrap_or(path);
                return format!("{alias}:{name}");
            }
        }
        node_type.to_string()
    }

    // ==================== Constraints ====================

    /// Registered constraints in registration order.
    pub fn constraints(&self) -> impl Iterator<Item = &dyn LoomConstraint> + '_ {
        self.constraints.iter().map(|e| e.constraint.as_ref())
    }

    /// The first registered constraint of type `C`.
    pub fn lookup_constraint<C: LoomConstraint>(&self) -> Option<&C> {
        self.constraints
            .iter()
            .find_map(|e| e.any.downcast_ref::<C>())
    }

    pub fn assert_constraint<C: LoomConstraint>(&self) -> LoomResult<&C> {
        self.lookup_constraint::<C>().ok_or_else(|| {
            LoomError::missing_requirement("environment", std::any::type_name::<C>())
        })
    }

    // ==================== Graphs ====================

    pub fn new_graph(&self) -> LoomGraph {
        LoomGraph::new()
    }

    /// Parse a graph document for validation in this environment.
    pub fn graph_from_json(&self, json: &str) -> LoomResult<LoomGraph> {
        LoomGraph::from_json(json)
    }

    // ==================== Validation ====================

    /// Validate `graph`, returning every issue found.
    ///
    /// `Err` is reserved for programming errors raised by a check.
    pub fn validate(&self, graph: &LoomGraph) -> LoomResult<ValidationReport> {
        let mut collector = ValidationIssueCollector::new();
        self.validate_into(graph, &mut collector)?;
        info!(
            graph = %graph.id(),
            issues = collector.len(),
            "validated graph"
        );
        Ok(collector.into_report())
    }

    /// Validate into an existing collector.
    pub fn validate_into(
        &self,
        graph: &LoomGraph,
        collector: &mut ValidationIssueCollector,
    ) -> LoomResult<()> {
        debug!(nodes = graph.len(), "running per-node checks");
        for node in graph.nodes() {
            self.check_node(graph, node, collector)?;
        }

        debug!(constraints = self.constraints.len(), "running constraints");
        for entry in &self.constraints {
            trace!(constraint = entry.constraint.name(), "running constraint");
            collector.collect(|c| entry.constraint.validate_constraint(self, graph, c))?;
        }
        Ok(())
    }

    /// Validate and fail with every issue if any were found.
    pub fn assert_valid(&self, graph: &LoomGraph) -> CheckResult {
        self.validate(graph)?.into_result()?;
        Ok(())
    }

    fn check_node(
        &self,
        graph: &LoomGraph,
        node: &LoomNode,
        collector: &mut ValidationIssueCollector,
    ) -> LoomResult<()> {
        trace!(node = %node.id(), node_type = node.node_type(), "checking node");

        let Some(binding) = self.types.get(node.node_type()) else {
            collector.add(
                ValidationIssue::builder(issue_types::UNKNOWN_NODE_TYPE)
                    .summary(format!("Unknown node type: {}", node.node_type()))
                    .param("nodeType", node.node_type())
                    .context(node.as_validation_context("Node")),
            );
            return Ok(());
        };

        let site = SchemaSite::body(node);
        let body = node.body().to_value();
        let schema_issues = binding.schema.validate_value(graph, &site, &body, collector);

        if let Some(reason) = node.body().decode_error() {
            if schema_issues == 0 {
                collector.add(
                    ValidationIssue::builder(issue_types::NODE_SCHEMA_ERROR)
                        .summary(format!("Body does not match {}", node.node_type()))
                        .message(reason)
                        .param("nodeType", node.node_type())
                        .context(node.as_validation_context("Node")),
                );
            }
        }

        for (key, value) in node.annotations() {
            if let Some(schema) = self.annotation_types.get(key) {
                schema.validate_value(graph, &SchemaSite::annotation(node, key), value, collector);
            }
        }

        if let Some(check) = &binding.check {
            collector.collect(|c| check(self, graph, node, c))?;
        }
        Ok(())
    }
}
