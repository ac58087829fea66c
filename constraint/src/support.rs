use loom_core::jsonpath::{concat_json_path, json_path_index, json_path_member};
use loom_core::{LoomError, LoomResult, NodeId};
use loom_environment::{LoomConstraint, LoomEnvironment, TypeSchema};
use loom_graph::{LoomGraph, LoomNode};
use loom_validation::{issue_types, Context, ValidationIssue, ValidationIssueCollector};
use serde_json::Value;

/// Fail with `MissingRequirement` unless every type in `node_types` is registered.
pub(crate) fn require_node_types(
    constraint: &str,
    env: &LoomEnvironment,
    node_types: &[&str],
) -> LoomResult<()> {
    for node_type in node_types {
        if !env.supports_node_type(node_type) {
            return Err(LoomError::missing_requirement(
                constraint,
                format!("node type {node_type}"),
            ));
        }
    }
    Ok(())
}

/// Fail with `MissingRequirement` unless a constraint of type `C` is registered.
pub(crate) fn require_constraint<C: LoomConstraint>(
    constraint: &str,
    env: &LoomEnvironment,
    required: &str,
) -> LoomResult<()> {
    if env.lookup_constraint::<C>().is_none() {
        return Err(LoomError::missing_requirement(constraint, required));
    }
    Ok(())
}

/// Body-relative path of selection `idx` in group `io_name` of `map_name`,
/// such as `$.inputs['2x'][0]`.
pub(crate) fn selection_item_path(map_name: &str, io_name: &str, idx: usize) -> String {
    json_path_index(&selection_group_path(map_name, io_name), idx)
}

/// Body-relative path of the group `io_name` of `map_name`.
pub(crate) fn selection_group_path(map_name: &str, io_name: &str) -> String {
    json_path_member(&json_path_member("$", map_name), io_name)
}

/// Document path of `relative`, a path inside the body of `node`.
pub(crate) fn body_path(node: &LoomNode, relative: &str) -> String {
    concat_json_path([node.json_path().as_str(), "body", relative])
}

/// Reference checks over one node's body.
///
/// A reference that one of the body's reference schemas already reports
/// during node validation is not reported again.
pub(crate) struct BodyReferences<'a> {
    schema: Option<&'a TypeSchema>,
    body: Value,
    node_path: String,
}

impl<'a> BodyReferences<'a> {
    pub(crate) fn new(env: &'a LoomEnvironment, node: &LoomNode) -> Self {
        Self {
            schema: env.type_schema(node.node_type()),
            body: node.body().to_value(),
            node_path: node.json_path(),
        }
    }

    /// Document path of `relative`, a path inside the body such as `$.inputs.x[0]`.
    pub(crate) fn path(&self, relative: &str) -> String {
        concat_json_path([self.node_path.as_str(), "body", relative])
    }

    /// Does a reference schema already report the reference at `relative`
    /// resolving to a node of type `actual` (`None` when it does not exist)?
    pub(crate) fn reported_by_schema(&self, relative: &str, actual: Option<&str>) -> bool {
        let covering = self
            .schema
            .and_then(|schema| schema.reference_at(&self.body, relative));
        match (covering, actual) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some((_, reference)), Some(actual)) => !reference.allows_type(actual),
        }
    }

    /// Resolve `id` to a node of `node_type`, reporting a missing or mistyped target.
    ///
    /// `relative` is where the reference sits in the body; `contexts` follow
    /// the `Reference` context.
    pub(crate) fn resolve<'g>(
        &self,
        graph: &'g LoomGraph,
        id: NodeId,
        node_type: &str,
        relative: &str,
        collector: &mut ValidationIssueCollector,
        contexts: &[Context],
    ) -> Option<&'g LoomNode> {
        let reference = || {
            Context::new("Reference")
                .with_jsonpath(self.path(relative))
                .with_data(id)
        };

        let Some(node) = graph.get_node(id) else {
            if !self.reported_by_schema(relative, None) {
                collector.add(
                    ValidationIssue::builder(issue_types::NODE_REFERENCE_ERROR)
                        .summary("Referenced node does not exist")
                        .param("nodeId", id)
                        .param("nodeType", node_type)
                        .context(reference())
                        .contexts(contexts.iter().cloned()),
                );
            }
            return None;
        };

        if node.node_type() != node_type {
            if !self.reported_by_schema(relative, Some(node.node_type())) {
                collector.add(
                    ValidationIssue::builder(issue_types::NODE_REFERENCE_ERROR)
                        .summary("Referenced node has the wrong type")
                        .param("nodeId", id)
                        .param("expectedType", node_type)
                        .param("actualType", node.node_type())
                        .context(reference())
                        .contexts(contexts.iter().cloned()),
                );
            }
            return None;
        }
        Some(node)
    }
}
