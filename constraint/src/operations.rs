//! Operation inputs and outputs must name tensors.

use crate::support::{require_node_types, selection_item_path, BodyReferences};
use loom_core::jsonpath::json_path_member;
use loom_core::LoomResult;
use loom_environment::{LoomConstraint, LoomEnvironment};
use loom_graph::{node_types, LoomGraph, NodeRef, OperationNode, TensorSelection};
use loom_validation::{issue_types, CheckResult, Context, ValidationIssue, ValidationIssueCollector};
use std::collections::BTreeMap;

/// Every selection in an operation's inputs and outputs must name a tensor.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationNodesSourcesAndResultsAreTensorsConstraint;

impl OperationNodesSourcesAndResultsAreTensorsConstraint {
    fn check_io_map(
        graph: &LoomGraph,
        op: NodeRef<'_, OperationNode>,
        refs: &BodyReferences<'_>,
        map_name: &str,
        io_map: &BTreeMap<String, Vec<TensorSelection>>,
        collector: &mut ValidationIssueCollector,
    ) {
        for (io_name, selections) in io_map {
            for (idx, selection) in selections.iter().enumerate() {
                let item = selection_item_path(map_name, io_name, idx);
                let reference_path = json_path_member(&item, "tensorId");
                let relative = format!(".body{}", item.trim_start_matches('$'));
                let id = selection.tensor_id;

                let Some(target) = graph.get_node(id) else {
                    if !refs.reported_by_schema(&reference_path, None) {
                        collector.add(
                            ValidationIssue::builder(issue_types::NODE_REFERENCE_ERROR)
                                .summary(format!("Operation {relative} references non-existent node."))
                                .param("nodeType", node_types::OPERATION)
                                .context(
                                    Context::new("Reference")
                                        .with_message("Invalid reference to non-existent node.")
                                        .with_jsonpath(refs.path(&reference_path))
                                        .with_data(id),
                                )
                                .context(op.node().as_validation_context("Operation")),
                        );
                    }
                    continue;
                };

                if target.node_type() != node_types::TENSOR
                    && !refs.reported_by_schema(&reference_path, Some(target.node_type()))
                {
                    let mut reference = target.as_validation_context("Reference Node");
                    reference.message = Some(format!("The node referenced by {relative}"));
                    collector.add(
                        ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                            .summary(format!("Operation {relative} references non-tensor node."))
                            .param("nodeType", node_types::OPERATION)
                            .context(reference)
                            .context(op.node().as_validation_context("Operation")),
                    );
                }
            }
        }
    }
}

impl LoomConstraint for OperationNodesSourcesAndResultsAreTensorsConstraint {
    fn name(&self) -> &str {
        "OperationNodesSourcesAndResultsAreTensorsConstraint"
    }

    fn check_requirements(&self, env: &LoomEnvironment) -> LoomResult<()> {
        require_node_types(self.name(), env, &[node_types::TENSOR, node_types::OPERATION])
    }

    fn validate_constraint(
        &self,
        env: &LoomEnvironment,
        graph: &LoomGraph,
        collector: &mut ValidationIssueCollector,
    ) -> CheckResult {
        for op in graph.by_kind::<OperationNode>() {
            let refs = BodyReferences::new(env, op.node());
            Self::check_io_map(graph, op, &refs, "inputs", &op.body().inputs, collector);
            Self::check_io_map(graph, op, &refs, "outputs", &op.body().outputs, collector);
        }
        Ok(())
    }
}
