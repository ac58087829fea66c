//! Every tensor is produced by exactly one operation.

use crate::support::require_constraint;
use crate::OperationNodesSourcesAndResultsAreTensorsConstraint;
use loom_core::LoomResult;
use loom_environment::{LoomConstraint, LoomEnvironment};
use loom_graph::{node_types, LoomGraph, NodeRef, OperationNode, TensorNode};
use loom_validation::{issue_types, CheckResult, ValidationIssue, ValidationIssueCollector};

/// Reports tensors with no producing operation, or with more than one.
///
/// Relies on operation outputs already being checked to name tensors, so the
/// environment must also carry
/// [`OperationNodesSourcesAndResultsAreTensorsConstraint`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AllTensorsHaveExactlyOneSourceConstraint;

impl AllTensorsHaveExactlyOneSourceConstraint {
    fn check_tensor(
        graph: &LoomGraph,
        tensor: NodeRef<'_, TensorNode>,
        collector: &mut ValidationIssueCollector,
    ) {
        let id = tensor.id();
        let mut sources: Vec<NodeRef<'_, OperationNode>> = graph
            .by_kind::<OperationNode>()
            .filter(|op| op.body().produces(id))
            .collect();

        if sources.len() == 1 {
            return;
        }

        let desc = match tensor.label() {
            Some(label) => format!("Tensor ({label})"),
            None => "Tensor".to_string(),
        };

        let mut issue = ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
            .param("nodeType", node_types::TENSOR)
            .context(tensor.node().as_validation_context("Tensor"));

        if sources.is_empty() {
            issue = issue.summary(format!("{desc} has no Operation source"));
        } else {
            issue = issue
                .summary(format!("{desc} has too many Operation sources: {}", sources.len()))
                .message(format!("Tensor id: {id}"));

            sources.sort_by_key(|op| op.label().map_or_else(|| op.id().to_string(), str::to_string));
            for (idx, op) in sources.iter().enumerate() {
                let name = match op.label() {
                    Some(label) => format!("Source Operation #{idx} ({label})"),
                    None => format!("Source Operation #{idx}"),
                };
                issue = issue.context(op.node().as_validation_context(name));
            }
        }

        collector.add(issue);
    }
}

impl LoomConstraint for AllTensorsHaveExactlyOneSourceConstraint {
    fn name(&self) -> &str {
        "AllTensorsHaveExactlyOneSourceConstraint"
    }

    fn check_requirements(&self, env: &LoomEnvironment) -> LoomResult<()> {
        require_constraint::<OperationNodesSourcesAndResultsAreTensorsConstraint>(
            self.name(),
            env,
            "OperationNodesSourcesAndResultsAreTensorsConstraint",
        )
    }

    fn validate_constraint(
        &self,
        _env: &LoomEnvironment,
        graph: &LoomGraph,
        collector: &mut ValidationIssueCollector,
    ) -> CheckResult {
        for tensor in graph.by_kind::<TensorNode>() {
            Self::check_tensor(graph, tensor, collector);
        }
        Ok(())
    }
}
