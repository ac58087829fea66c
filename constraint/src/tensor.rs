//! Per-node checks for tensor bodies.

use loom_environment::LoomEnvironment;
use loom_graph::{LoomGraph, LoomNode, TensorBody, TensorNode};
use loom_validation::{issue_types, CheckResult, ValidationIssue, ValidationIssueCollector};
use loom_zspace::ZSpaceError;

/// Structural checks on a tensor body that its schema cannot express.
pub fn validate_tensor_body(body: &TensorBody, collector: &mut ValidationIssueCollector) {
    if !body.shape.is_strictly_positive() {
        collector.add(
            ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                .summary(format!("shape must be positive and non-empty: {}", body.shape)),
        );
    }

    if let Some(origin) = &body.origin {
        if origin.ndim() != body.shape.ndim() {
            collector.add(
                ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                    .summary(format!(
                        "origin {origin} dimensions != shape {} dimensions",
                        body.shape
                    )),
            );
            return;
        }
    }

    if let Err(err @ ZSpaceError::Overflow(_)) = body.effective_range() {
        collector.add(
            ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                .summary(format!("tensor range is not representable: {err}")),
        );
    }
}

/// The custom check registered for `TensorNode`.
///
/// Nodes whose body did not decode are skipped; their schema issues
/// already describe the problem.
pub fn check_tensor_node(
    _env: &LoomEnvironment,
    _graph: &LoomGraph,
    node: &LoomNode,
    collector: &mut ValidationIssueCollector,
) -> CheckResult {
    let Ok(body) = node.body_as::<TensorNode>() else {
        return Ok(());
    };
    let mut local = ValidationIssueCollector::new();
    validate_tensor_body(body, &mut local);
    for mut issue in local.into_report() {
        issue.contexts.push(node.as_validation_context("Tensor"));
        collector.add(issue);
    }
    Ok(())
}
