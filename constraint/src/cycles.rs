//! Feedback loops between tensors and the nodes that read and write them.

use crate::support::require_node_types;
use loom_core::LoomResult;
use loom_environment::{LoomConstraint, LoomEnvironment};
use loom_graph::traversal::find_operation_simple_cycles;
use loom_graph::{node_types, LoomGraph};
use loom_validation::{issue_types, CheckResult, Context, ValidationIssue, ValidationIssueCollector};
use serde_json::{Map, Value};

/// Reports every simple cycle in the tensor/operation link graph.
///
/// Dangling references are ignored here; they are reported by the
/// reference schemas.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTensorOperationCyclesConstraint;

impl LoomConstraint for NoTensorOperationCyclesConstraint {
    fn name(&self) -> &str {
        "NoTensorOperationCyclesConstraint"
    }

    fn check_requirements(&self, env: &LoomEnvironment) -> LoomResult<()> {
        require_node_types(self.name(), env, &[node_types::TENSOR, node_types::OPERATION])
    }

    fn validate_constraint(
        &self,
        _env: &LoomEnvironment,
        graph: &LoomGraph,
        collector: &mut ValidationIssueCollector,
    ) -> CheckResult {
        for cycle in find_operation_simple_cycles(graph) {
            let members: Vec<Value> = cycle
                .iter()
                .filter_map(|&id| graph.get_node(id))
                .map(|node| {
                    let mut desc = Map::new();
                    desc.insert("id".into(), Value::String(node.id().to_string()));
                    desc.insert("type".into(), Value::String(node.node_type().to_string()));
                    if let Some(label) = node.label() {
                        desc.insert("label".into(), Value::String(label.to_string()));
                    }
                    Value::Object(desc)
                })
                .collect();

            collector.add(
                ValidationIssue::builder(issue_types::REFERENCE_CYCLE_ERROR)
                    .summary("Reference Cycle detected")
                    .context(Context::new("Cycle").with_data(members)),
            );
        }
        Ok(())
    }
}
