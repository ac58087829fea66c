//! Application output shards must write each operation output exactly once.

use crate::agreement::{application_shards, selection_context, shard_ranges_context};
use crate::support::{require_constraint, selection_item_path};
use crate::OperationApplicationAgreementConstraint;
use loom_core::{LoomResult, NodeId};
use loom_environment::{LoomConstraint, LoomEnvironment};
use loom_graph::{node_types, ApplicationNode, LoomGraph, NodeRef, OperationNode, TensorSelection};
use loom_validation::{issue_types, CheckResult, ValidationIssue, ValidationIssueCollector};
use loom_zspace::ZRange;

/// Reports operation outputs whose application ranges overlap or leave gaps.
///
/// Selections where a shard is missing or strays outside the operation range
/// are left to [`OperationApplicationAgreementConstraint`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationOutputRangeCoverageIsExactConstraint;

impl ApplicationOutputRangeCoverageIsExactConstraint {
    fn check_output(
        op: NodeRef<'_, OperationNode>,
        shards: &[NodeRef<'_, ApplicationNode>],
        io_name: &str,
        idx: usize,
        op_sel: &TensorSelection,
        collector: &mut ValidationIssueCollector,
    ) {
        let pieces: Vec<(NodeId, &ZRange)> = shards
            .iter()
            .filter_map(|shard| {
                let selection = shard.body().outputs.get(io_name)?.get(idx)?;
                Some((shard.id(), &selection.range))
            })
            .collect();
        if pieces.len() != shards.len() || pieces.iter().any(|(_, r)| !op_sel.range.contains(r)) {
            return;
        }

        let overlaps = pieces.iter().enumerate().any(|(i, (_, a))| {
            pieces[i + 1..]
                .iter()
                .any(|(_, b)| a.intersection(b).is_some_and(|r| !r.is_empty()))
        });
        let covered: i128 = pieces.iter().map(|(_, r)| i128::from(r.size())).sum();
        let expected = op_sel.range.size();

        let summary = if overlaps {
            format!("Overlapping Application output ranges for {io_name}[{idx}]")
        } else if covered < i128::from(expected) {
            format!("Application output ranges leave gaps in {io_name}[{idx}]")
        } else {
            return;
        };

        let item = selection_item_path("outputs", io_name, idx);
        collector.add(
            ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                .summary(summary)
                .param("nodeType", node_types::OPERATION)
                .param("expectedSize", expected)
                .param("coveredSize", covered)
                .context(selection_context("Operation Tensor Selection", op.node(), &item, op_sel))
                .context(shard_ranges_context(&pieces))
                .context(op.node().as_validation_context("Operation Node")),
        );
    }
}

impl LoomConstraint for ApplicationOutputRangeCoverageIsExactConstraint {
    fn name(&self) -> &str {
        "ApplicationOutputRangeCoverageIsExactConstraint"
    }

    fn check_requirements(&self, env: &LoomEnvironment) -> LoomResult<()> {
        require_constraint::<OperationApplicationAgreementConstraint>(
            self.name(),
            env,
            "OperationApplicationAgreementConstraint",
        )
    }

    fn validate_constraint(
        &self,
        _env: &LoomEnvironment,
        graph: &LoomGraph,
        collector: &mut ValidationIssueCollector,
    ) -> CheckResult {
        let shards = application_shards(graph);
        for op in graph.by_kind::<OperationNode>() {
            let Some(op_shards) = shards.get(&op.id()) else {
                continue;
            };
            for (io_name, group) in &op.body().outputs {
                for (idx, op_sel) in group.iter().enumerate() {
                    Self::check_output(op, op_shards, io_name, idx, op_sel, collector);
                }
            }
        }
        Ok(())
    }
}
