//! Agreement between operations, the tensors they select, and the
//! applications that shard them.

use crate::selections::SelectionCheck;
use crate::support::{body_path, require_constraint, require_node_types, selection_item_path};
use loom_core::{LoomResult, NodeId};
use loom_environment::{LoomConstraint, LoomEnvironment};
use loom_graph::{
    node_types, ApplicationNode, LoomGraph, LoomNode, NodeRef, OperationNode, SelectionMap,
    TensorSelection,
};
use loom_validation::{
    display_list, issue_types, CheckResult, Context, ValidationIssue, ValidationIssueCollector,
};
use loom_zspace::ZRange;
use std::collections::BTreeMap;

/// Every operation selection must fit the tensor it names.
#[derive(Debug, Clone, Copy, Default)]
pub struct TensorOperationAgreementConstraint;

impl LoomConstraint for TensorOperationAgreementConstraint {
    fn name(&self) -> &str {
        "TensorOperationAgreementConstraint"
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
            let check = SelectionCheck::new(env, graph, op.node(), "Operation Node");
            for (map_name, selections) in op.body().io_maps() {
                check.check_map(map_name, selections, collector);
            }
        }
        Ok(())
    }
}

/// Applications grouped by the id of the operation they apply.
pub(crate) fn application_shards(
    graph: &LoomGraph,
) -> BTreeMap<NodeId, Vec<NodeRef<'_, ApplicationNode>>> {
    let mut shards: BTreeMap<NodeId, Vec<NodeRef<'_, ApplicationNode>>> = BTreeMap::new();
    for app in graph.by_kind::<ApplicationNode>() {
        shards.entry(app.body().operation_id).or_default().push(app);
    }
    shards
}

pub(crate) fn selection_context(
    name: &str,
    node: &LoomNode,
    item: &str,
    selection: &TensorSelection,
) -> Context {
    Context::new(name)
        .with_jsonpath(body_path(node, item))
        .with_data(selection)
}

/// Shard id to range, for the `Application Shard Ranges` context.
pub(crate) fn shard_ranges_context(pieces: &[(NodeId, &ZRange)]) -> Context {
    let ranges: BTreeMap<String, &ZRange> = pieces
        .iter()
        .map(|(id, range)| (id.to_string(), *range))
        .collect();
    Context::new("Application Shard Ranges").with_data(ranges)
}

/// Every operation is applied by at least one application, and its
/// applications agree with it.
///
/// Each application must use the same IO names and selection counts, select
/// the same tensors, and stay inside the operation's ranges. When every
/// application agrees, the applications together must span each operation
/// range.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationApplicationAgreementConstraint;

impl OperationApplicationAgreementConstraint {
    fn check_operation(
        op: NodeRef<'_, OperationNode>,
        shards: &[NodeRef<'_, ApplicationNode>],
        collector: &mut ValidationIssueCollector,
    ) {
        if shards.is_empty() {
            collector.add(
                ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                    .summary("Operation has no Application shards")
                    .param("nodeType", node_types::OPERATION)
                    .context(op.node().as_validation_context("Operation Node")),
            );
            return;
        }

        let mut agree = true;
        for &shard in shards {
            for ((map_name, op_map), (_, app_map)) in
                op.body().io_maps().into_iter().zip(shard.body().io_maps())
            {
                agree &= Self::check_shard(op, shard, map_name, op_map, app_map, collector);
            }
        }
        if !agree {
            return;
        }

        for (position, (map_name, op_map)) in op.body().io_maps().into_iter().enumerate() {
            Self::check_span(op, shards, position, map_name, op_map, collector);
        }
    }

    /// Returns false if any issue was added.
    fn check_shard(
        op: NodeRef<'_, OperationNode>,
        app: NodeRef<'_, ApplicationNode>,
        map_name: &str,
        op_map: &SelectionMap,
        app_map: &SelectionMap,
        collector: &mut ValidationIssueCollector,
    ) -> bool {
        let nodes = [
            app.node().as_validation_context("Application Node"),
            op.node().as_validation_context("Operation Node"),
        ];

        let op_keys: Vec<&str> = op_map.keys().map(String::as_str).collect();
        let app_keys: Vec<&str> = app_map.keys().map(String::as_str).collect();
        if op_keys != app_keys {
            collector.add(
                ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                    .summary(format!(
                        "Application {map_name} keys {} != Operation {map_name} keys {}",
                        display_list(&app_keys),
                        display_list(&op_keys)
                    ))
                    .param("nodeType", node_types::APPLICATION)
                    .param("applicationKeys", &app_keys)
                    .param("operationKeys", &op_keys)
                    .contexts(nodes.iter().cloned()),
            );
            return false;
        }

        let mut agree = true;
        for ((io_name, app_group), op_group) in app_map.iter().zip(op_map.values()) {
            if app_group.len() != op_group.len() {
                collector.add(
                    ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                        .summary(format!(
                            "Application {map_name}.{io_name} has {} selections, Operation has {}",
                            app_group.len(),
                            op_group.len()
                        ))
                        .param("nodeType", node_types::APPLICATION)
                        .param("ioName", io_name)
                        .param("applicationCount", app_group.len())
                        .param("operationCount", op_group.len())
                        .contexts(nodes.iter().cloned()),
                );
                agree = false;
                continue;
            }

            for (idx, (app_sel, op_sel)) in app_group.iter().zip(op_group).enumerate() {
                let item = selection_item_path(map_name, io_name, idx);
                let selections = [
                    selection_context("Application Tensor Selection", app.node(), &item, app_sel),
                    selection_context("Operation Tensor Selection", op.node(), &item, op_sel),
                ];

                let summary = if app_sel.tensor_id != op_sel.tensor_id {
                    "Application selection names a different tensor than the Operation"
                } else if !op_sel.range.contains(&app_sel.range) {
                    "Application selection range is outside the Operation selection range"
                } else {
                    continue;
                };
                collector.add(
                    ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                        .summary(summary)
                        .param("nodeType", node_types::APPLICATION)
                        .contexts(selections)
                        .contexts(nodes.iter().cloned()),
                );
                agree = false;
            }
        }
        agree
    }

    /// The bounding range of the shard ranges must equal each operation range.
    fn check_span(
        op: NodeRef<'_, OperationNode>,
        shards: &[NodeRef<'_, ApplicationNode>],
        position: usize,
        map_name: &str,
        op_map: &SelectionMap,
        collector: &mut ValidationIssueCollector,
    ) {
        for (io_name, op_group) in op_map {
            for (idx, op_sel) in op_group.iter().enumerate() {
                let pieces: Vec<(NodeId, &ZRange)> = shards
                    .iter()
                    .filter_map(|shard| {
                        let (_, map) = shard.body().io_maps()[position];
                        let selection = map.get(io_name)?.get(idx)?;
                        Some((shard.id(), &selection.range))
                    })
                    .collect();

                let bounds = ZRange::bounding_range(pieces.iter().map(|(_, range)| *range));
                if matches!(&bounds, Ok(Some(b)) if *b == op_sel.range) {
                    continue;
                }

                let item = selection_item_path(map_name, io_name, idx);
                collector.add(
                    ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                        .summary(format!(
                            "Application shards do not span Operation {map_name}.{io_name}[{idx}]"
                        ))
                        .param("nodeType", node_types::OPERATION)
                        .context(selection_context(
                            "Operation Tensor Selection",
                            op.node(),
                            &item,
                            op_sel,
                        ))
                        .context(shard_ranges_context(&pieces))
                        .context(op.node().as_validation_context("Operation Node")),
                );
            }
        }
    }
}

impl LoomConstraint for OperationApplicationAgreementConstraint {
    fn name(&self) -> &str {
        "OperationApplicationAgreementConstraint"
    }

    fn check_requirements(&self, env: &LoomEnvironment) -> LoomResult<()> {
        require_node_types(
            self.name(),
            env,
            &[node_types::TENSOR, node_types::OPERATION, node_types::APPLICATION],
        )?;
        require_constraint::<TensorOperationAgreementConstraint>(
            self.name(),
            env,
            "TensorOperationAgreementConstraint",
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
            let op_shards = shards.get(&op.id()).map(Vec::as_slice).unwrap_or_default();
            Self::check_operation(op, op_shards, collector);
        }
        Ok(())
    }
}
