//! Well-formedness of tensor selections.

use crate::support::{
    require_node_types, selection_group_path, selection_item_path, BodyReferences,
};
use loom_core::jsonpath::json_path_member;
use loom_core::{LoomError, LoomResult};
use loom_environment::{LoomConstraint, LoomEnvironment};
use loom_graph::{node_types, ApplicationNode, LoomGraph, LoomNode, NodeRef, TensorNode, TensorSelection};
use loom_validation::{issue_types, CheckResult, Context, ValidationIssue, ValidationIssueCollector};
use regex_lite::Regex;
use std::collections::BTreeMap;

const IO_NAME_PATTERN: &str = "^[a-zA-Z_][a-zA-Z0-9_]*$";

/// Checks the tensor selections of one node against the tensors they name.
///
/// Each selection's tensor must exist, have the same number of dimensions as
/// the range, and contain it.
pub(crate) struct SelectionCheck<'a> {
    graph: &'a LoomGraph,
    node: &'a LoomNode,
    refs: BodyReferences<'a>,
    contexts: Vec<Context>,
}

impl<'a> SelectionCheck<'a> {
    /// `context_name` labels the checked node in every issue.
    pub(crate) fn new(
        env: &'a LoomEnvironment,
        graph: &'a LoomGraph,
        node: &'a LoomNode,
        context_name: &str,
    ) -> Self {
        Self {
            graph,
            node,
            refs: BodyReferences::new(env, node),
            contexts: vec![node.as_validation_context(context_name)],
        }
    }

    pub(crate) fn refs(&self) -> &BodyReferences<'a> {
        &self.refs
    }

    pub(crate) fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// Check every selection of a selection map.
    pub(crate) fn check_map(
        &self,
        map_name: &str,
        selections: &BTreeMap<String, Vec<TensorSelection>>,
        collector: &mut ValidationIssueCollector,
    ) {
        for (io_name, group) in selections {
            for (idx, selection) in group.iter().enumerate() {
                self.check_selection(&selection_item_path(map_name, io_name, idx), selection, collector);
            }
        }
    }

    /// Check one selection; `item` is its body-relative path.
    pub(crate) fn check_selection(
        &self,
        item: &str,
        selection: &TensorSelection,
        collector: &mut ValidationIssueCollector,
    ) {
        let reference_path = json_path_member(item, "tensorId");
        let Some(target) = self.refs.resolve(
            self.graph,
            selection.tensor_id,
            node_types::TENSOR,
            &reference_path,
            collector,
            &self.contexts,
        ) else {
            return;
        };
        // An undecoded tensor body or a bad origin is reported by the tensor checks.
        let Ok(tensor) = target.body_as::<TensorNode>() else {
            return;
        };
        let Ok(tensor_range) = tensor.effective_range() else {
            return;
        };

        let range = &selection.range;
        let range_context = Context::new("Selection Range")
            .with_jsonpath(self.refs.path(item))
            .with_data(range);

        if range.ndim() != tensor_range.ndim() {
            collector.add(
                ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                    .summary("Tensor selection has the wrong number of dimensions")
                    .param("nodeType", self.node.node_type())
                    .param("expectedDimensions", range.ndim())
                    .param("actualDimensions", tensor_range.ndim())
                    .context(range_context)
                    .context(target.as_validation_context("Tensor Node"))
                    .contexts(self.contexts.iter().cloned()),
            );
            return;
        }

        if !tensor_range.contains(range) {
            collector.add(
                ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                    .summary("Tensor selection is out of bounds")
                    .param("nodeType", self.node.node_type())
                    .context(range_context)
                    .context(target.as_validation_context("Tensor Node"))
                    .contexts(self.contexts.iter().cloned()),
            );
        }
    }
}

/// Checks every application's operation reference and tensor selections.
///
/// For each selection group: the name must be an identifier and the group
/// non-empty. Each selection is then checked against its tensor.
#[derive(Debug, Clone)]
pub struct ApplicationNodeSelectionsAreWellFormedConstraint {
    io_name: Regex,
}

impl ApplicationNodeSelectionsAreWellFormedConstraint {
    /// Selection names must be identifiers.
    pub fn new() -> LoomResult<Self> {
        Self::with_io_name_pattern(IO_NAME_PATTERN)
    }

    /// Selection names must match `pattern`.
    pub fn with_io_name_pattern(pattern: &str) -> LoomResult<Self> {
        let io_name = Regex::new(pattern)
            .map_err(|err| LoomError::config(format!("invalid IO name pattern {pattern:?}: {err}")))?;
        Ok(Self { io_name })
    }

    fn check_application(
        &self,
        env: &LoomEnvironment,
        graph: &LoomGraph,
        app: NodeRef<'_, ApplicationNode>,
        collector: &mut ValidationIssueCollector,
    ) {
        let check = SelectionCheck::new(env, graph, app.node(), "Application Node");

        check.refs().resolve(
            graph,
            app.body().operation_id,
            node_types::OPERATION,
            "$.operationId",
            collector,
            check.contexts(),
        );

        self.check_selection_map(&check, "inputs", &app.body().inputs, collector);
        self.check_selection_map(&check, "outputs", &app.body().outputs, collector);
    }

    fn check_selection_map(
        &self,
        check: &SelectionCheck<'_>,
        map_name: &str,
        selections: &BTreeMap<String, Vec<TensorSelection>>,
        collector: &mut ValidationIssueCollector,
    ) {
        for (io_name, group) in selections {
            let field_path = check.refs().path(&selection_group_path(map_name, io_name));

            if !self.io_name.is_match(io_name) {
                collector.add(
                    ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                        .summary(format!("Selection name is not an identifier: {io_name}"))
                        .param("nodeType", node_types::APPLICATION)
                        .param("pattern", self.io_name.as_str())
                        .context(Context::new("Selection Group").with_jsonpath(&field_path))
                        .contexts(check.contexts().iter().cloned()),
                );
            }

            if group.is_empty() {
                collector.add(
                    ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                        .summary(format!("Selection group is empty: {io_name}"))
                        .param("nodeType", node_types::APPLICATION)
                        .context(Context::new("Selection Group").with_jsonpath(&field_path))
                        .contexts(check.contexts().iter().cloned()),
                );
            }

            for (idx, selection) in group.iter().enumerate() {
                check.check_selection(&selection_item_path(map_name, io_name, idx), selection, collector);
            }
        }
    }
}

impl LoomConstraint for ApplicationNodeSelectionsAreWellFormedConstraint {
    fn name(&self) -> &str {
        "ApplicationNodeSelectionsAreWellFormedConstraint"
    }

    fn check_requirements(&self, env: &LoomEnvironment) -> LoomResult<()> {
        require_node_types(self.name(), env, &[node_types::TENSOR, node_types::APPLICATION])
    }

    fn validate_constraint(
        &self,
        env: &LoomEnvironment,
        graph: &LoomGraph,
        collector: &mut ValidationIssueCollector,
    ) -> CheckResult {
        for app in graph.by_kind::<ApplicationNode>() {
            self.check_application(env, graph, app, collector);
        }
        Ok(())
    }
}
