//! Tensor dtype allow-list.

use crate::support::require_node_types;
use loom_core::LoomResult;
use loom_environment::{LoomConstraint, LoomEnvironment};
use loom_graph::{node_types, LoomGraph, TensorNode};
use loom_validation::{issue_types, CheckResult, ValidationIssue, ValidationIssueCollector};
use std::collections::BTreeSet;

/// Rejects tensors whose dtype is not in the configured set.
#[derive(Debug, Clone)]
pub struct TensorDTypesAreValidConstraint {
    valid_dtypes: BTreeSet<String>,
}

impl TensorDTypesAreValidConstraint {
    pub fn new<I, S>(valid_dtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            valid_dtypes: valid_dtypes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn valid_dtypes(&self) -> &BTreeSet<String> {
        &self.valid_dtypes
    }
}

impl Default for TensorDTypesAreValidConstraint {
    fn default() -> Self {
        Self::new(["int32", "float32"])
    }
}

impl LoomConstraint for TensorDTypesAreValidConstraint {
    fn name(&self) -> &str {
        "TensorDTypesAreValidConstraint"
    }

    fn check_requirements(&self, env: &LoomEnvironment) -> LoomResult<()> {
        require_node_types(self.name(), env, &[node_types::TENSOR])
    }

    fn validate_constraint(
        &self,
        _env: &LoomEnvironment,
        graph: &LoomGraph,
        collector: &mut ValidationIssueCollector,
    ) -> CheckResult {
        for tensor in graph.by_kind::<TensorNode>() {
            let dtype = &tensor.body().dtype;
            if !self.valid_dtypes.contains(dtype) {
                collector.add(
                    ValidationIssue::builder(issue_types::NODE_VALIDATION_ERROR)
                        .summary(format!("Tensor dtype ({dtype}) not a recognized type"))
                        .param("nodeType", node_types::TENSOR)
                        .context(tensor.node().as_validation_context("Tensor")),
                );
            }
        }
        Ok(())
    }
}
