//! Whole-graph constraints and per-type checks.

use crate::LoomEnvironment;
use loom_core::LoomResult;
use loom_graph::{LoomGraph, LoomNode};
use loom_validation::{CheckResult, ValidationIssueCollector};
use std::sync::Arc;

/// A whole-graph validation rule.
///
/// Constraints are stateless with respect to each other: each one reads the
/// environment and graph and reports into the collector.
pub trait LoomConstraint: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Check that the environment provides what this constraint needs.
    ///
    /// Runs once, when the environment is built.
    fn check_requirements(&self, _env: &LoomEnvironment) -> LoomResult<()> {
        Ok(())
    }

    fn validate_constraint(
        &self,
        env: &LoomEnvironment,
        graph: &LoomGraph,
        collector: &mut ValidationIssueCollector,
    ) -> CheckResult;
}

/// A custom check run on every node of one type, after its schema check.
pub type NodeCheck = Arc<
    dyn Fn(&LoomEnvironment, &LoomGraph, &LoomNode, &mut ValidationIssueCollector) -> CheckResult
        + Send
        + Sync,
>;
