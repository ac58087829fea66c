//! Issue accumulation.

use crate::{CheckError, CheckResult, LoomValidationError, ValidationIssue, ValidationReport};
use loom_core::LoomResult;

/// Accumulates issues from many independent checks.
///
/// Checks run through [`collect`](Self::collect): invalid outcomes are appended
/// and execution continues; fatal outcomes propagate to the caller.
#[derive(Debug, Clone, Default)]
pub struct ValidationIssueCollector {
    issues: Vec<ValidationIssue>,
}

impl ValidationIssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an issue.
    pub fn add(&mut self, issue: impl Into<ValidationIssue>) {
        self.issues.push(issue.into());
    }

    pub fn add_all(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Run a check against this collector.
    ///
    /// An `Invalid` outcome is absorbed into the collector; a `Fatal` outcome
    /// is returned as-is.
    pub fn collect<F>(&mut self, check: F) -> LoomResult<()>
    where
        F: FnOnce(&mut Self) -> CheckResult,
    {
        match check(self) {
            Ok(()) => Ok(()),
            Err(CheckError::Invalid(err)) => {
                self.issues.extend(err.into_issues());
                Ok(())
            }
            Err(CheckError::Fatal(err)) => Err(err),
        }
    }

    /// Fail with a single aggregate error if anything was collected.
    pub fn check(&self) -> Result<(), LoomValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(LoomValidationError::new(self.issues.clone()))
        }
    }

    pub fn into_report(self) -> ValidationReport {
        ValidationReport::new(self.issues)
    }
}
