//! Failure types for validation checks.

use crate::{IssueFormatter, TextFormatter, ValidationIssue};
use loom_core::LoomError;
use std::fmt;
use thiserror::Error;

/// Aggregate data-validity failure carrying every collected issue in order.
///
/// Displays as the rendered text report.
#[derive(Debug, Clone, PartialEq)]
pub struct LoomValidationError {
    issues: Vec<ValidationIssue>,
}

impl LoomValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

impl fmt::Display for LoomValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&TextFormatter.format_issue_list(&self.issues))
    }
}

impl std::error::Error for LoomValidationError {}

impl From<ValidationIssue> for LoomValidationError {
    fn from(issue: ValidationIssue) -> Self {
        Self::new(vec![issue])
    }
}

/// Outcome of a failed check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The data is invalid; the issues are collected.
    #[error(transparent)]
    Invalid(#[from] LoomValidationError),

    /// The API was misused; this propagates immediately.
    #[error(transparent)]
    Fatal(#[from] LoomError),
}

impl CheckError {
    /// Short-hand for an invalid outcome with a single issue.
    pub fn invalid(issue: impl Into<ValidationIssue>) -> Self {
        Self::Invalid(LoomValidationError::from(issue.into()))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Result type for validation checks.
pub type CheckResult<T = ()> = Result<T, CheckError>;
