use crate::{IssueFormatter, LoomValidationError, TextFormatter, ValidationIssue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ordered result of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// True iff no issues were reported.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationIssue> {
        self.issues.iter()
    }

    /// Issues of a given type, in report order.
    pub fn of_type<'a>(&'a self, issue_type: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |i| i.issue_type == issue_type)
    }

    /// Render with the default text formatter.
    pub fn to_text(&self) -> String {
        TextFormatter.format_issue_list(&self.issues)
    }

    /// Promote a non-empty report to an aggregate error.
    pub fn into_result(self) -> Result<(), LoomValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(LoomValidationError::new(self.issues))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl IntoIterator for ValidationReport {
    type Item = ValidationIssue;
    type IntoIter = std::vec::IntoIter<ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a ValidationIssue;
    type IntoIter = std::slice::Iter<'a, ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}
