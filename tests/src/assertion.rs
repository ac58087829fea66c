//! Assertions over validation reports.

use loom_validation::{param_text, ValidationIssue, ValidationReport};
use std::fmt;

use crate::error::{ScenarioError, ScenarioResult};
use crate::loader::Fixture;

/// Expectations for the report of one scenario.
///
/// String expectations may use `@name` to stand for a fixture node id.
#[derive(Default)]
pub struct ReportAssertion {
    pub valid: Option<bool>,
    pub issues: Option<usize>,
    pub issue_types: Option<Vec<String>>,
    pub summaries: Option<Vec<String>>,
    pub summary_patterns: Vec<String>,
    /// (issue index, context name)
    pub contexts: Vec<(usize, String)>,
    /// (issue index, key, value)
    pub params: Vec<(usize, String, String)>,

    #[allow(clippy::type_complexity)]
    pub custom: Option<Box<dyn Fn(&ValidationReport, &Fixture) -> bool + Send + Sync>>,
}

impl fmt::Debug for ReportAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportAssertion")
            .field("valid", &self.valid)
            .field("issues", &self.issues)
            .field("issue_types", &self.issue_types)
            .field("summaries", &self.summaries)
            .field("summary_patterns", &self.summary_patterns)
            .field("contexts", &self.contexts)
            .field("params", &self.params)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl ReportAssertion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the assertion against a report.
    pub fn verify(
        &self,
        scenario: &str,
        report: &ValidationReport,
        fixture: &Fixture,
    ) -> ScenarioResult<()> {
        let fail = |message: String| {
            Err(ScenarioError::assertion_failed(
                scenario,
                format!("{message}\n{}", report.to_text()),
            ))
        };

        if let Some(valid) = self.valid {
            if report.is_valid() != valid {
                return fail(format!("expected valid = {valid}"));
            }
        }

        if let Some(expected) = self.issues {
            if report.len() != expected {
                return fail(format!("expected {expected} issues, got {}", report.len()));
            }
        }

        if let Some(expected) = &self.issue_types {
            let actual: Vec<&str> = report.iter().map(|i| i.issue_type.as_str()).collect();
            if actual != *expected {
                return fail(format!("expected issue types {expected:?}, got {actual:?}"));
            }
        }

        if let Some(expected) = &self.summaries {
            let expected: Vec<String> = expected.iter().map(|s| substitute_all(fixture, s)).collect();
            let actual: Vec<&str> = report.iter().map(|i| i.summary.as_str()).collect();
            if actual != expected {
                return fail(format!("expected summaries {expected:?}, got {actual:?}"));
            }
        }

        for pattern in &self.summary_patterns {
            let re = regex_lite::Regex::new(pattern).map_err(|e| {
                ScenarioError::assertion_failed(scenario, format!("invalid pattern '{pattern}': {e}"))
            })?;
            if !report.iter().any(|i| re.is_match(&i.summary)) {
                return fail(format!("no summary matches /{pattern}/"));
            }
        }

        for (index, name) in &self.contexts {
            let issue = issue_at(scenario, report, *index)?;
            if issue.context(name).is_none() {
                return fail(format!("issue #{index} has no context '{name}'"));
            }
        }

        for (index, key, value) in &self.params {
            let issue = issue_at(scenario, report, *index)?;
            let expected = substitute_all(fixture, value);
            match issue.params.get(key) {
                Some(actual) if param_text(actual) == expected => {}
                actual => {
                    return fail(format!(
                        "issue #{index} param '{key}': expected {expected:?}, got {actual:?}"
                    ))
                }
            }
        }

        if let Some(check) = &self.custom {
            if !check(report, fixture) {
                return fail("custom assertion failed".to_string());
            }
        }

        Ok(())
    }
}

fn issue_at<'r>(
    scenario: &str,
    report: &'r ValidationReport,
    index: usize,
) -> ScenarioResult<&'r ValidationIssue> {
    report.issues().get(index).ok_or_else(|| {
        ScenarioError::assertion_failed(
            scenario,
            format!("issue #{index} does not exist; report has {}", report.len()),
        )
    })
}

/// Replace every `@name` word in `text` with its fixture id.
fn substitute_all(fixture: &Fixture, text: &str) -> String {
    text.split(' ')
        .map(|word| fixture.substitute(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fluent builder for [`ReportAssertion`].
#[derive(Debug, Default)]
pub struct ReportAssertionBuilder {
    assertion: ReportAssertion,
}

impl ReportAssertionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect no issues.
    pub fn valid(mut self) -> Self {
        self.assertion.valid = Some(true);
        self
    }

    /// Expect at least one issue.
    pub fn invalid(mut self) -> Self {
        self.assertion.valid = Some(false);
        self
    }

    pub fn issues(mut self, n: usize) -> Self {
        self.assertion.issues = Some(n);
        self
    }

    /// Expect exactly these issue types, in order.
    pub fn issue_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assertion.issue_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Expect exactly these summaries, in order.
    pub fn summaries<I, S>(mut self, summaries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assertion.summaries = Some(summaries.into_iter().map(Into::into).collect());
        self
    }

    /// Expect some summary to match `pattern`.
    pub fn summary_matches(mut self, pattern: impl Into<String>) -> Self {
        self.assertion.summary_patterns.push(pattern.into());
        self
    }

    /// Expect issue `index` to carry a context named `name`.
    pub fn context(mut self, index: usize, name: impl Into<String>) -> Self {
        self.assertion.contexts.push((index, name.into()));
        self
    }

    /// Expect issue `index` to carry param `key` = `value`.
    pub fn param(mut self, index: usize, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.assertion.params.push((index, key.into(), value.into()));
        self
    }

    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&ValidationReport, &Fixture) -> bool + Send + Sync + 'static,
    {
        self.assertion.custom = Some(Box::new(check));
        self
    }

    pub fn build(self) -> ReportAssertion {
        self.assertion
    }
}
