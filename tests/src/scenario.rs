//! Scenario definition and runner.

use loom_constraint::EnvironmentConfig;
use loom_environment::LoomEnvironment;
use loom_graph::LoomGraph;
use loom_validation::ValidationReport;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::assertion::{ReportAssertion, ReportAssertionBuilder};
use crate::error::{ScenarioError, ScenarioResult};
use crate::loader::{fixtures_root, Fixture};

/// Everything a scenario produced, for further checks.
#[derive(Debug)]
pub struct Outcome {
    pub environment: LoomEnvironment,
    pub fixture: Fixture,
    pub graph: LoomGraph,
    pub report: ValidationReport,
}

/// A graph fixture validated against an environment config.
pub struct Scenario {
    /// Scenario name (for reporting).
    name: String,
    /// Path to the graph fixture.
    graph_path: Option<PathBuf>,
    /// Inline graph fixture.
    graph_source: Option<String>,
    /// Path to a YAML config; the default config is used otherwise.
    config_path: Option<PathBuf>,
    /// Inline YAML config.
    config_source: Option<String>,
    assertion: ReportAssertion,
    /// Base path for resolving relative paths.
    base_path: PathBuf,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph_path: None,
            graph_source: None,
            config_path: None,
            config_source: None,
            assertion: ReportAssertion::new(),
            base_path: fixtures_root(),
        }
    }

    /// Set the base path for resolving relative paths.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = path.into();
        self
    }

    /// Set the graph fixture path (relative to fixtures/).
    pub fn graph(mut self, path: impl Into<PathBuf>) -> Self {
        self.graph_path = Some(path.into());
        self
    }

    /// Use an inline graph fixture.
    pub fn graph_source(mut self, source: impl Into<String>) -> Self {
        self.graph_source = Some(source.into());
        self
    }

    /// Set the config path (relative to fixtures/).
    pub fn config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Use an inline YAML config.
    pub fn config_source(mut self, source: impl Into<String>) -> Self {
        self.config_source = Some(source.into());
        self
    }

    /// Set the expectations for the report.
    pub fn expect<F>(mut self, assertion_fn: F) -> Self
    where
        F: FnOnce(ReportAssertionBuilder) -> ReportAssertionBuilder,
    {
        self.assertion = assertion_fn(ReportAssertionBuilder::new()).build();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn load_config(&self) -> ScenarioResult<EnvironmentConfig> {
        if let Some(source) = &self.config_source {
            return Ok(EnvironmentConfig::from_yaml_str(source)?);
        }
        match &self.config_path {
            Some(path) => Ok(EnvironmentConfig::from_file(self.resolve_path(path))?),
            None => Ok(EnvironmentConfig::default()),
        }
    }

    pub fn load_fixture(&self) -> ScenarioResult<Fixture> {
        if let Some(source) = &self.graph_source {
            return Fixture::parse(source);
        }
        match &self.graph_path {
            Some(path) => Fixture::load(&self.resolve_path(path)),
            None => Err(ScenarioError::missing_graph(&self.name)),
        }
    }

    /// Build the environment, validate the graph and check the report.
    pub fn run(&self) -> ScenarioResult<Outcome> {
        let environment = self.load_config()?.build_environment()?;
        let fixture = self.load_fixture()?;
        let graph = fixture.graph()?;

        debug!(scenario = %self.name, nodes = graph.len(), "running scenario");
        let report = environment.validate(&graph)?;
        self.assertion.verify(&self.name, &report, &fixture)?;

        Ok(Outcome {
            environment,
            fixture,
            graph,
            report,
        })
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_scenario() {
        let outcome = Scenario::new("inline")
            .graph_source(
                r#"{"nodes": [{"id": "@n", "type": "NoteNode", "body": {"message": "hi"}}]}"#,
            )
            .expect(|r| r.valid())
            .run()
            .unwrap();
        assert_eq!(outcome.graph.len(), 1);
    }

    #[test]
    fn test_missing_graph_is_an_error() {
        let result = Scenario::new("empty").run();
        assert!(matches!(result, Err(ScenarioError::MissingGraph { .. })));
    }

    #[test]
    fn test_failed_expectation_reports_the_report() {
        let result = Scenario::new("wrong")
            .graph_source(r#"{"nodes": [{"id": "@n", "type": "Mystery", "body": {}}]}"#)
            .expect(|r| r.valid())
            .run();
        match result {
            Err(ScenarioError::AssertionFailed { message, .. }) => {
                assert!(message.contains("Unknown node type: Mystery"), "{message}");
            }
            other => panic!("expected assertion failure, got {other:?}"),
        }
    }
}
