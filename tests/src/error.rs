//! Error types for the scenario framework.

use loom_core::LoomError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors that can occur when running scenarios.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Failed to read a file.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A fixture is not valid JSON.
    #[error("failed to parse fixture '{path}': {message}")]
    FixtureParse { path: PathBuf, message: String },

    /// A fixture name was used that the fixture never declared.
    #[error("fixture has no node named '@{name}'")]
    UnknownFixtureName { name: String },

    /// No graph was given.
    #[error("graph not specified for scenario '{scenario}'")]
    MissingGraph { scenario: String },

    /// Assertion failed.
    #[error("assertion failed for scenario '{scenario}': {message}")]
    AssertionFailed { scenario: String, message: String },

    /// Building the environment or loading the graph failed.
    #[error("loom error: {0}")]
    Loom(#[from] LoomError),
}

impl ScenarioError {
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn fixture_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FixtureParse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn missing_graph(scenario: impl Into<String>) -> Self {
        Self::MissingGraph {
            scenario: scenario.into(),
        }
    }

    pub fn assertion_failed(scenario: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            scenario: scenario.into(),
            message: message.into(),
        }
    }
}
