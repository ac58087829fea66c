//! Programming-error types for Loom.
//!
//! These describe misuse of the API itself. They are never collected into a
//! validation report; data-validity problems are reported as issues instead.

use crate::{GraphId, NodeId};
use thiserror::Error;

/// Errors raised by API misuse.
#[derive(Debug, Error)]
pub enum LoomError {
    /// The node is already owned by a graph.
    #[error("Node already belongs to a graph: {id} (owner {owner})")]
    NodeAlreadyOwned { id: NodeId, owner: GraphId },

    /// A node with the same id is already present.
    #[error("Graph already has node with id: {0}")]
    DuplicateNodeId(NodeId),

    /// A required node is absent.
    #[error("Node not found: {0}")]
    MissingNode(NodeId),

    /// The node exists but is not of the requested kind.
    #[error("Node {id} has type {actual}, expected {expected}")]
    KindMismatch {
        id: NodeId,
        expected: String,
        actual: String,
    },

    /// The node carries a body that did not decode into its typed form.
    #[error("Node {id} of type {node_type} has an undecoded body")]
    UndecodedBody { id: NodeId, node_type: String },

    /// A type name was registered twice.
    #[error("Duplicate type name: {0}")]
    DuplicateType(String),

    /// A type is required but not registered.
    #[error("Unsupported node type: {0}")]
    UnsupportedType(String),

    /// A JSON schema failed to compile.
    #[error("Invalid schema for {name}: {message}")]
    InvalidSchema { name: String, message: String },

    /// A JSON path expression failed to parse.
    #[error("Invalid JSON path {path:?}: {message}")]
    InvalidJsonPath { path: String, message: String },

    /// A constraint's requirements are not met by the environment.
    #[error("Constraint {constraint} requires {requirement}")]
    MissingRequirement {
        constraint: String,
        requirement: String,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LoomError {
    /// Create a kind-mismatch error.
    pub fn kind_mismatch(
        id: NodeId,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::KindMismatch {
            id,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid-schema error.
    pub fn invalid_schema(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-path error.
    pub fn invalid_json_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidJsonPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a missing-requirement error.
    pub fn missing_requirement(
        constraint: impl Into<String>,
        requirement: impl Into<String>,
    ) -> Self {
        Self::MissingRequirement {
            constraint: constraint.into(),
            requirement: requirement.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type for Loom API operations.
pub type LoomResult<T> = Result<T, LoomError>;
