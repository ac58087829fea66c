//! The tensor-ops dialect: tensors, operations, applications and notes.

use crate::{check_tensor_node, EnvironmentConfig};
use loom_core::LoomResult;
use loom_environment::{EnvironmentBuilder, LoomEnvironment};
use loom_graph::node_types;
use serde_json::{json, Value};

/// Body schemas of the dialect's node types.
pub mod body_schemas {
    use super::*;

    pub fn tensor() -> Value {
        json!({
            "type": "object",
            "properties": {
                "dtype": {"type": "string"},
                "shape": {
                    "type": "array",
                    "items": {"type": "integer", "minimum": 1}
                },
                "origin": {
                    "type": "array",
                    "items": {"type": "integer"}
                }
            },
            "required": ["dtype", "shape"],
            "additionalProperties": false
        })
    }

    /// The `$defs` shared by operation and application bodies.
    fn selection_defs() -> Value {
        json!({
            "TensorSelectionMap": {
                "type": "object",
                "additionalProperties": {
                    "type": "array",
                    "items": {"$ref": "#/$defs/TensorSelection"}
                }
            },
            "TensorSelection": {
                "type": "object",
                "properties": {
                    "tensorId": {"type": "string"},
                    "range": {"$ref": "#/$defs/ZRange"}
                },
                "required": ["tensorId", "range"],
                "additionalProperties": false
            },
            "ZRange": {
                "type": "object",
                "properties": {
                    "start": {"$ref": "#/$defs/ZPoint"},
                    "end": {"$ref": "#/$defs/ZPoint"}
                },
                "required": ["start", "end"]
            },
            "ZPoint": {"type": "array", "items": {"type": "integer"}}
        })
    }

    pub fn operation() -> Value {
        json!({
            "type": "object",
            "properties": {
                "opName": {"type": "string", "pattern": "^[a-zA-Z_][a-zA-Z0-9_]*$"},
                "params": {
                    "type": "object",
                    "patternProperties": {"^[a-zA-Z_][a-zA-Z0-9_]*$": {}},
                    "additionalProperties": false
                },
                "inputs": {"$ref": "#/$defs/TensorSelectionMap"},
                "outputs": {"$ref": "#/$defs/TensorSelectionMap"}
            },
            "required": ["opName", "inputs", "outputs"],
            "additionalProperties": false,
            "$defs": selection_defs()
        })
    }

    /// Selection names and group sizes are left to the selections constraint.
    pub fn application() -> Value {
        json!({
            "type": "object",
            "properties": {
                "operationId": {"type": "string"},
                "inputs": {"$ref": "#/$defs/TensorSelectionMap"},
                "outputs": {"$ref": "#/$defs/TensorSelectionMap"}
            },
            "required": ["operationId"],
            "additionalProperties": false,
            "$defs": selection_defs()
        })
    }

    pub fn note() -> Value {
        json!({
            "type": "object",
            "properties": {"message": {"type": "string"}},
            "required": ["message"],
            "additionalProperties": false
        })
    }
}

/// Register the dialect's four node types with their schemas and checks.
///
/// Selection `tensorId`s are declared as references to tensors and an
/// application's `operationId` as a reference to an operation.
pub fn register_tensor_ops_types(builder: &mut EnvironmentBuilder) -> LoomResult<()> {
    builder
        .register_type(node_types::TENSOR)
        .json_schema(body_schemas::tensor())
        .check(check_tensor_node)
        .done()?;
    builder
        .register_type(node_types::OPERATION)
        .json_schema(body_schemas::operation())
        .reference("inputs", ["$.inputs.*[*].tensorId"], [node_types::TENSOR])
        .reference("outputs", ["$.outputs.*[*].tensorId"], [node_types::TENSOR])
        .done()?;
    builder
        .register_type(node_types::APPLICATION)
        .json_schema(body_schemas::application())
        .reference("operation", ["$.operationId"], [node_types::OPERATION])
        .reference("inputs", ["$.inputs.*[*].tensorId"], [node_types::TENSOR])
        .reference("outputs", ["$.outputs.*[*].tensorId"], [node_types::TENSOR])
        .done()?;
    builder
        .register_type(node_types::NOTE)
        .json_schema(body_schemas::note())
        .done()?;
    Ok(())
}

/// The tensor-ops environment with the default configuration.
pub fn tensor_ops_environment() -> LoomResult<LoomEnvironment> {
    EnvironmentConfig::default().build_environment()
}
