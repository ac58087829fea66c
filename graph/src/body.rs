//! Node bodies and node kinds.
//!
//! Every known node kind has exactly one typed body. Bodies of unknown kinds,
//! and bodies that fail to decode into their typed form, are kept as raw JSON
//! so that validation can still inspect and report on them.

use loom_core::NodeId;
use loom_zspace::{ZPoint, ZRange, ZSpaceResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named lists of tensor selections, keyed by IO name.
pub type SelectionMap = BTreeMap<String, Vec<TensorSelection>>;

/// Type names of the built-in node kinds.
pub mod node_types {
    pub const TENSOR: &str = "TensorNode";
    pub const OPERATION: &str = "OperationNode";
    pub const APPLICATION: &str = "ApplicationNode";
    pub const NOTE: &str = "NoteNode";
}

/// A tensor: dtype plus a shape placed at an optional origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TensorBody {
    pub dtype: String,
    pub shape: ZPoint,
    /// Defaults to zeros; must have the same dimensions as `shape`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<ZPoint>,
}

impl TensorBody {
    pub fn new(dtype: impl Into<String>, shape: impl Into<ZPoint>) -> Self {
        Self {
            dtype: dtype.into(),
            shape: shape.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<ZPoint>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn effective_origin(&self) -> ZPoint {
        self.origin
            .clone()
            .unwrap_or_else(|| ZPoint::zeros(self.shape.ndim()))
    }

    /// The coordinate range `[origin, origin + shape)`.
    pub fn effective_range(&self) -> ZSpaceResult<ZRange> {
        ZRange::from_start_with_shape(self.effective_origin(), self.shape.clone())
    }
}

/// An operation: a named kernel with parameters and named lists of the
/// tensor selections it reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OperationBody {
    pub op_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
    pub inputs: SelectionMap,
    pub outputs: SelectionMap,
}

impl OperationBody {
    pub fn new(op_name: impl Into<String>) -> Self {
        Self {
            op_name: op_name.into(),
            params: BTreeMap::new(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn input(
        mut self,
        name: impl Into<String>,
        selections: impl IntoIterator<Item = TensorSelection>,
    ) -> Self {
        self.inputs.insert(name.into(), selections.into_iter().collect());
        self
    }

    pub fn output(
        mut self,
        name: impl Into<String>,
        selections: impl IntoIterator<Item = TensorSelection>,
    ) -> Self {
        self.outputs.insert(name.into(), selections.into_iter().collect());
        self
    }

    /// Ids of every tensor read by the operation, in IO-name order.
    pub fn input_tensors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inputs.values().flatten().map(|s| s.tensor_id)
    }

    /// Ids of every tensor written by the operation, in IO-name order.
    pub fn output_tensors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.outputs.values().flatten().map(|s| s.tensor_id)
    }

    /// Does any output selection name `tensor`?
    pub fn produces(&self, tensor: NodeId) -> bool {
        self.output_tensors().any(|id| id == tensor)
    }

    /// `inputs` then `outputs`, with their field names.
    pub fn io_maps(&self) -> [(&'static str, &SelectionMap); 2] {
        [("inputs", &self.inputs), ("outputs", &self.outputs)]
    }
}

/// A reference to a sub-range of a tensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TensorSelection {
    pub tensor_id: NodeId,
    pub range: ZRange,
}

impl TensorSelection {
    pub fn new(tensor_id: NodeId, range: ZRange) -> Self {
        Self { tensor_id, range }
    }
}

/// An application of an operation to concrete tensor selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplicationBody {
    pub operation_id: NodeId,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: SelectionMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: SelectionMap,
}

impl ApplicationBody {
    pub fn new(operation_id: NodeId) -> Self {
        Self {
            operation_id,
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn input(
        mut self,
        name: impl Into<String>,
        selections: impl IntoIterator<Item = TensorSelection>,
    ) -> Self {
        self.inputs.insert(name.into(), selections.into_iter().collect());
        self
    }

    pub fn output(
        mut self,
        name: impl Into<String>,
        selections: impl IntoIterator<Item = TensorSelection>,
    ) -> Self {
        self.outputs.insert(name.into(), selections.into_iter().collect());
        self
    }

    /// `inputs` then `outputs`, with their field names.
    pub fn io_maps(&self) -> [(&'static str, &SelectionMap); 2] {
        [("inputs", &self.inputs), ("outputs", &self.outputs)]
    }
}

/// Free-form commentary attached to a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteBody {
    pub message: String,
}

/// A body kept as raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBody {
    pub value: Value,
    /// Why decoding into the node kind's typed body failed, if it was attempted.
    pub decode_error: Option<String>,
}

/// The payload of a node, one variant per known kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Tensor(TensorBody),
    Operation(OperationBody),
    Application(ApplicationBody),
    Note(NoteBody),
    Raw(RawBody),
}

fn decode_as<T>(value: Value, wrap: fn(T) -> NodeBody) -> NodeBody
where
    T: for<'de> Deserialize<'de>,
{
    match serde_json::from_value::<T>(value.clone()) {
        Ok(body) => wrap(body),
        Err(err) => NodeBody::Raw(RawBody {
            value,
            decode_error: Some(err.to_string()),
        }),
    }
}

impl NodeBody {
    /// Decode a JSON body for a node of the given type.
    pub fn decode(node_type: &str, value: Value) -> NodeBody {
        match node_type {
            node_types::TENSOR => decode_as(value, NodeBody::Tensor),
            node_types::OPERATION => decode_as(value, NodeBody::Operation),
            node_types::APPLICATION => decode_as(value, NodeBody::Application),
            node_types::NOTE => decode_as(value, NodeBody::Note),
            _ => NodeBody::raw(value),
        }
    }

    /// A raw body that was never meant to decode.
    pub fn raw(value: Value) -> NodeBody {
        NodeBody::Raw(RawBody {
            value,
            decode_error: None,
        })
    }

    /// The node type implied by a typed body; `None` for raw bodies.
    pub fn kind_type(&self) -> Option<&'static str> {
        match self {
            NodeBody::Tensor(_) => Some(node_types::TENSOR),
            NodeBody::Operation(_) => Some(node_types::OPERATION),
            NodeBody::Application(_) => Some(node_types::APPLICATION),
            NodeBody::Note(_) => Some(node_types::NOTE),
            NodeBody::Raw(_) => None,
        }
    }

    pub fn decode_error(&self) -> Option<&str> {
        match self {
            NodeBody::Raw(raw) => raw.decode_error.as_deref(),
            _ => None,
        }
    }

    /// The body as a JSON tree.
    pub fn to_value(&self) -> Value {
        let encoded = match self {
            NodeBody::Tensor(b) => serde_json::to_value(b),
            NodeBody::Operation(b) => serde_json::to_value(b),
            NodeBody::Application(b) => serde_json::to_value(b),
            NodeBody::Note(b) => serde_json::to_value(b),
            NodeBody::Raw(raw) => return raw.value.clone(),
        };
        // Typed bodies only hold string-keyed maps, so encoding cannot fail.
        encoded.unwrap_or_default()
    }
}

impl Default for NodeBody {
    fn default() -> Self {
        NodeBody::raw(Value::Object(serde_json::Map::new()))
    }
}

/// Static binding between a node type name and its typed body.
pub trait NodeKind {
    const TYPE: &'static str;
    type Body: 'static;

    fn body_of(body: &NodeBody) -> Option<&Self::Body>;
    fn into_body(body: Self::Body) -> NodeBody;
}

macro_rules! node_kind {
    ($(#[$meta:meta])* $kind:ident, $ty:expr, $body:ty, $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $kind;

        impl NodeKind for $kind {
            const TYPE: &'static str = $ty;
            type Body = $body;

            fn body_of(body: &NodeBody) -> Option<&Self::Body> {
                match body {
                    NodeBody::$variant(b) => Some(b),
                    _ => None,
                }
            }

            fn into_body(body: Self::Body) -> NodeBody {
                NodeBody::$variant(body)
            }
        }

        impl From<$body> for NodeBody {
            fn from(body: $body) -> Self {
                NodeBody::$variant(body)
            }
        }
    };
}

node_kind!(
    /// Marker for tensor nodes.
    TensorNode, node_types::TENSOR, TensorBody, Tensor
);
node_kind!(
    /// Marker for operation nodes.
    OperationNode, node_types::OPERATION, OperationBody, Operation
);
node_kind!(
    /// Marker for application nodes.
    ApplicationNode, node_types::APPLICATION, ApplicationBody, Application
);
node_kind!(
    /// Marker for note nodes.
    NoteNode, node_types::NOTE, NoteBody, Note
);
