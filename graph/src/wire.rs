//! The JSON document form of a graph.
//!
//! ```json
//! {"nodes": [{"id": "...", "type": "TensorNode", "label": "x", "body": {...}}]}
//! ```
//!
//! Nodes are written sorted by id so documents diff cleanly.

use crate::{LoomGraph, LoomNode};
use loom_core::{LoomResult, NodeId};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
struct GraphDoc {
    #[serde(default)]
    nodes: Vec<NodeDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeDoc {
    id: NodeId,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    annotations: BTreeMap<String, Value>,
    #[serde(default = "empty_body")]
    body: Value,
}

fn empty_body() -> Value {
    Value::Object(Map::new())
}

impl NodeDoc {
    fn from_node(node: &LoomNode) -> Self {
        Self {
            id: node.id(),
            node_type: node.node_type().to_string(),
            label: node.label().map(str::to_string),
            annotations: node.annotations().clone(),
            body: node.body().to_value(),
        }
    }

    fn into_node(self) -> LoomResult<LoomNode> {
        let mut builder = LoomNode::builder(self.node_type)
            .id(self.id)
            .annotations(self.annotations)
            .body_json(self.body);
        if let Some(label) = self.label {
            builder = builder.label(label);
        }
        builder.build()
    }
}

impl GraphDoc {
    fn from_graph(graph: &LoomGraph) -> Self {
        let mut nodes: Vec<NodeDoc> = graph.nodes().map(NodeDoc::from_node).collect();
        nodes.sort_by_key(|n| n.id);
        Self { nodes }
    }

    fn into_graph(self) -> LoomResult<LoomGraph> {
        let mut graph = LoomGraph::new();
        for doc in self.nodes {
            graph.add_node(doc.into_node()?)?;
        }
        Ok(graph)
    }
}

impl LoomGraph {
    /// Parse a graph document. Duplicate node ids are rejected.
    pub fn from_json(json: &str) -> LoomResult<Self> {
        let doc: GraphDoc = serde_json::from_str(json)?;
        doc.into_graph()
    }

    pub fn from_value(value: Value) -> LoomResult<Self> {
        let doc: GraphDoc = serde_json::from_value(value)?;
        doc.into_graph()
    }

    pub fn to_value(&self) -> LoomResult<Value> {
        Ok(serde_json::to_value(GraphDoc::from_graph(self))?)
    }

    pub fn to_json(&self) -> LoomResult<String> {
        Ok(serde_json::to_string(&GraphDoc::from_graph(self))?)
    }

    pub fn to_json_pretty(&self) -> LoomResult<String> {
        Ok(serde_json::to_string_pretty(&GraphDoc::from_graph(self))?)
    }
}

impl Serialize for LoomGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GraphDoc::from_graph(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LoomGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        GraphDoc::deserialize(deserializer)?
            .into_graph()
            .map_err(de::Error::custom)
    }
}
