//! Graph nodes.

use crate::{NodeBody, NodeKind};
use loom_core::{GraphId, LoomError, LoomResult, NodeId};
use loom_validation::Context;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// An identified, typed entity carrying a kind-specific body.
///
/// The id and type are fixed at construction. The owning graph is recorded
/// once, on insertion, and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LoomNode {
    id: NodeId,
    node_type: String,
    label: Option<String>,
    annotations: BTreeMap<String, Value>,
    body: NodeBody,
    graph: Option<GraphId>,
}

impl LoomNode {
    /// Start building a node of the given type.
    pub fn builder(node_type: impl Into<String>) -> LoomNodeBuilder {
        LoomNodeBuilder {
            id: None,
            node_type: node_type.into(),
            label: None,
            annotations: BTreeMap::new(),
            body: None,
        }
    }

    /// Start building a node of a known kind from its typed body.
    pub fn of<K: NodeKind>(body: K::Body) -> LoomNodeBuilder {
        Self::builder(K::TYPE).body(K::into_body(body))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    // ==================== Annotations ====================

    pub fn annotations(&self) -> &BTreeMap<String, Value> {
        &self.annotations
    }

    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }

    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.annotations.insert(key.into(), value.into());
    }

    pub fn remove_annotation(&mut self, key: &str) -> Option<Value> {
        self.annotations.remove(key)
    }

    // ==================== Body ====================

    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    /// Replace the whole body.
    ///
    /// A typed body must belong to this node's kind; raw bodies are always accepted.
    pub fn set_body(&mut self, body: NodeBody) -> LoomResult<()> {
        check_body_kind(self.id, &self.node_type, &body)?;
        self.body = body;
        Ok(())
    }

    /// View the body as the typed body of kind `K`.
    pub fn body_as<K: NodeKind>(&self) -> LoomResult<&K::Body> {
        if self.node_type != K::TYPE {
            return Err(LoomError::kind_mismatch(self.id, K::TYPE, &self.node_type));
        }
        K::body_of(&self.body).ok_or_else(|| LoomError::UndecodedBody {
            id: self.id,
            node_type: self.node_type.clone(),
        })
    }

    pub fn is_kind<K: NodeKind>(&self) -> bool {
        self.node_type == K::TYPE
    }

    // ==================== Ownership ====================

    /// The graph that owns this node, if it has been inserted.
    pub fn graph_id(&self) -> Option<GraphId> {
        self.graph
    }

    pub(crate) fn attach(&mut self, graph: GraphId) -> LoomResult<()> {
        if let Some(owner) = self.graph {
            return Err(LoomError::NodeAlreadyOwned { id: self.id, owner });
        }
        self.graph = Some(graph);
        Ok(())
    }

    // ==================== Diagnostics ====================

    /// JSON path of this node inside its graph document.
    pub fn json_path(&self) -> String {
        format!("$.nodes[@.id=='{}']", self.id)
    }

    /// The node in wire form.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("id".into(), Value::String(self.id.to_string()));
        obj.insert("type".into(), Value::String(self.node_type.clone()));
        if let Some(label) = &self.label {
            obj.insert("label".into(), Value::String(label.clone()));
        }
        if !self.annotations.is_empty() {
            let annotations = self.annotations.clone().into_iter().collect();
            obj.insert("annotations".into(), Value::Object(annotations));
        }
        obj.insert("body".into(), self.body.to_value());
        Value::Object(obj)
    }

    /// A diagnostic context pointing at this node and carrying its JSON.
    pub fn as_validation_context(&self, name: impl Into<String>) -> Context {
        Context::new(name)
            .with_jsonpath(self.json_path())
            .with_data(self.to_value())
    }
}

fn check_body_kind(id: NodeId, node_type: &str, body: &NodeBody) -> LoomResult<()> {
    match body.kind_type() {
        Some(kind) if kind != node_type => Err(LoomError::kind_mismatch(id, node_type, kind)),
        _ => Ok(()),
    }
}

/// Builder for [`LoomNode`].
#[derive(Debug, Clone)]
pub struct LoomNodeBuilder {
    id: Option<NodeId>,
    node_type: String,
    label: Option<String>,
    annotations: BTreeMap<String, Value>,
    body: Option<NodeBody>,
}

impl LoomNodeBuilder {
    /// Use a fixed id instead of a random one.
    pub fn id(mut self, id: NodeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn annotations(mut self, annotations: BTreeMap<String, Value>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn body(mut self, body: impl Into<NodeBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Decode a JSON body according to the node type.
    pub fn body_json(mut self, value: Value) -> Self {
        self.body = Some(NodeBody::decode(&self.node_type, value));
        self
    }

    pub fn build(self) -> LoomResult<LoomNode> {
        let id = self.id.unwrap_or_else(NodeId::random);
        let body = self.body.unwrap_or_default();
        check_body_kind(id, &self.node_type, &body)?;
        Ok(LoomNode {
            id,
            node_type: self.node_type,
            label: self.label,
            annotations: self.annotations,
            body,
            graph: None,
        })
    }
}
