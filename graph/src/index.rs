//! Indexes for graph lookups.

use loom_core::NodeId;
use std::collections::HashMap;

/// Type index: type name -> node ids in insertion order.
#[derive(Debug, Default, Clone)]
pub struct TypeIndex {
    index: HashMap<String, Vec<NodeId>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node_type: &str, node_id: NodeId) {
        self.index
            .entry(node_type.to_string())
            .or_default()
            .push(node_id);
    }

    pub fn get(&self, node_type: &str) -> &[NodeId] {
        self.index.get(node_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every indexed type name, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.index.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}
