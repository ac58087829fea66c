//! Node arena.

use crate::index::TypeIndex;
use crate::{LoomNode, NodeKind};
use loom_core::{GraphId, LoomError, LoomResult, NodeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

/// A typed view of a node whose body decoded as kind `K`.
pub struct NodeRef<'g, K: NodeKind> {
    node: &'g LoomNode,
    body: &'g K::Body,
}

impl<'g, K: NodeKind> NodeRef<'g, K> {
    pub fn node(&self) -> &'g LoomNode {
        self.node
    }

    pub fn body(&self) -> &'g K::Body {
        self.body
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn label(&self) -> Option<&'g str> {
        self.node.label()
    }
}

impl<K: NodeKind> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: NodeKind> Copy for NodeRef<'_, K> {}

impl<K: NodeKind> fmt::Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("type", &K::TYPE)
            .field("id", &self.node.id())
            .finish()
    }
}

/// A graph of Loom nodes.
///
/// Nodes are owned by value and keyed by id. References between nodes are
/// plain ids resolved through this graph; they may dangle until validated.
#[derive(Debug)]
pub struct LoomGraph {
    id: GraphId,
    nodes: HashMap<NodeId, LoomNode>,
    /// Insertion order
    order: Vec<NodeId>,
    type_index: TypeIndex,
}

impl Default for LoomGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl LoomGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            id: GraphId::random(),
            nodes: HashMap::new(),
            order: Vec::new(),
            type_index: TypeIndex::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    // ==================== Node Operations ====================

    /// Insert a node and take ownership of it.
    ///
    /// Fails without touching the graph if the node is already owned by a
    /// graph or its id is taken.
    pub fn add_node(&mut self, mut node: LoomNode) -> LoomResult<&mut LoomNode> {
        if let Some(owner) = node.graph_id() {
            return Err(LoomError::NodeAlreadyOwned {
                id: node.id(),
                owner,
            });
        }

        match self.nodes.entry(node.id()) {
            Entry::Occupied(_) => Err(LoomError::DuplicateNodeId(node.id())),
            Entry::Vacant(slot) => {
                node.attach(self.id)?;
                self.order.push(node.id());
                self.type_index.insert(node.node_type(), node.id());
                Ok(slot.insert(node))
            }
        }
    }

    /// Insert several nodes, stopping at the first failure.
    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = LoomNode>) -> LoomResult<()> {
        for node in nodes {
            self.add_node(node)?;
        }
        Ok(())
    }

    /// Get a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&LoomNode> {
        self.nodes.get(&id)
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// Id, type and ownership are fixed, so the indexes stay valid.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut LoomNode> {
        self.nodes.get_mut(&id)
    }

    /// Get a node that must be present.
    pub fn assert_node(&self, id: NodeId) -> LoomResult<&LoomNode> {
        self.get_node(id).ok_or(LoomError::MissingNode(id))
    }

    /// Look up a node and view it as kind `K`.
    ///
    /// Absent nodes are `Ok(None)`; a node of another kind is an error.
    pub fn get_node_of<K: NodeKind>(&self, id: NodeId) -> LoomResult<Option<NodeRef<'_, K>>> {
        let Some(node) = self.get_node(id) else {
            return Ok(None);
        };
        let body = node.body_as::<K>()?;
        Ok(Some(NodeRef { node, body }))
    }

    /// Look up a node that must be present and of kind `K`.
    pub fn assert_node_of<K: NodeKind>(&self, id: NodeId) -> LoomResult<NodeRef<'_, K>> {
        self.get_node_of::<K>(id)?
            .ok_or(LoomError::MissingNode(id))
    }

    // ==================== Queries ====================

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &LoomNode> + Clone + '_ {
        self.order.iter().filter_map(move |id| self.nodes.get(id))
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Nodes of the given type, in insertion order.
    pub fn by_type<'a>(&'a self, node_type: &str) -> impl Iterator<Item = &'a LoomNode> + Clone + 'a {
        self.type_index
            .get(node_type)
            .iter()
            .filter_map(move |id| self.nodes.get(id))
    }

    /// Nodes of kind `K` whose body decoded, viewed as `K`.
    ///
    /// Nodes of the kind with an undecoded body are skipped; validation
    /// reports them separately.
    pub fn by_kind<K: NodeKind>(&self) -> impl Iterator<Item = NodeRef<'_, K>> + Clone + '_ {
        self.by_type(K::TYPE)
            .filter_map(|node| K::body_of(node.body()).map(|body| NodeRef { node, body }))
    }

    /// Type names present in the graph, sorted.
    pub fn node_types(&self) -> Vec<&str> {
        self.type_index.types()
    }
}
