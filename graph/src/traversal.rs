//! Graph algorithms over the tensor/operation link graph.
//!
//! Operations and applications link the tensors they read to themselves and
//! themselves to the tensors they write. The result is a bipartite directed
//! graph whose cycles are exactly the illegal feedback loops of a computation.

use crate::{ApplicationNode, LoomGraph, OperationNode};
use loom_core::NodeId;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

struct LinkBuilder<'g> {
    graph: &'g LoomGraph,
    link: DiGraph<NodeId, ()>,
    indices: HashMap<NodeId, NodeIndex>,
}

impl LinkBuilder<'_> {
    fn index_of(&mut self, id: NodeId) -> NodeIndex {
        let link = &mut self.link;
        *self.indices.entry(id).or_insert_with(|| link.add_node(id))
    }

    /// Add `from -> to`; references to nodes outside the graph are skipped.
    fn link(&mut self, from: NodeId, to: NodeId) {
        if !self.graph.contains(from) || !self.graph.contains(to) {
            return;
        }
        let a = self.index_of(from);
        let b = self.index_of(to);
        self.link.update_edge(a, b, ());
    }
}

/// Build the directed link graph between tensors and the nodes that
/// consume or produce them.
///
/// Node weights are node ids; there is at most one edge per ordered pair.
pub fn build_operation_link_graph(graph: &LoomGraph) -> DiGraph<NodeId, ()> {
    let mut builder = LinkBuilder {
        graph,
        link: DiGraph::new(),
        indices: HashMap::new(),
    };

    for op in graph.by_kind::<OperationNode>() {
        let id = op.id();
        for tensor in op.body().input_tensors() {
            builder.link(tensor, id);
        }
        for tensor in op.body().output_tensors() {
            builder.link(id, tensor);
        }
    }

    for app in graph.by_kind::<ApplicationNode>() {
        let id = app.id();
        for selection in app.body().inputs.values().flatten() {
            builder.link(selection.tensor_id, id);
        }
        for selection in app.body().outputs.values().flatten() {
            builder.link(id, selection.tensor_id);
        }
    }

    builder.link
}

/// Enumerate the simple cycles of a directed graph of node ids.
///
/// Each cycle starts at its smallest id and the list is sorted, so the
/// output does not depend on construction order.
pub fn simple_cycles(link: &DiGraph<NodeId, ()>) -> Vec<Vec<NodeId>> {
    let mut cycles = Vec::new();

    for mut members in tarjan_scc(link) {
        // A single node only cycles through a self-loop.
        if members.len() == 1 && link.find_edge(members[0], members[0]).is_none() {
            continue;
        }
        members.sort_by_key(|&ix| link[ix]);

        for (i, &start) in members.iter().enumerate() {
            let allowed: HashSet<NodeIndex> = members[i..].iter().copied().collect();
            let mut search = CycleSearch {
                link,
                start,
                allowed,
                path: vec![start],
                cycles: &mut cycles,
            };
            search.visit(start);
        }
    }

    cycles.sort();
    cycles
}

struct CycleSearch<'a> {
    link: &'a DiGraph<NodeId, ()>,
    start: NodeIndex,
    /// Nodes of the component not smaller than `start`
    allowed: HashSet<NodeIndex>,
    path: Vec<NodeIndex>,
    cycles: &'a mut Vec<Vec<NodeId>>,
}

impl CycleSearch<'_> {
    fn visit(&mut self, current: NodeIndex) {
        let link = self.link;
        for next in link.neighbors(current) {
            if next == self.start {
                self.cycles.push(self.path.iter().map(|&ix| link[ix]).collect());
            } else if self.allowed.contains(&next) && !self.path.contains(&next) {
                self.path.push(next);
                self.visit(next);
                self.path.pop();
            }
        }
    }
}

/// Every simple cycle in the tensor/operation link graph of `graph`.
pub fn find_operation_simple_cycles(graph: &LoomGraph) -> Vec<Vec<NodeId>> {
    simple_cycles(&build_operation_link_graph(graph))
}
