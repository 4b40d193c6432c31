//! Directed flow graph
//!
//! Wraps a petgraph `StableDiGraph` keyed by node identifiers. Edge indices
//! stay valid across removals, which regulation capping and pruning rely on.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::HashMap;
use stormnet_core::{LinkKind, NodeId};

/// Attributes carried by a flow edge
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    /// Identifier of the link or structure that produced the edge
    pub link_id: String,
    pub kind: LinkKind,
    /// Edge weight
    pub length: f64,
    pub travel_time: f64,
}

/// Directed, length-weighted flow graph of a sewer network.
///
/// At most one edge exists per ordered node pair; adding a second one
/// replaces the attributes of the first.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    graph: StableDiGraph<NodeId, FlowEdge>,
    node_map: HashMap<NodeId, NodeIndex>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the edge `from -> to`, creating nodes as needed
    pub fn add_edge(&mut self, from: &str, to: &str, edge: FlowEdge) {
        let a = self.ensure_node(from);
        let b = self.ensure_node(to);
        self.graph.update_edge(a, b, edge);
    }

    /// Remove the edge `from -> to`. Returns `false` if there was none.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        match self.find_edge(from, to) {
            Some(edge) => self.graph.remove_edge(edge).is_some(),
            None => false,
        }
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.find_edge(from, to).is_some()
    }

    /// Attributes of the edge `from -> to`
    pub fn edge(&self, from: &str, to: &str) -> Option<&FlowEdge> {
        self.find_edge(from, to)
            .and_then(|edge| self.graph.edge_weight(edge))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of outgoing edges; 0 for unknown nodes
    pub fn out_degree(&self, id: &str) -> usize {
        self.node_index(id)
            .map_or(0, |n| self.graph.edges_directed(n, Direction::Outgoing).count())
    }

    /// Downstream neighbours of a node
    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Upstream neighbours of a node
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Node identifiers in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_indices().map(move |n| self.graph[n].as_str())
    }

    /// All edges as `(from, to, attributes)`
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &FlowEdge)> + '_ {
        self.graph.edge_indices().filter_map(move |e| {
            let (a, b) = self.graph.edge_endpoints(e)?;
            Some((self.graph[a].as_str(), self.graph[b].as_str(), &self.graph[e]))
        })
    }

    pub(crate) fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub(crate) fn node_id(&self, index: NodeIndex) -> &str {
        self.graph[index].as_str()
    }

    pub(crate) fn inner(&self) -> &StableDiGraph<NodeId, FlowEdge> {
        &self.graph
    }

    pub(crate) fn remove_edge_by_index(&mut self, edge: EdgeIndex) -> Option<FlowEdge> {
        self.graph.remove_edge(edge)
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(id) {
            return index;
        }
        let index = self.graph.add_node(id.to_string());
        self.node_map.insert(id.to_string(), index);
        index
    }

    fn find_edge(&self, from: &str, to: &str) -> Option<EdgeIndex> {
        let a = self.node_index(from)?;
        let b = self.node_index(to)?;
        self.graph.find_edge(a, b)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&str> {
        match self.node_index(id) {
            Some(n) => self
                .graph
                .neighbors_directed(n, direction)
                .map(|m| self.graph[m].as_str())
                .collect(),
            None => Vec::new(),
        }
    }
}
