//! Upstream tracing
//!
//! Collects every node that drains into a target node, i.e. every node with a
//! directed path to the target.

use super::flow_graph::FlowGraph;
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use stormnet_core::NodeId;

/// All nodes upstream of `target`, the target included.
///
/// A target that is not part of the graph yields just itself.
pub fn upstream_nodes(graph: &FlowGraph, target: &str) -> BTreeSet<NodeId> {
    let mut result = BTreeSet::new();
    result.insert(target.to_string());

    let Some(start) = graph.node_index(target) else {
        return result;
    };

    // Breadth-first walk against the flow direction
    let g = graph.inner();
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        for upstream in g.neighbors_directed(node, Direction::Incoming) {
            if visited.insert(upstream) {
                result.insert(graph.node_id(upstream).to_string());
                queue.push_back(upstream);
            }
        }
    }

    result
}

/// Upstream node sets for several targets, keyed by target
pub fn find_upstream_nodes<S: AsRef<str>>(
    graph: &FlowGraph,
    targets: &[S],
) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
    targets
        .iter()
        .map(|t| (t.as_ref().to_string(), upstream_nodes(graph, t.as_ref())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::flow_graph::FlowEdge;
    use stormnet_core::LinkKind;

    fn graph(edges: &[(&str, &str)]) -> FlowGraph {
        let mut g = FlowGraph::new();
        for (i, (from, to)) in edges.iter().enumerate() {
            g.add_edge(
                from,
                to,
                FlowEdge {
                    link_id: format!("L{}", i),
                    kind: LinkKind::Pipe,
                    length: 1.0,
                    travel_time: 0.0,
                },
            );
        }
        g
    }

    fn set(ids: &[&str]) -> BTreeSet<NodeId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_chain() {
        let g = graph(&[("A", "B"), ("B", "C")]);
        assert_eq!(upstream_nodes(&g, "C"), set(&["A", "B", "C"]));
        assert_eq!(upstream_nodes(&g, "B"), set(&["A", "B"]));
        assert_eq!(upstream_nodes(&g, "A"), set(&["A"]));
    }

    #[test]
    fn test_unknown_target_is_singleton() {
        let g = graph(&[("A", "B")]);
        assert_eq!(upstream_nodes(&g, "Z"), set(&["Z"]));
    }

    #[test]
    fn test_tree_excludes_other_branches() {
        //  A   B
        //   \ /
        //    C   D
        //     \ /
        //      E -> F
        let g = graph(&[("A", "C"), ("B", "C"), ("C", "E"), ("D", "E"), ("E", "F")]);
        assert_eq!(upstream_nodes(&g, "C"), set(&["A", "B", "C"]));
        assert_eq!(upstream_nodes(&g, "F"), set(&["A", "B", "C", "D", "E", "F"]));
        assert!(!upstream_nodes(&g, "E").contains("F"));
    }

    #[test]
    fn test_cycle_terminates() {
        let g = graph(&[("A", "B"), ("B", "C"), ("C", "A"), ("X", "A")]);
        assert_eq!(upstream_nodes(&g, "A"), set(&["A", "B", "C", "X"]));
    }

    #[test]
    fn test_multiple_targets() {
        let g = graph(&[("A", "B"), ("C", "D")]);
        let result = find_upstream_nodes(&g, &["B", "D", "Q"]);
        assert_eq!(result["B"], set(&["A", "B"]));
        assert_eq!(result["D"], set(&["C", "D"]));
        assert_eq!(result["Q"], set(&["Q"]));
    }
}
