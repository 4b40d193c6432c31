//! Path queries: travel time between nodes and tracing between node sets
//!
//! Paths are fewest-hop paths found by breadth-first search; link lengths do
//! not take part.

use super::flow_graph::FlowGraph;
use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, VecDeque};
use stormnet_core::{Error, NodeId, Result};

/// Nodes and link identifiers lying on paths between a set of nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracedPaths {
    pub nodes: BTreeSet<NodeId>,
    pub links: BTreeSet<String>,
}

/// Fewest-hop path `from -> to` as node indices, both ends included
fn shortest_hop_path(graph: &FlowGraph, from: NodeIndex, to: NodeIndex) -> Option<Vec<NodeIndex>> {
    let g = graph.inner();
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([from]);
    parent.insert(from, from);

    while let Some(node) = queue.pop_front() {
        if node == to {
            let mut path = vec![to];
            let mut current = to;
            while current != from {
                current = parent[&current];
                path.push(current);
            }
            path.reverse();
            return Some(path);
        }
        for next in g.neighbors_directed(node, Direction::Outgoing) {
            if !parent.contains_key(&next) {
                parent.insert(next, node);
                queue.push_back(next);
            }
        }
    }
    None
}

fn path_travel_time(graph: &FlowGraph, path: &[NodeIndex]) -> f64 {
    path.windows(2)
        .filter_map(|pair| {
            graph
                .edge(graph.node_id(pair[0]), graph.node_id(pair[1]))
                .map(|e| e.travel_time)
        })
        .sum()
}

/// Sum of link travel times along the fewest-hop path from `source` to `target`.
///
/// A node's travel time to itself is zero. Unknown nodes and unreachable
/// targets are errors, never a silent zero.
pub fn travel_time(graph: &FlowGraph, source: &str, target: &str) -> Result<f64> {
    if source == target {
        return Ok(0.0);
    }
    let from = graph
        .node_index(source)
        .ok_or_else(|| Error::no_path(source, target))?;
    let to = graph
        .node_index(target)
        .ok_or_else(|| Error::no_path(source, target))?;

    let path = shortest_hop_path(graph, from, to).ok_or_else(|| Error::no_path(source, target))?;
    Ok(path_travel_time(graph, &path))
}

/// Travel time from every node upstream of `target` to the target.
///
/// One backward breadth-first search from the target; each node is reached
/// along a fewest-hop path. The target maps to zero, even when it is not part
/// of the graph.
pub fn travel_times_to(graph: &FlowGraph, target: &str) -> HashMap<NodeId, f64> {
    let mut times = HashMap::from([(target.to_string(), 0.0)]);
    let Some(start) = graph.node_index(target) else {
        return times;
    };

    let g = graph.inner();
    let mut reached: HashMap<NodeIndex, f64> = HashMap::from([(start, 0.0)]);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        let downstream_time = reached[&node];
        for upstream in g.neighbors_directed(node, Direction::Incoming) {
            if reached.contains_key(&upstream) {
                continue;
            }
            let link_time = graph
                .edge(graph.node_id(upstream), graph.node_id(node))
                .map_or(0.0, |e| e.travel_time);
            let total = downstream_time + link_time;
            reached.insert(upstream, total);
            times.insert(graph.node_id(upstream).to_string(), total);
            queue.push_back(upstream);
        }
    }
    times
}

/// Trace the paths connecting a set of nodes.
///
/// For every ordered pair the fewest-hop path is taken in whichever
/// direction one exists. Nodes only appear in the result through a link.
pub fn trace_between<S: AsRef<str>>(graph: &FlowGraph, nodes: &[S]) -> Result<TracedPaths> {
    let indices = nodes
        .iter()
        .map(|id| {
            graph
                .node_index(id.as_ref())
                .ok_or_else(|| Error::UnknownNode(id.as_ref().to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut traced = TracedPaths::default();
    for &source in &indices {
        for &target in &indices {
            let path = shortest_hop_path(graph, source, target)
                .or_else(|| shortest_hop_path(graph, target, source));
            let Some(path) = path else {
                continue;
            };
            for pair in path.windows(2) {
                let (from, to) = (graph.node_id(pair[0]), graph.node_id(pair[1]));
                if let Some(edge) = graph.edge(from, to) {
                    traced.links.insert(edge.link_id.clone());
                }
                traced.nodes.insert(from.to_string());
                traced.nodes.insert(to.to_string());
            }
        }
    }
    Ok(traced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::flow_graph::FlowEdge;
    use approx::assert_relative_eq;
    use stormnet_core::LinkKind;

    fn add(g: &mut FlowGraph, id: &str, from: &str, to: &str, travel_time: f64) {
        g.add_edge(
            from,
            to,
            FlowEdge {
                link_id: id.to_string(),
                kind: LinkKind::Pipe,
                length: 1.0,
                travel_time,
            },
        );
    }

    fn chain() -> FlowGraph {
        let mut g = FlowGraph::new();
        add(&mut g, "L1", "A", "B", 5.0);
        add(&mut g, "L2", "B", "C", 10.0);
        g
    }

    #[test]
    fn test_travel_time_chain() {
        let g = chain();
        assert_relative_eq!(travel_time(&g, "A", "C").unwrap(), 15.0);
        assert_relative_eq!(travel_time(&g, "B", "C").unwrap(), 10.0);
        assert_relative_eq!(travel_time(&g, "C", "C").unwrap(), 0.0);
    }

    #[test]
    fn test_travel_time_no_path_is_error() {
        let g = chain();
        assert!(matches!(travel_time(&g, "C", "A"), Err(Error::NoPath { .. })));
        assert!(matches!(travel_time(&g, "Z", "A"), Err(Error::NoPath { .. })));
    }

    #[test]
    fn test_fewest_hops_wins_over_travel_time() {
        // A -> D directly (slow) beats A -> B -> C -> D (fast) on hop count
        let mut g = FlowGraph::new();
        add(&mut g, "L1", "A", "B", 1.0);
        add(&mut g, "L2", "B", "C", 1.0);
        add(&mut g, "L3", "C", "D", 1.0);
        add(&mut g, "L4", "A", "D", 30.0);
        assert_relative_eq!(travel_time(&g, "A", "D").unwrap(), 30.0);
        assert_relative_eq!(travel_times_to(&g, "D")["A"], 30.0);
    }

    #[test]
    fn test_travel_times_to_matches_pairwise() {
        let mut g = chain();
        add(&mut g, "L3", "X", "B", 2.5);
        let times = travel_times_to(&g, "C");
        for source in ["A", "B", "C", "X"] {
            assert_relative_eq!(times[source], travel_time(&g, source, "C").unwrap());
        }
        assert_eq!(times.len(), 4);
    }

    #[test]
    fn test_travel_times_to_unknown_target() {
        let times = travel_times_to(&chain(), "Q");
        assert_eq!(times.len(), 1);
        assert_eq!(times["Q"], 0.0);
    }

    #[test]
    fn test_trace_between() {
        let mut g = chain();
        add(&mut g, "L3", "C", "D", 1.0);
        add(&mut g, "L4", "X", "B", 1.0);

        let traced = trace_between(&g, &["C", "A"]).unwrap();
        assert_eq!(
            traced.nodes,
            ["A", "B", "C"].iter().map(|s| s.to_string()).collect()
        );
        assert_eq!(
            traced.links,
            ["L1", "L2"].iter().map(|s| s.to_string()).collect()
        );

        let single = trace_between(&g, &["A"]).unwrap();
        assert!(single.nodes.is_empty());
    }

    #[test]
    fn test_trace_between_unknown_node() {
        let result = trace_between(&chain(), &["A", "nope"]);
        assert!(matches!(result, Err(Error::UnknownNode(_))));
    }
}
