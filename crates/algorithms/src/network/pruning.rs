//! Single-outlet pruning
//!
//! Networks with overflow structures split flow at junctions. For catchment
//! tracing each junction must drain to exactly one outlet, so every junction
//! keeps only the outgoing edge that starts its shortest weighted path to the
//! nearest reachable outlet.

use super::flow_graph::FlowGraph;
use petgraph::algo::{astar, dijkstra};
use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use stormnet_core::NodeId;
use tracing::{debug, warn};

/// What pruning changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneOutcome {
    /// Removed edges as `(from, to)`
    pub removed: Vec<(NodeId, NodeId)>,
    /// Junctions from which no outlet could be reached; left untouched
    pub unreachable: Vec<NodeId>,
}

/// Prune the graph so that every junction (out-degree > 1) keeps exactly one
/// outgoing edge.
///
/// Outlets are nodes without outgoing edges. For each junction the outlet with
/// the smallest weighted distance wins (first one on ties); unreachable outlets
/// are never selected. Running this on an already pruned graph changes nothing.
pub fn prune_to_single_outlet(graph: &mut FlowGraph) -> PruneOutcome {
    let mut outcome = PruneOutcome::default();

    let (outlets, junctions) = classify_nodes(graph);
    debug!(
        "Pruning {} junctions towards {} outlets",
        junctions.len(),
        outlets.len()
    );

    for junction in junctions {
        let Some(next_hop) = next_hop_to_nearest_outlet(graph, junction, &outlets) else {
            let id = graph.node_id(junction).to_string();
            warn!("Failed upon tracing network from {} to any outlet", id);
            outcome.unreachable.push(id);
            continue;
        };

        let doomed: Vec<(EdgeIndex, NodeIndex)> = graph
            .inner()
            .edges_directed(junction, Direction::Outgoing)
            .filter(|e| e.target() != next_hop)
            .map(|e| (e.id(), e.target()))
            .collect();

        for (edge, target) in doomed {
            if graph.remove_edge_by_index(edge).is_some() {
                let from = graph.node_id(junction).to_string();
                let to = graph.node_id(target).to_string();
                debug!(
                    "Removed edge {}-{} so that node {} exclusively leads to {}",
                    from,
                    to,
                    from,
                    graph.node_id(next_hop)
                );
                outcome.removed.push((from, to));
            }
        }
    }

    outcome
}

fn classify_nodes(graph: &FlowGraph) -> (Vec<NodeIndex>, Vec<NodeIndex>) {
    let g = graph.inner();
    let mut outlets = Vec::new();
    let mut junctions = Vec::new();
    for node in g.node_indices() {
        match g.edges_directed(node, Direction::Outgoing).count() {
            0 => outlets.push(node),
            1 => {}
            _ => junctions.push(node),
        }
    }
    (outlets, junctions)
}

/// First node on the shortest path from `junction` to its nearest outlet
fn next_hop_to_nearest_outlet(
    graph: &FlowGraph,
    junction: NodeIndex,
    outlets: &[NodeIndex],
) -> Option<NodeIndex> {
    let g = graph.inner();
    let distances = dijkstra(g, junction, None, |e| e.weight().length);

    // Unreachable outlets have no distance and drop out here
    let mut nearest: Option<(NodeIndex, f64)> = None;
    for &outlet in outlets {
        if let Some(&d) = distances.get(&outlet) {
            if nearest.map_or(true, |(_, best)| d < best) {
                nearest = Some((outlet, d));
            }
        }
    }
    let (outlet, _) = nearest?;

    let (_, path) = astar(
        g,
        junction,
        |n| n == outlet,
        |e| e.weight().length,
        |_| 0.0,
    )?;
    path.get(1).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::flow_graph::FlowEdge;
    use stormnet_core::LinkKind;

    fn add(g: &mut FlowGraph, from: &str, to: &str, length: f64) {
        g.add_edge(
            from,
            to,
            FlowEdge {
                link_id: format!("{}-{}", from, to),
                kind: LinkKind::Pipe,
                length,
                travel_time: 0.0,
            },
        );
    }

    /// J splits towards two outlets; the path via X is shorter
    fn split_network() -> FlowGraph {
        let mut g = FlowGraph::new();
        add(&mut g, "U", "J", 10.0);
        add(&mut g, "J", "X", 5.0);
        add(&mut g, "X", "OUT1", 5.0);
        add(&mut g, "J", "Y", 1.0);
        add(&mut g, "Y", "OUT2", 50.0);
        g
    }

    #[test]
    fn test_keeps_shortest_branch() {
        let mut g = split_network();
        let outcome = prune_to_single_outlet(&mut g);

        assert_eq!(outcome.removed, vec![("J".to_string(), "Y".to_string())]);
        assert!(outcome.unreachable.is_empty());
        assert_eq!(g.successors("J"), vec!["X"]);
        assert!(g.has_edge("Y", "OUT2"), "only junction edges are pruned");
    }

    #[test]
    fn test_every_junction_has_single_out_edge() {
        let mut g = split_network();
        add(&mut g, "X", "Z", 100.0);
        add(&mut g, "Z", "OUT3", 1.0);
        add(&mut g, "U", "Y", 3.0);

        prune_to_single_outlet(&mut g);
        let nodes: Vec<String> = g.nodes().map(str::to_string).collect();
        for node in nodes {
            assert!(g.out_degree(&node) <= 1, "{} still branches", node);
        }
    }

    #[test]
    fn test_idempotent() {
        let mut g = split_network();
        prune_to_single_outlet(&mut g);
        let edges_after_first = g.edge_count();

        let second = prune_to_single_outlet(&mut g);
        assert!(second.removed.is_empty());
        assert_eq!(g.edge_count(), edges_after_first);
    }

    #[test]
    fn test_unreachable_outlet_never_selected() {
        // J -> A -> B -> A is a loop with no outlet; J -> OUT is the only way out
        let mut g = FlowGraph::new();
        add(&mut g, "J", "A", 0.1);
        add(&mut g, "A", "B", 0.1);
        add(&mut g, "B", "A", 0.1);
        add(&mut g, "J", "OUT", 1000.0);

        prune_to_single_outlet(&mut g);
        assert_eq!(g.successors("J"), vec!["OUT"]);
    }

    #[test]
    fn test_junction_without_outlet_is_reported() {
        // Two loops and no outlet anywhere
        let mut g = FlowGraph::new();
        add(&mut g, "J", "A", 1.0);
        add(&mut g, "A", "J", 1.0);
        add(&mut g, "J", "B", 1.0);
        add(&mut g, "B", "J", 1.0);

        let outcome = prune_to_single_outlet(&mut g);
        assert_eq!(outcome.unreachable, vec!["J".to_string()]);
        assert!(outcome.removed.is_empty());
        assert_eq!(g.out_degree("J"), 2);
    }

    #[test]
    fn test_tie_goes_to_first_outlet() {
        let mut g = FlowGraph::new();
        add(&mut g, "J", "OUT1", 5.0);
        add(&mut g, "J", "OUT2", 5.0);

        prune_to_single_outlet(&mut g);
        assert_eq!(g.successors("J"), vec!["OUT1"]);
    }
}
