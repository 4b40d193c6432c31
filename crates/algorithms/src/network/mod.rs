//! Sewer network analysis
//!
//! Algorithms over the directed flow graph of a sewer network:
//! - Graph building: links, weirs, pumps and orifices become edges
//! - Inlet caps and regulations: edges into capped nodes are cut
//! - Single-outlet pruning: every junction drains to its nearest outlet
//! - Upstream tracing: all nodes draining into a target
//! - Catchments: parameter resolution and aggregation by node
//! - Paths: travel times and traces between nodes

mod builder;
mod catchments;
pub(crate) mod flow_graph;
mod paths;
mod pruning;
mod state;
mod upstream;

pub use builder::{build_graph, BuildIssue, BuildReport, BuiltGraph, GraphBuildParams, GraphBuilder};
pub use catchments::{
    connected_catchments, load_catchments, resolve_parameters, AreaUnit, CatchmentLoadParams,
    ParameterLookup, TimeUnit, DEFAULT_CONCENTRATION_TIME, DEFAULT_REDUCTION_FACTOR,
};
pub(crate) use catchments::catchments_by_node;
pub use flow_graph::{FlowEdge, FlowGraph};
pub use paths::{trace_between, travel_time, travel_times_to, TracedPaths};
pub use pruning::{prune_to_single_outlet, PruneOutcome};
pub use state::{MappedNetwork, MappingState, NetworkParams, StormNetwork};
pub use upstream::{find_upstream_nodes, upstream_nodes};
