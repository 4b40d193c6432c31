//! # Stormnet Algorithms
//!
//! Analysis algorithms for stormwater and sewer network models.
//!
//! ## Available Algorithm Categories
//!
//! - **network**: flow graph construction, regulation capping, single-outlet
//!   pruning, upstream tracing, catchment loading and aggregation, travel times
//! - **runoff**: rational and time-area runoff from a rainfall series
//! - **hydraulics**: full-flow pipe capacity (Colebrook-White)

pub mod hydraulics;
pub mod network;
pub mod runoff;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::hydraulics::{
        full_flow_capacity, CapacitySolution, PipeCapacity, PipeCapacityParams, PipeGeometry,
    };
    pub use crate::network::{
        build_graph, connected_catchments, find_upstream_nodes, load_catchments,
        prune_to_single_outlet, travel_time, upstream_nodes, BuildReport, CatchmentLoadParams,
        FlowGraph, GraphBuildParams, GraphBuilder, MappedNetwork, NetworkParams, StormNetwork,
    };
    pub use crate::runoff::{
        compute_runoff, rational_runoff, time_area_runoff, RunoffMethod, RunoffParams,
    };
    pub use stormnet_core::prelude::*;
}
