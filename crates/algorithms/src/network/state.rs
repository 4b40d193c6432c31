//! Network mapping state
//!
//! [`StormNetwork`] owns the record store and the build parameters. The flow
//! graph is built on demand: queries go through [`StormNetwork::mapped`],
//! which maps the network the first time it is needed and reuses the result
//! afterwards. [`StormNetwork::map_network`] always rebuilds.

use super::builder::{build_graph, BuildReport, GraphBuildParams};
use super::catchments::{connected_catchments, load_catchments, CatchmentLoadParams};
use super::flow_graph::FlowGraph;
use super::paths::{trace_between, travel_time, travel_times_to, TracedPaths};
use super::upstream::{find_upstream_nodes, upstream_nodes};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use stormnet_core::records::{CatchmentStore, NetworkRecords};
use stormnet_core::{Catchment, Error, Node, NodeId, Result};
use tracing::info;

/// Parameters for mapping a network
#[derive(Debug, Clone, Default)]
pub struct NetworkParams {
    pub graph: GraphBuildParams,
    pub catchments: CatchmentLoadParams,
}

/// A mapped network: flow graph, inflow caps and attached catchments
#[derive(Debug, Clone, Default)]
pub struct MappedNetwork {
    graph: FlowGraph,
    max_inflow: HashMap<NodeId, f64>,
    catchments: Vec<Catchment>,
    report: BuildReport,
}

impl MappedNetwork {
    /// Map a network from its records
    pub fn build<R>(records: &R, params: &NetworkParams) -> Result<Self>
    where
        R: NetworkRecords + CatchmentStore + ?Sized,
    {
        let built = build_graph(records, &params.graph)?;
        let catchments = load_catchments(records, &params.catchments)?;
        Ok(Self {
            graph: built.graph,
            max_inflow: built.max_inflow,
            catchments,
            report: built.report,
        })
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn catchments(&self) -> &[Catchment] {
        &self.catchments
    }

    /// Inflow caps per node
    pub fn max_inflow(&self) -> &HashMap<NodeId, f64> {
        &self.max_inflow
    }

    /// A node of the graph with its inflow cap
    pub fn node(&self, id: &str) -> Option<Node> {
        self.graph.contains_node(id).then(|| Node {
            id: id.to_string(),
            max_inflow: self.max_inflow.get(id).copied(),
        })
    }

    pub fn upstream_of(&self, target: &str) -> BTreeSet<NodeId> {
        upstream_nodes(&self.graph, target)
    }

    pub fn find_upstream_nodes<S: AsRef<str>>(&self, targets: &[S]) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
        find_upstream_nodes(&self.graph, targets)
    }

    pub fn connected_catchments(&self, nodes: &BTreeSet<NodeId>) -> Vec<&Catchment> {
        connected_catchments(&self.catchments, nodes)
    }

    pub fn travel_time(&self, source: &str, target: &str) -> Result<f64> {
        travel_time(&self.graph, source, target)
    }

    pub fn travel_times_to(&self, target: &str) -> HashMap<NodeId, f64> {
        travel_times_to(&self.graph, target)
    }

    pub fn trace_between<S: AsRef<str>>(&self, nodes: &[S]) -> Result<TracedPaths> {
        trace_between(&self.graph, nodes)
    }
}

/// Lifecycle of the mapped network
#[derive(Debug, Clone, Default)]
pub enum MappingState {
    #[default]
    Unmapped,
    Mapped(MappedNetwork),
}

/// A sewer network backed by a record store, mapped on first use
#[derive(Debug)]
pub struct StormNetwork<R> {
    records: R,
    params: NetworkParams,
    state: MappingState,
}

impl<R> StormNetwork<R>
where
    R: NetworkRecords + CatchmentStore,
{
    pub fn new(records: R, params: NetworkParams) -> Self {
        Self {
            records,
            params,
            state: MappingState::Unmapped,
        }
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.state, MappingState::Mapped(_))
    }

    /// Drop the mapped network so the next query rebuilds it
    pub fn invalidate(&mut self) {
        self.state = MappingState::Unmapped;
    }

    fn rebuild(&mut self) -> Result<()> {
        let mapped = MappedNetwork::build(&self.records, &self.params)?;
        info!(
            "Network mapped with {} catchments and {} issues",
            mapped.catchments.len(),
            mapped.report.issues.len()
        );
        self.state = MappingState::Mapped(mapped);
        Ok(())
    }

    fn current(&self) -> Result<&MappedNetwork> {
        match &self.state {
            MappingState::Mapped(mapped) => Ok(mapped),
            MappingState::Unmapped => Err(Error::Algorithm("network is not mapped".into())),
        }
    }

    /// Rebuild the mapped network from the records
    pub fn map_network(&mut self) -> Result<&MappedNetwork> {
        self.rebuild()?;
        self.current()
    }

    /// The mapped network, building it first if needed
    pub fn mapped(&mut self) -> Result<&MappedNetwork> {
        if !self.is_mapped() {
            self.rebuild()?;
        }
        self.current()
    }

    pub fn find_upstream_nodes<S: AsRef<str>>(
        &mut self,
        targets: &[S],
    ) -> Result<BTreeMap<NodeId, BTreeSet<NodeId>>> {
        Ok(self.mapped()?.find_upstream_nodes(targets))
    }

    pub fn find_connected_catchments(&mut self, nodes: &BTreeSet<NodeId>) -> Result<Vec<&Catchment>> {
        Ok(self.mapped()?.connected_catchments(nodes))
    }

    pub fn travel_time(&mut self, source: &str, target: &str) -> Result<f64> {
        self.mapped()?.travel_time(source, target)
    }

    pub fn trace_between<S: AsRef<str>>(&mut self, nodes: &[S]) -> Result<TracedPaths> {
        self.mapped()?.trace_between(nodes)
    }
}
