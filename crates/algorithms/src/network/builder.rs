//! Flow graph construction
//!
//! Turns network records into a directed, length-weighted flow graph plus a
//! per-node maximum-inflow map. The steps run in a fixed order:
//!
//! 1. One edge per connected link-like record (pipes, weirs, pumps, orifices)
//! 2. Optional inlet caps: capped nodes are cut off from their inflowing links
//! 3. Regulation capping: regulated links are removed and their tabulated
//!    maximum is added to the downstream node's inflow cap
//! 4. Optional pruning so every junction drains to exactly one outlet

use super::flow_graph::{FlowEdge, FlowGraph};
use super::pruning::prune_to_single_outlet;
use std::collections::HashMap;
use stormnet_core::records::{NetworkModel, NetworkRecords};
use stormnet_core::{Algorithm, Error, Link, LinkKind, NodeId, Result};
use tracing::{debug, info, warn};

/// Parameters for graph construction
#[derive(Debug, Clone, Default)]
pub struct GraphBuildParams {
    /// Load inlet caps from inlet-controlled nodes and disconnect the links
    /// feeding them. Default: false
    pub use_max_inflow: bool,
    /// Skip regulation capping entirely. Default: false
    pub ignore_regulations: bool,
    /// Prune branches so every junction leads to a single outlet. Default: false
    pub remove_edges: bool,
}

/// A recoverable problem met while building the graph
#[derive(Debug, Clone, PartialEq)]
pub enum BuildIssue {
    /// A link or structure lacks one of its endpoints and was skipped
    UnconnectedLink { kind: LinkKind, id: String },
    /// A regulation targeted an edge that was already gone
    EdgeAlreadyRemoved { from: NodeId, to: NodeId },
    /// A regulation referenced a link that is not in the model
    UnknownRegulatedLink { link_id: String },
    /// Pruning found no path from a junction to any outlet
    NoOutletReachable { junction: NodeId },
}

/// Counters and issues collected during a build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub edges_added: usize,
    pub removed_by_inlet_caps: usize,
    pub removed_by_regulations: usize,
    pub removed_by_pruning: usize,
    pub issues: Vec<BuildIssue>,
}

impl BuildReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Output of graph construction
#[derive(Debug, Clone, Default)]
pub struct BuiltGraph {
    pub graph: FlowGraph,
    /// Maximum inflow per capped node
    pub max_inflow: HashMap<NodeId, f64>,
    pub report: BuildReport,
}

/// Graph construction algorithm
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder;

impl Algorithm for GraphBuilder {
    type Input = NetworkModel;
    type Output = BuiltGraph;
    type Params = GraphBuildParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Graph Builder"
    }

    fn description(&self) -> &'static str {
        "Build a directed flow graph with inflow caps from network records"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        build_graph(&input, &params)
    }
}

/// Build the flow graph and inflow caps from network records.
///
/// Unconnected links, stale regulation targets and unreachable outlets are
/// logged and collected in the report; they never abort the build. Records
/// with a negative or non-finite length are malformed and fail the build.
pub fn build_graph<R>(records: &R, params: &GraphBuildParams) -> Result<BuiltGraph>
where
    R: NetworkRecords + ?Sized,
{
    let mut built = BuiltGraph::default();

    // Step 1: one edge per connected link-like record
    let mut links: Vec<Link> = Vec::new();
    for kind in LinkKind::ALL {
        for link in records.links(kind)? {
            if !link.length.is_finite() || link.length < 0.0 {
                return Err(Error::invalid_record(
                    &link.id,
                    format!("length must be finite and non-negative, got {}", link.length),
                ));
            }
            match link.endpoints() {
                Some((from, to)) => {
                    built.graph.add_edge(
                        from,
                        to,
                        FlowEdge {
                            link_id: link.id.clone(),
                            kind,
                            length: link.length,
                            travel_time: link.travel_time,
                        },
                    );
                    built.report.edges_added += 1;
                }
                None => {
                    warn!(
                        "{} {} is unconnected ({:?}-{:?})",
                        kind, link.id, link.from_node, link.to_node
                    );
                    built.report.issues.push(BuildIssue::UnconnectedLink {
                        kind,
                        id: link.id.clone(),
                    });
                }
            }
            links.push(link);
        }
    }
    debug!("Added {} edges", built.report.edges_added);

    // Step 2: inlet caps
    if params.use_max_inflow {
        apply_inlet_caps(records, &links, &mut built)?;
    }

    // Step 3: regulation capping
    if !params.ignore_regulations {
        apply_regulations(records, &links, &mut built)?;
    }

    // Step 4: single-outlet pruning
    if params.remove_edges {
        let outcome = prune_to_single_outlet(&mut built.graph);
        built.report.removed_by_pruning = outcome.removed.len();
        built.report.issues.extend(
            outcome
                .unreachable
                .into_iter()
                .map(|junction| BuildIssue::NoOutletReachable { junction }),
        );
    }

    info!(
        "Mapped network: {} nodes, {} edges, {} capped nodes",
        built.graph.node_count(),
        built.graph.edge_count(),
        built.max_inflow.len()
    );
    Ok(built)
}

fn accumulate(max_inflow: &mut HashMap<NodeId, f64>, node: &str, value: f64) {
    *max_inflow.entry(node.to_string()).or_insert(0.0) += value;
}

fn apply_inlet_caps<R>(records: &R, links: &[Link], built: &mut BuiltGraph) -> Result<()>
where
    R: NetworkRecords + ?Sized,
{
    for node in records.nodes()? {
        let Some(max_inlet) = node.max_inlet.filter(|_| node.inlet_controlled) else {
            continue;
        };
        accumulate(&mut built.max_inflow, &node.id, max_inlet);

        let feeding = links
            .iter()
            .filter_map(Link::endpoints)
            .filter(|(_, to)| *to == node.id);
        for (from, to) in feeding {
            if built.graph.remove_edge(from, to) {
                built.report.removed_by_inlet_caps += 1;
            }
        }
    }
    debug!(
        "Inlet caps removed {} edges",
        built.report.removed_by_inlet_caps
    );
    Ok(())
}

/// Maximum `value2` per regulation function over the active rows
fn regulation_table<R>(records: &R) -> Result<HashMap<String, f64>>
where
    R: NetworkRecords + ?Sized,
{
    let mut table: HashMap<String, f64> = HashMap::new();
    for row in records.regulation_rows()? {
        if !row.is_active() {
            continue;
        }
        table
            .entry(row.function_id)
            .and_modify(|v| *v = v.max(row.value2))
            .or_insert(row.value2);
    }
    Ok(table)
}

/// Regulated link lookup by id. Ids may repeat across record tables; the
/// first record in pipe, weir, pump, orifice order wins.
fn regulation_targets(links: &[Link]) -> HashMap<&str, &Link> {
    let mut targets: HashMap<&str, &Link> = HashMap::new();
    for link in links {
        targets.entry(link.id.as_str()).or_insert(link);
    }
    targets
}

fn apply_regulations<R>(records: &R, links: &[Link], built: &mut BuiltGraph) -> Result<()>
where
    R: NetworkRecords + ?Sized,
{
    let table = regulation_table(records)?;
    let targets = regulation_targets(links);

    for row in records.regulated_links()? {
        if row.type_no != 1 {
            continue;
        }
        let Some(value) = row.function_id.as_ref().and_then(|f| table.get(f)) else {
            continue;
        };
        let Some(link) = targets.get(row.link_id.as_str()) else {
            warn!("Regulated link {} not found in network", row.link_id);
            built.report.issues.push(BuildIssue::UnknownRegulatedLink {
                link_id: row.link_id.clone(),
            });
            continue;
        };
        let Some((from, to)) = link.endpoints() else {
            continue;
        };

        accumulate(&mut built.max_inflow, to, *value);
        if built.graph.remove_edge(from, to) {
            built.report.removed_by_regulations += 1;
        } else {
            warn!("Could not remove link {}-{}", from, to);
            built.report.issues.push(BuildIssue::EdgeAlreadyRemoved {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
    }
    debug!(
        "Regulations removed {} edges",
        built.report.removed_by_regulations
    );
    Ok(())
}
