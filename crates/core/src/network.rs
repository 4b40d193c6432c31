//! Network data model
//!
//! Fixed-field structures for the parts of a sewer model the analysis needs:
//! nodes, link-like structures (pipes, weirs, pumps, orifices) and catchments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a network node (manhole, basin, outlet, ...)
pub type NodeId = String;

/// A network node.
///
/// Graph membership is implicit: a node is part of the flow graph when it has
/// at least one incident edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Maximum inflow accepted by the node, accumulated from inlet caps and
    /// regulation rules
    #[serde(default)]
    pub max_inflow: Option<f64>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            max_inflow: None,
        }
    }
}

/// Kind of link-like structure.
///
/// All kinds are structurally identical for graph purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Pipe,
    Weir,
    Pump,
    Orifice,
}

impl LinkKind {
    /// All kinds, in the order they are added to the graph
    pub const ALL: [LinkKind; 4] = [
        LinkKind::Pipe,
        LinkKind::Weir,
        LinkKind::Pump,
        LinkKind::Orifice,
    ];
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkKind::Pipe => "Link",
            LinkKind::Weir => "Weir",
            LinkKind::Pump => "Pump",
            LinkKind::Orifice => "Orifice",
        };
        f.write_str(name)
    }
}

/// A directed link-like structure between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    #[serde(default)]
    pub from_node: Option<NodeId>,
    #[serde(default)]
    pub to_node: Option<NodeId>,
    /// Length, used as the edge weight
    #[serde(default)]
    pub length: f64,
    /// Time for flow to traverse the link, in seconds. The time-area
    /// method lags rainfall by `travel_time / 60` one-minute samples.
    #[serde(default)]
    pub travel_time: f64,
}

impl Link {
    pub fn new(
        id: impl Into<String>,
        from_node: impl Into<NodeId>,
        to_node: impl Into<NodeId>,
        length: f64,
        travel_time: f64,
    ) -> Self {
        Self {
            id: id.into(),
            from_node: Some(from_node.into()),
            to_node: Some(to_node.into()),
            length,
            travel_time,
        }
    }

    /// Both endpoints, if the link is connected at both ends
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        match (self.from_node.as_deref(), self.to_node.as_deref()) {
            (Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => Some((from, to)),
            _ => None,
        }
    }
}

/// A land area discharging into a single network node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catchment {
    pub id: String,
    /// Area in m²
    pub area: f64,
    /// Impervious share in percent (0-100)
    pub imperviousness: f64,
    /// Hydrological reduction factor applied to the impervious area
    pub reduction_factor: f64,
    /// Time of concentration in minutes
    pub concentration_time: f64,
    pub persons: f64,
    #[serde(default)]
    pub net_type_no: Option<i32>,
    /// Whether reduction factor and concentration time came from the
    /// catchment's own record instead of a shared parameter set
    #[serde(default)]
    pub use_local_parameters: bool,
    /// Node the catchment discharges into; `None` when disconnected
    #[serde(default)]
    pub node_id: Option<NodeId>,
}

impl Catchment {
    /// Impervious area in m²
    pub fn impervious_area(&self) -> f64 {
        self.area * self.imperviousness / 1e2
    }

    /// Impervious area scaled by the reduction factor, in m²
    pub fn reduced_area(&self) -> f64 {
        self.impervious_area() * self.reduction_factor
    }
}
