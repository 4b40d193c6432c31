//! Record adapters
//!
//! The analysis never talks to a model database directly. It reads rows
//! through two traits:
//! - [`NetworkRecords`]: links and structures, nodes, regulation tables
//! - [`CatchmentStore`]: catchments, hydrological parameter sets, connections
//!
//! Every call hands back owned rows, so whatever cursor an implementation
//! opens is released before the call returns, on success and on failure.
//!
//! [`NetworkModel`] is a plain in-memory implementation of both traits that
//! can be deserialized from JSON.

use crate::error::Result;
use crate::network::{Link, LinkKind, NodeId};
use serde::{Deserialize, Serialize};

/// Node row: inlet control settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    /// Node is flagged as inlet-controlled
    #[serde(default)]
    pub inlet_controlled: bool,
    /// Maximum inlet discharge
    #[serde(default)]
    pub max_inlet: Option<f64>,
}

/// Row of a regulation (tabulated function) table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationRow {
    pub function_id: String,
    pub value2: f64,
    /// Stores without an activity column leave this unset; unset counts as active
    #[serde(default)]
    pub active: Option<bool>,
}

impl RegulationRow {
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

/// Assignment of a regulation function to a link or structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatedLinkRow {
    pub link_id: String,
    #[serde(default)]
    pub function_id: Option<String>,
    /// Regulation type; only type 1 caps the downstream inflow
    #[serde(default = "default_type_no")]
    pub type_no: i32,
}

fn default_type_no() -> i32 {
    1
}

/// Catchment row as stored, before parameter resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchmentRecord {
    pub id: String,
    /// Registered area in m²
    #[serde(default)]
    pub area: Option<f64>,
    /// Area computed from the geometry, used when `area` is unset
    #[serde(default)]
    pub shape_area: Option<f64>,
    #[serde(default)]
    pub persons: Option<f64>,
    #[serde(default)]
    pub net_type_no: Option<i32>,
    /// Impervious share in percent
    #[serde(default)]
    pub imperviousness: f64,
    /// Shared hydrological parameter set
    #[serde(default)]
    pub parameter_set_id: Option<String>,
    /// Use the local reduction factor / concentration time below
    #[serde(default)]
    pub local_parameters: bool,
    #[serde(default)]
    pub reduction_factor: Option<f64>,
    #[serde(default)]
    pub concentration_time: Option<f64>,
}

/// Shared hydrological parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSetRecord {
    pub id: String,
    pub reduction_factor: f64,
    pub concentration_time: f64,
}

/// Connection of a catchment to the node it discharges into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchmentConnection {
    pub catchment_id: String,
    pub node_id: NodeId,
}

/// Source of network rows
pub trait NetworkRecords {
    /// All link-like rows of one kind
    fn links(&self, kind: LinkKind) -> Result<Vec<Link>>;

    /// Node rows
    fn nodes(&self) -> Result<Vec<NodeRecord>>;

    /// Rows of the regulation function tables
    fn regulation_rows(&self) -> Result<Vec<RegulationRow>>;

    /// Regulation function assignments to links
    fn regulated_links(&self) -> Result<Vec<RegulatedLinkRow>>;
}

/// Source of catchment rows
pub trait CatchmentStore {
    fn catchments(&self) -> Result<Vec<CatchmentRecord>>;

    fn parameter_sets(&self) -> Result<Vec<ParameterSetRecord>>;

    fn connections(&self) -> Result<Vec<CatchmentConnection>>;
}

/// In-memory network model.
///
/// Every table is optional in the serialized form and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkModel {
    pub links: Vec<Link>,
    pub weirs: Vec<Link>,
    pub pumps: Vec<Link>,
    pub orifices: Vec<Link>,
    pub nodes: Vec<NodeRecord>,
    pub regulation_rows: Vec<RegulationRow>,
    pub regulated_links: Vec<RegulatedLinkRow>,
    pub catchments: Vec<CatchmentRecord>,
    pub parameter_sets: Vec<ParameterSetRecord>,
    pub connections: Vec<CatchmentConnection>,
}

impl NetworkModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pipe between two nodes
    pub fn with_link(
        mut self,
        id: &str,
        from: &str,
        to: &str,
        length: f64,
        travel_time: f64,
    ) -> Self {
        self.links.push(Link::new(id, from, to, length, travel_time));
        self
    }

    /// Add a catchment with local parameters, connected to `node`
    pub fn with_catchment(
        mut self,
        id: &str,
        node: &str,
        area: f64,
        imperviousness: f64,
        reduction_factor: f64,
        concentration_time: f64,
    ) -> Self {
        self.catchments.push(CatchmentRecord {
            id: id.to_string(),
            area: Some(area),
            shape_area: None,
            persons: None,
            net_type_no: None,
            imperviousness,
            parameter_set_id: None,
            local_parameters: true,
            reduction_factor: Some(reduction_factor),
            concentration_time: Some(concentration_time),
        });
        self.connections.push(CatchmentConnection {
            catchment_id: id.to_string(),
            node_id: node.to_string(),
        });
        self
    }
}

impl NetworkRecords for NetworkModel {
    fn links(&self, kind: LinkKind) -> Result<Vec<Link>> {
        let rows = match kind {
            LinkKind::Pipe => &self.links,
            LinkKind::Weir => &self.weirs,
            LinkKind::Pump => &self.pumps,
            LinkKind::Orifice => &self.orifices,
        };
        Ok(rows.clone())
    }

    fn nodes(&self) -> Result<Vec<NodeRecord>> {
        Ok(self.nodes.clone())
    }

    fn regulation_rows(&self) -> Result<Vec<RegulationRow>> {
        Ok(self.regulation_rows.clone())
    }

    fn regulated_links(&self) -> Result<Vec<RegulatedLinkRow>> {
        Ok(self.regulated_links.clone())
    }
}

impl CatchmentStore for NetworkModel {
    fn catchments(&self) -> Result<Vec<CatchmentRecord>> {
        Ok(self.catchments.clone())
    }

    fn parameter_sets(&self) -> Result<Vec<ParameterSetRecord>> {
        Ok(self.parameter_sets.clone())
    }

    fn connections(&self) -> Result<Vec<CatchmentConnection>> {
        Ok(self.connections.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_from_sparse_json() {
        let json = r#"{
            "links": [
                {"id": "L1", "from_node": "A", "to_node": "B", "length": 100.0, "travel_time": 5.0},
                {"id": "L2", "from_node": "B", "length": 20.0}
            ],
            "regulation_rows": [{"function_id": "F1", "value2": 0.2}],
            "regulated_links": [{"link_id": "L1", "function_id": "F1"}]
        }"#;
        let model: NetworkModel = serde_json::from_str(json).unwrap();

        let pipes = model.links(LinkKind::Pipe).unwrap();
        assert_eq!(pipes.len(), 2);
        assert_eq!(pipes[1].to_node, None);
        assert!(model.links(LinkKind::Weir).unwrap().is_empty());

        let rows = model.regulation_rows().unwrap();
        assert!(rows[0].is_active());
        assert_eq!(model.regulated_links().unwrap()[0].type_no, 1);
    }

    #[test]
    fn test_builder_helpers() {
        let model = NetworkModel::new()
            .with_link("L1", "A", "B", 10.0, 1.0)
            .with_catchment("C1", "A", 1000.0, 50.0, 0.9, 7.0);

        assert_eq!(model.links.len(), 1);
        assert_eq!(model.catchments().unwrap().len(), 1);
        assert_eq!(model.connections().unwrap()[0].node_id, "A");
    }
}
