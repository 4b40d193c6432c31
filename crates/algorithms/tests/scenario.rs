//! End-to-end scenarios over an in-memory network model.
//!
//! ```text
//!   A --L1--> B --L2--> C --L4--> OUT
//!             ^ \
//!   D --L3----+  `--W1 (overflow)--> OVF
//!   ^
//!   E (pump P1, regulated)
//! ```

use approx::assert_relative_eq;
use std::collections::BTreeSet;
use stormnet_algorithms::prelude::*;
use stormnet_algorithms::network::{BuildIssue, NetworkParams};
use stormnet_core::io::read_network_model_from_str;

const MODEL: &str = r#"{
    "links": [
        {"id": "L1", "from_node": "A", "to_node": "B", "length": 100, "travel_time": 5},
        {"id": "L2", "from_node": "B", "to_node": "C", "length": 200, "travel_time": 10},
        {"id": "L3", "from_node": "D", "to_node": "B", "length": 50, "travel_time": 2},
        {"id": "L4", "from_node": "C", "to_node": "OUT", "length": 10, "travel_time": 1},
        {"id": "L5", "from_node": "X", "length": 10}
    ],
    "weirs": [
        {"id": "W1", "from_node": "B", "to_node": "OVF", "length": 1000, "travel_time": 0}
    ],
    "pumps": [
        {"id": "P1", "from_node": "E", "to_node": "D", "length": 20, "travel_time": 1}
    ],
    "nodes": [
        {"id": "C", "inlet_controlled": false, "max_inlet": 4.0}
    ],
    "regulation_rows": [
        {"function_id": "F1", "value2": 0.1},
        {"function_id": "F1", "value2": 0.3, "active": true},
        {"function_id": "F1", "value2": 0.5, "active": false}
    ],
    "regulated_links": [
        {"link_id": "P1", "function_id": "F1", "type_no": 1},
        {"link_id": "GONE", "function_id": "F1", "type_no": 1}
    ],
    "catchments": [
        {"id": "CA", "area": 10000, "imperviousness": 50, "local_parameters": true,
         "reduction_factor": 0.8, "concentration_time": 5},
        {"id": "CD", "area": 4000, "imperviousness": 100, "parameter_set_id": "P-STD"},
        {"id": "CE", "area": 8000, "imperviousness": 100, "parameter_set_id": "P-STD"}
    ],
    "parameter_sets": [
        {"id": "P-STD", "reduction_factor": 0.5, "concentration_time": 3}
    ],
    "connections": [
        {"catchment_id": "CA", "node_id": "A"},
        {"catchment_id": "CD", "node_id": "D"},
        {"catchment_id": "CE", "node_id": "E"}
    ]
}"#;

fn model() -> NetworkModel {
    read_network_model_from_str(MODEL).unwrap()
}

fn set(ids: &[&str]) -> BTreeSet<NodeId> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn mapped(graph: GraphBuildParams) -> MappedNetwork {
    let params = NetworkParams {
        graph,
        ..Default::default()
    };
    MappedNetwork::build(&model(), &params).unwrap()
}

#[test]
fn test_regulated_pump_cuts_upstream() {
    let network = mapped(GraphBuildParams::default());

    assert_eq!(network.upstream_of("C"), set(&["A", "B", "C", "D"]));
    assert_relative_eq!(network.max_inflow()["D"], 0.3);
    assert_eq!(network.node("D").unwrap().max_inflow, Some(0.3));

    let report = network.report();
    assert_eq!(report.edges_added, 6);
    assert_eq!(report.removed_by_regulations, 1);
    assert!(report.issues.contains(&BuildIssue::UnconnectedLink {
        kind: LinkKind::Pipe,
        id: "L5".into(),
    }));
    assert!(report.issues.contains(&BuildIssue::UnknownRegulatedLink {
        link_id: "GONE".into(),
    }));
}

#[test]
fn test_ignore_regulations_keeps_pump() {
    let network = mapped(GraphBuildParams {
        ignore_regulations: true,
        ..Default::default()
    });
    assert_eq!(network.upstream_of("C"), set(&["A", "B", "C", "D", "E"]));
    assert!(network.max_inflow().is_empty());
}

#[test]
fn test_inlet_flag_required_for_caps() {
    // C has a max inlet but is not inlet-controlled
    let network = mapped(GraphBuildParams {
        use_max_inflow: true,
        ..Default::default()
    });
    assert!(!network.max_inflow().contains_key("C"));
    assert_eq!(network.report().removed_by_inlet_caps, 0);
}

#[test]
fn test_overflow_pruned_towards_nearest_outlet() {
    let unpruned = mapped(GraphBuildParams::default());
    assert_eq!(unpruned.graph().out_degree("B"), 2);

    let pruned = mapped(GraphBuildParams {
        remove_edges: true,
        ..Default::default()
    });
    assert_eq!(pruned.report().removed_by_pruning, 1);
    assert_eq!(pruned.graph().successors("B"), vec!["C"]);
    assert_eq!(pruned.upstream_of("OVF"), set(&["OVF"]));
    assert_eq!(pruned.upstream_of("OUT"), set(&["A", "B", "C", "D", "OUT"]));
}

#[test]
fn test_chain_travel_time_and_trace() {
    let network = mapped(GraphBuildParams::default());
    assert_relative_eq!(network.travel_time("A", "C").unwrap(), 15.0);
    assert_relative_eq!(network.travel_time("D", "OUT").unwrap(), 13.0);
    assert!(network.travel_time("C", "A").is_err());

    let traced = network.trace_between(&["A", "OUT"]).unwrap();
    assert_eq!(traced.nodes, set(&["A", "B", "C", "OUT"]));
    assert_eq!(traced.links, set(&["L1", "L2", "L4"]));
}

#[test]
fn test_catchments_resolved_and_aggregated() {
    let network = mapped(GraphBuildParams::default());
    let upstream = network.upstream_of("C");
    let ids: BTreeSet<&str> = network
        .connected_catchments(&upstream)
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(ids, ["CA", "CD"].into_iter().collect());

    let cd = &network.catchments()[1];
    assert_relative_eq!(cd.reduced_area(), 2000.0);
    assert_relative_eq!(cd.concentration_time, 3.0);
}

#[test]
fn test_runoff_at_outlet() {
    let network = mapped(GraphBuildParams::default());
    let rain = RainfallSeries::new(vec![1.0, 1.0, 1.0, 0.0, 0.0]).unwrap();
    let mut params = RunoffParams::default();
    params.additional_discharge.insert("B".into(), 0.01);

    let rational = compute_runoff(&network, &rain, "C", RunoffMethod::Rational, &params).unwrap();
    assert_eq!(rational.len(), 65);
    // CA 4000 m², CD 2000 m² reduced; 0.01 × 1000 fixed
    assert_relative_eq!(rational[0], 6.0 + 10.0, epsilon = 1e-9);
    assert_relative_eq!(rational[64], 10.0, epsilon = 1e-9);

    let time_area = compute_runoff(&network, &rain, "C", RunoffMethod::TimeArea, &params).unwrap();
    assert_eq!(time_area.len(), 65);
    assert_relative_eq!(time_area[0], 10.0, epsilon = 1e-9);
    let rain_volume = rational.sum() - 65.0 * 10.0;
    let lagged_volume = time_area.sum() - 65.0 * 10.0;
    assert_relative_eq!(rain_volume, lagged_volume, epsilon = 1e-9);
}

#[test]
fn test_storm_network_lazy_mapping() {
    let mut network = StormNetwork::new(model(), NetworkParams::default());
    assert!(!network.is_mapped());

    let upstream = network.find_upstream_nodes(&["C", "nowhere"]).unwrap();
    assert!(network.is_mapped());
    assert_eq!(upstream["nowhere"], set(&["nowhere"]));

    let found = network.find_connected_catchments(&upstream["C"]).unwrap();
    assert_eq!(found.len(), 2);
    assert_relative_eq!(network.travel_time("A", "C").unwrap(), 15.0);

    network.invalidate();
    let rebuilt = network.map_network().unwrap();
    assert_eq!(rebuilt.upstream_of("C").len(), 4);
}

#[test]
fn test_pipe_capacity_scenario() {
    let pvc = full_flow_capacity(0.30, 0.005, "PVC", &PipeCapacityParams::default()).unwrap();
    let concrete = full_flow_capacity(0.30, 0.005, "Beton", &PipeCapacityParams::default()).unwrap();
    assert!(pvc.discharge().unwrap() > concrete.discharge().unwrap());

    let via_trait = PipeCapacity
        .execute_default(PipeGeometry::new(0.30, 0.005, "PVC"))
        .unwrap();
    assert_eq!(via_trait, pvc);
}
