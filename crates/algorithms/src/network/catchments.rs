//! Catchment loading and aggregation
//!
//! Loading resolves each catchment's hydrological parameters:
//! - local parameters when the catchment record asks for them
//! - otherwise the shared parameter set it references
//! - otherwise a degraded default (7 min concentration time, no reduction)
//!
//! Aggregation picks the catchments connected to a set of nodes.

use std::collections::{BTreeSet, HashMap};
use stormnet_core::records::{CatchmentRecord, CatchmentStore, ParameterSetRecord};
use stormnet_core::{Catchment, Error, NodeId, Result};
use tracing::{debug, warn};

/// Concentration time used when no parameters can be resolved, in minutes
pub const DEFAULT_CONCENTRATION_TIME: f64 = 7.0;
/// Reduction factor used when no parameters can be resolved
pub const DEFAULT_REDUCTION_FACTOR: f64 = 0.0;

/// Unit of the concentration times stored in the records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    #[default]
    Minutes,
    Seconds,
}

impl TimeUnit {
    fn to_minutes(self, value: f64) -> f64 {
        match self {
            TimeUnit::Minutes => value,
            TimeUnit::Seconds => value / 60.0,
        }
    }
}

/// Unit of the registered catchment areas (geometry areas are always m²)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AreaUnit {
    #[default]
    SquareMetres,
    Hectares,
}

impl AreaUnit {
    fn to_square_metres(self, value: f64) -> f64 {
        match self {
            AreaUnit::SquareMetres => value,
            AreaUnit::Hectares => value * 1e4,
        }
    }
}

/// Parameters for catchment loading
#[derive(Debug, Clone, Default)]
pub struct CatchmentLoadParams {
    pub concentration_time_unit: TimeUnit,
    pub area_unit: AreaUnit,
}

/// Outcome of looking up a catchment's hydrological parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterLookup {
    /// Values from the catchment's own record
    Local { reduction_factor: f64, concentration_time: f64 },
    /// Values from the referenced parameter set
    Shared { reduction_factor: f64, concentration_time: f64 },
    /// Nothing usable was found
    NotFound,
}

/// Look up the reduction factor and concentration time of a catchment record.
///
/// Values are returned in the units of the store.
pub fn resolve_parameters(
    record: &CatchmentRecord,
    parameter_sets: &HashMap<String, ParameterSetRecord>,
) -> ParameterLookup {
    if record.local_parameters {
        return match (record.reduction_factor, record.concentration_time) {
            (Some(reduction_factor), Some(concentration_time)) => ParameterLookup::Local {
                reduction_factor,
                concentration_time,
            },
            _ => ParameterLookup::NotFound,
        };
    }

    record
        .parameter_set_id
        .as_ref()
        .and_then(|id| parameter_sets.get(id))
        .map_or(ParameterLookup::NotFound, |set| ParameterLookup::Shared {
            reduction_factor: set.reduction_factor,
            concentration_time: set.concentration_time,
        })
}

/// Load catchments from a store and attach them to their nodes.
///
/// A record without any area is malformed and fails the load. Connections
/// for unknown catchments are ignored.
pub fn load_catchments<S>(store: &S, params: &CatchmentLoadParams) -> Result<Vec<Catchment>>
where
    S: CatchmentStore + ?Sized,
{
    let parameter_sets: HashMap<String, ParameterSetRecord> = store
        .parameter_sets()?
        .into_iter()
        .map(|set| (set.id.clone(), set))
        .collect();

    let mut catchments = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in store.catchments()? {
        let area = match (record.area, record.shape_area) {
            (Some(area), _) => params.area_unit.to_square_metres(area),
            (None, Some(shape_area)) => shape_area.abs(),
            (None, None) => {
                return Err(Error::invalid_record(&record.id, "catchment has no area"));
            }
        };

        let (reduction_factor, concentration_time, use_local_parameters) =
            match resolve_parameters(&record, &parameter_sets) {
                ParameterLookup::Local {
                    reduction_factor,
                    concentration_time,
                } => (
                    reduction_factor,
                    params.concentration_time_unit.to_minutes(concentration_time),
                    true,
                ),
                ParameterLookup::Shared {
                    reduction_factor,
                    concentration_time,
                } => (
                    reduction_factor,
                    params.concentration_time_unit.to_minutes(concentration_time),
                    false,
                ),
                ParameterLookup::NotFound => {
                    warn!(
                        "{:?} not found in hydrological parameters (catchment {})",
                        record.parameter_set_id, record.id
                    );
                    (
                        DEFAULT_REDUCTION_FACTOR,
                        DEFAULT_CONCENTRATION_TIME,
                        record.local_parameters,
                    )
                }
            };

        let catchment = Catchment {
            id: record.id,
            area,
            imperviousness: record.imperviousness,
            reduction_factor,
            concentration_time,
            persons: record.persons.unwrap_or(0.0),
            net_type_no: record.net_type_no,
            use_local_parameters,
            node_id: None,
        };
        // a repeated id replaces the earlier row
        match index.get(&catchment.id) {
            Some(&i) => {
                debug!("Catchment {} repeated, keeping the last row", catchment.id);
                catchments[i] = catchment;
            }
            None => {
                index.insert(catchment.id.clone(), catchments.len());
                catchments.push(catchment);
            }
        }
    }

    for connection in store.connections()? {
        match index.get(&connection.catchment_id) {
            Some(&i) => catchments[i].node_id = Some(connection.node_id),
            None => debug!(
                "Connection for unknown catchment {} ignored",
                connection.catchment_id
            ),
        }
    }

    debug!("Loaded {} catchments", catchments.len());
    Ok(catchments)
}

/// Catchments discharging into any of `nodes`
pub fn connected_catchments<'a>(
    catchments: &'a [Catchment],
    nodes: &BTreeSet<NodeId>,
) -> Vec<&'a Catchment> {
    catchments
        .iter()
        .filter(|c| c.node_id.as_ref().is_some_and(|n| nodes.contains(n)))
        .collect()
}

/// Catchments grouped by the node they discharge into
pub(crate) fn catchments_by_node(catchments: &[Catchment]) -> HashMap<&str, Vec<&Catchment>> {
    let mut by_node: HashMap<&str, Vec<&Catchment>> = HashMap::new();
    for catchment in catchments {
        if let Some(node) = catchment.node_id.as_deref() {
            by_node.entry(node).or_default().push(catchment);
        }
    }
    by_node
}
