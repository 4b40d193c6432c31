//! Rational method

use super::{RunoffParams, INTENSITY_TO_DISCHARGE};
use crate::network::{catchments_by_node, MappedNetwork};
use ndarray::Array1;
use stormnet_core::{Catchment, RainfallSeries, Result};
use tracing::debug;

/// Instantaneous response of one catchment: `rain × reduced area`, scaled
pub fn rational_response(catchment: &Catchment, rain: &RainfallSeries, scaling_factor: f64) -> Array1<f64> {
    let factor = INTENSITY_TO_DISCHARGE * catchment.reduced_area() * scaling_factor;
    rain.values().mapv(|intensity| intensity * factor)
}

/// Rational-method runoff at `target`.
///
/// Every catchment connected to a node upstream of the target contributes its
/// instantaneous response; fixed additional discharges are added unscaled.
pub fn rational_runoff(
    network: &MappedNetwork,
    rain: &RainfallSeries,
    target: &str,
    params: &RunoffParams,
) -> Result<Array1<f64>> {
    params.validate()?;

    let sources = network.upstream_of(target);
    let by_node = catchments_by_node(network.catchments());

    let mut total = Array1::zeros(rain.len());
    let mut contributing = 0usize;
    for source in &sources {
        params.add_discharge(source, &mut total);
        for catchment in by_node.get(source.as_str()).into_iter().flatten() {
            total += &rational_response(catchment, rain, params.scaling_factor);
            contributing += 1;
        }
    }

    debug!(
        "Rational runoff at {}: {} upstream nodes, {} catchments",
        target,
        sources.len(),
        contributing
    );
    Ok(total)
}
