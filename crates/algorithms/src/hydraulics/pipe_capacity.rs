//! Full-flow capacity of a circular pipe
//!
//! Finds the velocity at which the Darcy-Weisbach friction slope of a pipe
//! running full equals its bed slope. The friction factor at each trial
//! velocity comes from a fixed-point solve of the Colebrook-White relation
//! in the form
//!
//! `f = 2 / (6.4 - 2.45 ln(k/R + 4.7 / (Re √f)))²`
//!
//! and the velocity is bracketed by bisection in log-space over
//! [0.001, 500] m/s. Discharge is velocity times the full cross-section.
//!
//! Reference:
//! Colebrook, C.F. (1939). Turbulent flow in pipes, with particular reference
//! to the transition region between the smooth and rough pipe laws.
//! *J. Institution of Civil Engineers*, 11(4), 133–156.

use std::f64::consts::PI;
use stormnet_core::{Algorithm, Error, Result};
use tracing::debug;

/// Gravitational acceleration, m/s²
const GRAVITY: f64 = 9.82;
/// Kinematic viscosity of water at about 10 °C, m²/s
const KINEMATIC_VISCOSITY: f64 = 1.3e-6;
/// Wall roughness of plastic pipes, m
const ROUGHNESS_PLASTIC: f64 = 0.001;
/// Wall roughness of every other material, m
const ROUGHNESS_OTHER: f64 = 0.0015;

const VELOCITY_MIN: f64 = 0.001;
const VELOCITY_MAX: f64 = 500.0;
const INITIAL_FRICTION: f64 = 0.01;

/// Pipe geometry and wall material
#[derive(Debug, Clone, PartialEq)]
pub struct PipeGeometry {
    /// Internal diameter in m
    pub diameter: f64,
    /// Bed slope (m/m)
    pub slope: f64,
    /// Material name; names starting with `p` count as plastic
    pub material: String,
}

impl PipeGeometry {
    pub fn new(diameter: f64, slope: f64, material: impl Into<String>) -> Self {
        Self {
            diameter,
            slope,
            material: material.into(),
        }
    }

    /// Equivalent sand roughness of the pipe wall, m
    pub fn roughness(&self) -> f64 {
        match self.material.chars().next() {
            Some(c) if c.eq_ignore_ascii_case(&'p') => ROUGHNESS_PLASTIC,
            _ => ROUGHNESS_OTHER,
        }
    }
}

/// Parameters for the capacity solver
#[derive(Debug, Clone)]
pub struct PipeCapacityParams {
    /// Tolerance on the slope, the friction factor and the velocity bracket.
    /// Default: 1e-6
    pub resolution: f64,
    /// Bisection steps before giving up. Default: 200
    pub max_outer_iterations: usize,
    /// Friction factor iterations per bisection step. Default: 1000
    pub max_inner_iterations: usize,
}

impl Default for PipeCapacityParams {
    fn default() -> Self {
        Self {
            resolution: 1e-6,
            max_outer_iterations: 200,
            max_inner_iterations: 1000,
        }
    }
}

/// Result of the capacity solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapacitySolution {
    /// Velocity (m/s) and discharge (m³/s) at which friction slope matches
    /// the bed slope
    Converged {
        velocity: f64,
        discharge: f64,
        iterations: usize,
    },
    /// No velocity matched the slope within the resolution
    NoSolution,
}

impl CapacitySolution {
    pub fn discharge(&self) -> Option<f64> {
        match self {
            CapacitySolution::Converged { discharge, .. } => Some(*discharge),
            CapacitySolution::NoSolution => None,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, CapacitySolution::Converged { .. })
    }
}

/// Pipe capacity algorithm
#[derive(Debug, Clone, Default)]
pub struct PipeCapacity;

impl Algorithm for PipeCapacity {
    type Input = PipeGeometry;
    type Output = CapacitySolution;
    type Params = PipeCapacityParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Pipe Capacity"
    }

    fn description(&self) -> &'static str {
        "Full-flow discharge of a circular pipe (Colebrook-White)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        full_flow_capacity(input.diameter, input.slope, &input.material, &params)
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be positive and finite".into(),
        })
    }
}

/// Darcy friction factor at Reynolds number `re`, or `None` when the
/// fixed-point iteration does not settle
fn friction_factor(relative_roughness: f64, re: f64, params: &PipeCapacityParams) -> Option<f64> {
    let mut f = INITIAL_FRICTION;
    for _ in 0..params.max_inner_iterations {
        let next = 2.0 / (6.4 - 2.45 * (relative_roughness + 4.7 / (re * f.sqrt())).ln()).powi(2);
        if !next.is_finite() {
            return None;
        }
        if (next - f).abs() <= params.resolution {
            return Some(next);
        }
        f = next;
    }
    None
}

/// Full-flow discharge of a circular pipe.
///
/// # Arguments
/// * `diameter` - Internal diameter (m)
/// * `slope` - Bed slope (m/m)
/// * `material` - Wall material; a leading `p`/`P` selects plastic roughness
/// * `params` - Tolerance and iteration caps
///
/// # Returns
/// [`CapacitySolution::Converged`] with velocity and discharge, or
/// [`CapacitySolution::NoSolution`] when the velocity bracket collapses or an
/// iteration cap is hit before the friction slope matches.
pub fn full_flow_capacity(
    diameter: f64,
    slope: f64,
    material: &str,
    params: &PipeCapacityParams,
) -> Result<CapacitySolution> {
    positive("diameter", diameter)?;
    positive("slope", slope)?;
    positive("resolution", params.resolution)?;
    if material.trim().is_empty() {
        return Err(Error::InvalidParameter {
            name: "material",
            value: String::new(),
            reason: "material name is empty".into(),
        });
    }

    let geometry = PipeGeometry::new(diameter, slope, material.trim());
    let radius = diameter / 4.0;
    let relative_roughness = geometry.roughness() / radius;

    let (mut v_min, mut v_max) = (VELOCITY_MIN, VELOCITY_MAX);
    for iteration in 1..=params.max_outer_iterations {
        let velocity = 10f64.powf((v_min.log10() + v_max.log10()) / 2.0);
        let re = velocity * radius / KINEMATIC_VISCOSITY;

        let Some(f) = friction_factor(relative_roughness, re, params) else {
            debug!("Friction factor did not settle at V = {:.6} m/s", velocity);
            return Ok(CapacitySolution::NoSolution);
        };
        let gradient = f * velocity * velocity / (2.0 * GRAVITY * radius);

        if (slope - gradient).abs() <= params.resolution {
            let discharge = velocity * (diameter / 2.0).powi(2) * PI;
            debug!(
                "Capacity of D={} m at I={}: V={:.4} m/s, Q={:.5} m³/s after {} steps",
                diameter, slope, velocity, discharge, iteration
            );
            return Ok(CapacitySolution::Converged {
                velocity,
                discharge,
                iterations: iteration,
            });
        }

        if slope > gradient {
            v_min = velocity;
        } else {
            v_max = velocity;
        }
        if v_max - v_min <= params.resolution {
            debug!("Velocity bracket collapsed without matching slope {}", slope);
            return Ok(CapacitySolution::NoSolution);
        }
    }

    debug!(
        "No capacity found within {} bisection steps",
        params.max_outer_iterations
    );
    Ok(CapacitySolution::NoSolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn capacity(diameter: f64, slope: f64, material: &str) -> CapacitySolution {
        full_flow_capacity(diameter, slope, material, &PipeCapacityParams::default()).unwrap()
    }

    #[test]
    fn test_pvc_converges() {
        let solution = capacity(0.30, 0.005, "PVC");
        let q = solution.discharge().unwrap();
        assert!(q > 0.0);
        // about 1 m/s in a 300 mm plastic pipe at 5 per mille
        assert!(q > 0.05 && q < 0.2, "Q = {}", q);

        let CapacitySolution::Converged { velocity, discharge, .. } = solution else {
            panic!("expected convergence");
        };
        assert_relative_eq!(discharge, velocity * 0.15 * 0.15 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_rough_material_carries_less() {
        let plastic = capacity(0.30, 0.005, "PVC").discharge().unwrap();
        let concrete = capacity(0.30, 0.005, "Concrete").discharge().unwrap();
        let lower_case = capacity(0.30, 0.005, "pe").discharge().unwrap();
        assert!(concrete < plastic);
        assert_relative_eq!(lower_case, plastic, epsilon = 1e-12);
    }

    #[test]
    fn test_monotonic_in_diameter() {
        let mut previous = 0.0;
        for diameter in [0.1, 0.15, 0.2, 0.3, 0.5, 0.8, 1.2] {
            let q = capacity(diameter, 0.003, "Concrete").discharge().unwrap();
            assert!(q >= previous, "Q({}) = {} < {}", diameter, q, previous);
            previous = q;
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let params = PipeCapacityParams::default();
        for (d, i, m) in [(0.0, 0.005, "PVC"), (f64::NAN, 0.005, "PVC"), (0.3, -0.01, "PVC"), (0.3, 0.005, " ")] {
            let result = full_flow_capacity(d, i, m, &params);
            assert!(matches!(result, Err(Error::InvalidParameter { .. })), "{} {} {:?}", d, i, m);
        }
    }

    #[test]
    fn test_iteration_cap_gives_no_solution() {
        let params = PipeCapacityParams {
            max_outer_iterations: 2,
            ..Default::default()
        };
        let result = full_flow_capacity(0.3, 0.005, "PVC", &params).unwrap();
        assert_eq!(result, CapacitySolution::NoSolution);
        assert_eq!(result.discharge(), None);
    }

    #[test]
    fn test_algorithm_trait() {
        let algo = PipeCapacity;
        assert_eq!(algo.name(), "Pipe Capacity");
        let direct = capacity(0.4, 0.002, "Steel");
        let via = algo.execute_default(PipeGeometry::new(0.4, 0.002, "Steel")).unwrap();
        assert_eq!(direct, via);
    }
}
