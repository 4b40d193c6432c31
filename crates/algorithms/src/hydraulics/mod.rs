//! Hydraulic calculations
//!
//! - Pipe capacity: full-flow discharge of a circular pipe (Colebrook-White)

mod pipe_capacity;

pub use pipe_capacity::{
    full_flow_capacity, CapacitySolution, PipeCapacity, PipeCapacityParams, PipeGeometry,
};
