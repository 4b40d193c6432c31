//! # Stormnet Core
//!
//! Core types, record adapters and I/O for the stormnet network analysis library.
//!
//! This crate provides:
//! - `Node`, `Link`, `Catchment`: the fixed-field network data model
//! - `NetworkRecords` / `CatchmentStore`: adapter traits over a model database
//! - `NetworkModel`: an in-memory store that can be loaded from JSON
//! - `RainfallSeries`: a padded, uniformly sampled intensity series
//! - Algorithm traits for consistent API

pub mod error;
pub mod io;
pub mod network;
pub mod rainfall;
pub mod records;

pub use error::{Error, Result};
pub use network::{Catchment, Link, LinkKind, Node, NodeId};
pub use rainfall::{RainfallParams, RainfallSeries};
pub use records::{CatchmentStore, NetworkModel, NetworkRecords};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::network::{Catchment, Link, LinkKind, Node, NodeId};
    pub use crate::rainfall::{RainfallParams, RainfallSeries};
    pub use crate::records::{CatchmentStore, NetworkModel, NetworkRecords};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in stormnet.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
