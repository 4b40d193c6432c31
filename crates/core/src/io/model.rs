//! JSON network model reading

use crate::error::Result;
use crate::records::NetworkModel;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Read a network model from a JSON file.
///
/// Tables missing from the file are empty; a file that is not a model is an error.
pub fn read_network_model<P: AsRef<Path>>(path: P) -> Result<NetworkModel> {
    let file = File::open(path.as_ref())?;
    let model: NetworkModel = serde_json::from_reader(BufReader::new(file))?;
    debug!(
        "Read model {}: {} nodes, {} catchments",
        path.as_ref().display(),
        model.nodes.len(),
        model.catchments.len()
    );
    Ok(model)
}

/// Read a network model from a JSON string
pub fn read_network_model_from_str(json: &str) -> Result<NetworkModel> {
    Ok(serde_json::from_str(json)?)
}
