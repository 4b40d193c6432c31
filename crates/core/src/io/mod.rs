//! I/O operations for reading network models and rainfall, and writing results

mod model;
mod rainfall_text;
mod series_csv;

pub use model::{read_network_model, read_network_model_from_str};
pub use rainfall_text::{parse_rainfall_text, read_rainfall_text};
pub use series_csv::{write_series_csv, write_series_csv_to};
