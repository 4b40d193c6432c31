//! Error types for stormnet

use thiserror::Error;

/// Main error type for stormnet operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("No path from {from} to {to}")]
    NoPath { from: String, to: String },

    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Series length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

impl Error {
    pub fn invalid_record(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn no_path(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::NoPath {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Result type alias for stormnet operations
pub type Result<T> = std::result::Result<T, Error>;
