//! Error types for the labor_forecast crate

use series_math::MathError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the labor_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The dataset file could not be read or written
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset file is not valid JSON
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The dataset parsed but a known field has the wrong shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A produced forecast broke one of its invariants
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error from series math helpers
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error while serializing the forecast bundle
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ForecastError::Io {
            path: path.into(),
            source,
        }
    }
}
