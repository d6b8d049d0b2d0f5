//! # Series Math
//!
//! Small numerical helpers shared by the forecasting models.
//! This crate provides the series statistics used to calibrate forecasts and
//! the builder that turns a point forecast into a confidence band.

use thiserror::Error;

pub mod intervals;
pub mod statistics;

pub use intervals::{ConfidenceLevel, IntervalBuilder};
pub use statistics::{
    linear_regression, mean, moving_average, percentile, round_to, sample_std_dev, volatility,
    DEFAULT_VOLATILITY,
};

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;
