//! # Labor Forecast
//!
//! Short-term forecasts of French labor-market indicators, computed from the
//! dashboard dataset and written back into it.
//!
//! ## Features
//!
//! - Monthly inflation forecast anchored on institutional projections
//! - Quarterly unemployment forecast driven by leading indicators
//! - Base-wage growth path following forecast inflation
//! - SMIC revaluation rule engine (mandatory January and automatic triggers)
//! - Optimistic / central / pessimistic scenarios and what-if shocks
//! - Reading notes for the dashboard
//!
//! ## Anchoring modes
//!
//! All forecasters share one contract and switch behavior with
//! [`AnchoringMode`]:
//!
//! - `MonteCarlo` (default): mean-reverting simulation, percentile bands
//! - `InstitutionalInterpolation`: deterministic glide toward the projections
//! - `Freeform`: historical trends and convergence toward the ECB target
//!
//! ## Quick Start
//!
//! ```no_run
//! use labor_forecast::{ForecastConfig, ForecastPipeline, RunContext};
//! use std::path::Path;
//!
//! let pipeline = ForecastPipeline::new(ForecastConfig::default())?;
//! let path = Path::new("public/data.json");
//! let bundle = pipeline.run_file(path, path, &RunContext::now())?;
//!
//! println!("Inflation at 12 months: {}%", bundle.inflation.forecast_12m);
//! # Ok::<(), labor_forecast::ForecastError>(())
//! ```

pub mod anchors;
pub mod calendar;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod notes;
pub mod pipeline;
pub mod scenarios;
pub mod simulation;

// Re-export commonly used types
pub use crate::anchors::Anchors;
pub use crate::calendar::{Observation, Period};
pub use crate::config::{AnchoringMode, ForecastConfig, IndicatorDynamics, SmicRules};
pub use crate::dataset::Dataset;
pub use crate::error::{ForecastError, Result};
pub use crate::models::{EnergyOutlook, ForecastPath, Indicator, Trend};
pub use crate::pipeline::{ForecastBundle, ForecastPipeline, RunContext, Stage};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
