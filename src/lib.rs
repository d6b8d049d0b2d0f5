//! # NAO Forecast
//!
//! Umbrella crate for the wage-negotiation dashboard forecasts.
//!
//! - [`series_math`]: series statistics and confidence bands
//! - [`labor_forecast`]: inflation, unemployment, wage and SMIC forecasting
//!
//! ## Example
//!
//! ```
//! use nao_forecast_workspace::labor_forecast::{ForecastConfig, ForecastPipeline, RunContext};
//! use serde_json::json;
//!
//! let pipeline = ForecastPipeline::new(ForecastConfig::default()).unwrap();
//! let bundle = pipeline.run(&json!({}), &RunContext::now()).unwrap();
//! assert_eq!(bundle.inflation.monthly.horizon(), 12);
//! ```

pub use labor_forecast;
pub use series_math;
