//! Monthly base-wage growth forecaster
//!
//! Wages follow prices with a lag: the path starts from the smoothed recent
//! wage growth and converges over the horizon toward forecast inflation plus
//! a real-wage margin.

use super::inflation::InflationForecast;
use super::{ForecastPath, Indicator, Trend};
use crate::anchors::Anchors;
use crate::calendar::sorted_values;
use crate::error::Result;
use serde::Serialize;
use series_math::{
    linear_regression, moving_average, round_to, volatility, ConfidenceLevel, IntervalBuilder,
};
use tracing::debug;

/// Wage growth (%) assumed without history
pub const DEFAULT_WAGE_GROWTH: f64 = 2.0;
/// Long-run real wage gain over inflation (points)
const REAL_WAGE_MARGIN: f64 = 0.5;
/// Weight of the historical slope
const SLOPE_DAMPING: f64 = 0.05;
const SMOOTHING_WINDOW: usize = 3;
const HISTORY_WINDOW: usize = 5;
const TREND_BAND: f64 = 0.2;

/// Output of the wage-growth forecaster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WageForecast {
    #[serde(rename = "actuel")]
    pub current: f64,
    #[serde(rename = "prevision_12m")]
    pub forecast_12m: f64,
    #[serde(rename = "tendance")]
    pub trend: Trend,
    #[serde(rename = "mensuel")]
    pub monthly: ForecastPath,
    pub insight: String,
}

/// Base-wage growth forecaster
#[derive(Debug, Clone, Default)]
pub struct WageForecaster;

impl WageForecaster {
    /// Create a new wage forecaster
    pub fn new() -> Self {
        Self
    }

    /// Forecast wage growth over the months of the inflation forecast
    pub fn forecast(&self, anchors: &Anchors, inflation: &InflationForecast) -> Result<WageForecast> {
        let history = sorted_values(&anchors.wage_history);
        let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];

        let current = moving_average(recent, SMOOTHING_WINDOW)
            .last()
            .copied()
            .unwrap_or(DEFAULT_WAGE_GROWTH);
        let slope = if recent.len() < 2 {
            0.0
        } else {
            let x: Vec<f64> = (0..recent.len()).map(|i| i as f64).collect();
            linear_regression(&x, recent).0
        };

        let (low, high) = Indicator::WageGrowth.domain();
        let horizon = inflation.monthly.horizon() as f64;
        let points: Vec<f64> = inflation
            .monthly
            .predictions
            .iter()
            .enumerate()
            .map(|(i, &prices)| {
                let progress = (i + 1) as f64 / horizon;
                let target = prices + REAL_WAGE_MARGIN;
                let value = current + (target - current) * progress + slope * SLOPE_DAMPING * progress;
                round_to(value.clamp(low, high), 2)
            })
            .collect();

        let builder = IntervalBuilder::new(volatility(recent), 12)?
            .with_level(ConfidenceLevel::P80)
            .with_floor(Indicator::WageGrowth.floor());
        let (lower, upper) = builder.build(&points);

        let monthly = ForecastPath::from_interval(
            inflation.monthly.periods.clone(),
            points,
            lower,
            upper,
            builder.level(),
            "Rattrapage progressif de l'inflation prévue + marge réelle",
        )?;

        let forecast_12m = monthly.last_point().unwrap_or(current);
        let current = round_to(current, 2);
        debug!(current, forecast_12m, "wage forecast ready");

        Ok(WageForecast {
            current,
            forecast_12m,
            trend: Trend::classify(current, forecast_12m, TREND_BAND),
            insight: format!(
                "Salaires de base : {}% sur 12 mois [IC 80% : {}% - {}%].",
                forecast_12m,
                monthly.last_lower().unwrap_or(forecast_12m),
                monthly.last_upper().unwrap_or(forecast_12m),
            ),
            monthly,
        })
    }
}
