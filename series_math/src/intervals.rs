//! Confidence bands around deterministic point forecasts
//!
//! Uncertainty grows with the square root of elapsed time, up to a cap, so
//! long horizons do not produce unbounded bands. Lower bounds are floored at
//! an indicator-specific minimum supplied by the caller.

use crate::statistics::round_to;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Supported two-sided confidence levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    /// 80% band
    P80,
    /// 90% band
    P90,
    /// 95% band
    P95,
}

impl ConfidenceLevel {
    /// Standard normal quantile for the two-sided level
    pub fn z_score(self) -> f64 {
        match self {
            ConfidenceLevel::P80 => 1.282,
            ConfidenceLevel::P90 => 1.645,
            ConfidenceLevel::P95 => 1.96,
        }
    }

    /// Coverage as a fraction (0.80, 0.90, 0.95)
    pub fn coverage(self) -> f64 {
        match self {
            ConfidenceLevel::P80 => 0.80,
            ConfidenceLevel::P90 => 0.90,
            ConfidenceLevel::P95 => 0.95,
        }
    }
}

/// Builds lower/upper sequences around a point-forecast path
#[derive(Debug, Clone)]
pub struct IntervalBuilder {
    volatility: f64,
    level: ConfidenceLevel,
    periods_per_year: u32,
    max_elapsed_years: f64,
    floor: f64,
    decimals: u32,
}

impl IntervalBuilder {
    /// Create a builder for an annualized `volatility` on a series sampled
    /// `periods_per_year` times a year (12 for monthly, 4 for quarterly).
    ///
    /// Defaults: 90% level, no floor, uncertainty capped after 1.5 years,
    /// bounds rounded to 2 decimals.
    pub fn new(volatility: f64, periods_per_year: u32) -> Result<Self> {
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(MathError::InvalidInput(format!(
                "Volatility must be a non-negative number, got {}",
                volatility
            )));
        }
        if periods_per_year == 0 {
            return Err(MathError::InvalidInput(
                "Periods per year must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            volatility,
            level: ConfidenceLevel::P90,
            periods_per_year,
            max_elapsed_years: 1.5,
            floor: f64::NEG_INFINITY,
            decimals: 2,
        })
    }

    /// Set the confidence level
    pub fn with_level(mut self, level: ConfidenceLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the minimum realistic value of the indicator
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    /// Cap the elapsed time (in years) used to grow the uncertainty
    pub fn with_max_elapsed_years(mut self, years: f64) -> Result<Self> {
        if !(years > 0.0) {
            return Err(MathError::InvalidInput(
                "Uncertainty cap must be positive".to_string(),
            ));
        }
        self.max_elapsed_years = years;
        Ok(self)
    }

    /// Set the rounding precision of the produced bounds
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// Get the confidence level
    pub fn level(&self) -> ConfidenceLevel {
        self.level
    }

    /// Half-width of the band at zero-based step `step`
    pub fn half_width(&self, step: usize) -> f64 {
        let elapsed_years = (step + 1) as f64 / self.periods_per_year as f64;
        self.volatility * self.level.z_score() * elapsed_years.min(self.max_elapsed_years).sqrt()
    }

    /// Build `(lower, upper)` bounds for `points`.
    ///
    /// Every lower bound satisfies `floor <= lower <= point` unless the point
    /// itself is below the floor, in which case the lower bound equals the point.
    pub fn build(&self, points: &[f64]) -> (Vec<f64>, Vec<f64>) {
        points
            .iter()
            .enumerate()
            .map(|(step, &point)| {
                let width = self.half_width(step);
                let lower = (point - width).max(self.floor).min(point);
                let upper = point + width;
                (round_to(lower, self.decimals), round_to(upper, self.decimals))
            })
            .unzip()
    }
}
