//! Forecasting models for labor-market indicators

use crate::calendar::Period;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use series_math::{round_to, ConfidenceLevel};
use statrs::distribution::{ContinuousCDF, Normal};

pub mod inflation;
pub mod smic;
pub mod unemployment;
pub mod wages;

/// Diesel price (EUR/l) below which the energy outlook is falling
const DIESEL_FALLING_BELOW: f64 = 1.6;
/// Diesel price (EUR/l) above which the energy outlook is rising
const DIESEL_RISING_ABOVE: f64 = 1.8;

/// Forecast indicators and their realistic value ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Year-on-year consumer price inflation (%)
    Inflation,
    /// ILO unemployment rate (%)
    Unemployment,
    /// Year-on-year base wage growth (%)
    WageGrowth,
}

impl Indicator {
    /// Lowest value a lower confidence bound may take.
    ///
    /// Inflation: -2% (deepest French deflation on record is far above).
    /// Unemployment: 0%, a rate cannot be negative.
    /// Wage growth: -5%, nominal base wages almost never fall.
    pub fn floor(self) -> f64 {
        match self {
            Indicator::Inflation => -2.0,
            Indicator::Unemployment => 0.0,
            Indicator::WageGrowth => -5.0,
        }
    }

    /// Range simulated values are clamped to
    pub fn domain(self) -> (f64, f64) {
        match self {
            Indicator::Inflation => (-2.0, 15.0),
            Indicator::Unemployment => (0.0, 25.0),
            Indicator::WageGrowth => (-5.0, 20.0),
        }
    }
}

/// Qualitative energy-price outlook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnergyOutlook {
    /// Rising prices
    Hausse,
    /// Stable prices
    #[default]
    Stable,
    /// Falling prices
    Baisse,
}

impl EnergyOutlook {
    /// Classify the energy outlook from the current diesel price
    pub fn from_diesel_price(price: f64) -> Self {
        if price < DIESEL_FALLING_BELOW {
            EnergyOutlook::Baisse
        } else if price > DIESEL_RISING_ABOVE {
            EnergyOutlook::Hausse
        } else {
            EnergyOutlook::Stable
        }
    }
}

/// Direction of an indicator over the horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Hausse,
    Stable,
    Baisse,
}

impl Trend {
    /// Classify the move from `current` to `forecast`, ignoring moves within `band`
    pub fn classify(current: f64, forecast: f64, band: f64) -> Self {
        if forecast > current + band {
            Trend::Hausse
        } else if forecast < current - band {
            Trend::Baisse
        } else {
            Trend::Stable
        }
    }

    /// French label used in reading notes
    pub fn label(self) -> &'static str {
        match self {
            Trend::Hausse => "hausse",
            Trend::Stable => "stable",
            Trend::Baisse => "baisse",
        }
    }
}

/// Point forecast with its uncertainty bands over a fixed horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPath {
    /// Median / central forecast
    pub predictions: Vec<f64>,
    /// Lower bound of the published band
    pub lower_bound: Vec<f64>,
    /// Upper bound of the published band
    pub upper_bound: Vec<f64>,
    /// First quartile
    pub p25: Vec<f64>,
    /// Third quartile
    pub p75: Vec<f64>,
    /// Forecast periods
    pub periods: Vec<Period>,
    /// Short description of how the path was produced
    pub methodology: String,
}

impl ForecastPath {
    /// Create a new forecast path, checking its invariants
    pub fn new(
        periods: Vec<Period>,
        predictions: Vec<f64>,
        lower_bound: Vec<f64>,
        upper_bound: Vec<f64>,
        p25: Vec<f64>,
        p75: Vec<f64>,
        methodology: impl Into<String>,
    ) -> Result<Self> {
        let horizon = periods.len();
        for (name, len) in [
            ("predictions", predictions.len()),
            ("lower_bound", lower_bound.len()),
            ("upper_bound", upper_bound.len()),
            ("p25", p25.len()),
            ("p75", p75.len()),
        ] {
            if len != horizon {
                return Err(ForecastError::Validation(format!(
                    "{} length ({}) doesn't match horizon ({})",
                    name, len, horizon
                )));
            }
        }

        if periods.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::Validation(
                "Forecast periods must be strictly increasing".to_string(),
            ));
        }

        for i in 0..horizon {
            let ordered = lower_bound[i] <= p25[i]
                && p25[i] <= predictions[i]
                && predictions[i] <= p75[i]
                && p75[i] <= upper_bound[i];
            if !ordered {
                return Err(ForecastError::Validation(format!(
                    "Bands out of order at {}: {} <= {} <= {} <= {} <= {}",
                    periods[i], lower_bound[i], p25[i], predictions[i], p75[i], upper_bound[i]
                )));
            }
        }

        Ok(Self {
            predictions,
            lower_bound,
            upper_bound,
            p25,
            p75,
            periods,
            methodology: methodology.into(),
        })
    }

    /// Build a path from a deterministic interval, deriving quartiles from a
    /// normal approximation of the band.
    pub fn from_interval(
        periods: Vec<Period>,
        predictions: Vec<f64>,
        lower_bound: Vec<f64>,
        upper_bound: Vec<f64>,
        level: ConfidenceLevel,
        methodology: impl Into<String>,
    ) -> Result<Self> {
        let quartile_z = standard_normal().inverse_cdf(0.75);

        let (p25, p75): (Vec<f64>, Vec<f64>) = predictions
            .iter()
            .zip(lower_bound.iter().zip(&upper_bound))
            .map(|(&point, (&lower, &upper))| {
                let sigma = implied_sigma(point, upper, level);
                let q1 = round_to(point - quartile_z * sigma, 2).clamp(lower, point);
                let q3 = round_to(point + quartile_z * sigma, 2).clamp(point, upper);
                (q1, q3)
            })
            .unzip();

        Self::new(
            periods,
            predictions,
            lower_bound,
            upper_bound,
            p25,
            p75,
            methodology,
        )
    }

    /// Number of forecast periods
    pub fn horizon(&self) -> usize {
        self.periods.len()
    }

    /// Point forecast at the end of the horizon
    pub fn last_point(&self) -> Option<f64> {
        self.predictions.last().copied()
    }

    /// Lower bound at the end of the horizon
    pub fn last_lower(&self) -> Option<f64> {
        self.lower_bound.last().copied()
    }

    /// Upper bound at the end of the horizon
    pub fn last_upper(&self) -> Option<f64> {
        self.upper_bound.last().copied()
    }

    /// Point forecast at zero-based step `step`
    pub fn point_at(&self, step: usize) -> Option<f64> {
        self.predictions.get(step).copied()
    }
}

fn standard_normal() -> Normal {
    // Parameters are constant and valid
    Normal::new(0.0, 1.0).unwrap_or_else(|_| unreachable!())
}

/// Standard deviation implied by a symmetric band around `point`
pub(crate) fn implied_sigma(point: f64, upper: f64, level: ConfidenceLevel) -> f64 {
    ((upper - point) / level.z_score()).max(0.0)
}

/// Probability (in %) that a normal variable centred on `point` ends below `threshold`
pub(crate) fn normal_probability_below(point: f64, sigma: f64, threshold: f64) -> f64 {
    let probability = match Normal::new(point, sigma) {
        Ok(distribution) => distribution.cdf(threshold),
        // Degenerate band: the outcome is the point itself
        Err(_) => {
            if point < threshold {
                1.0
            } else {
                0.0
            }
        }
    };
    round_to(probability * 100.0, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn periods(n: usize) -> Vec<Period> {
        Period::Month {
            year: 2026,
            month: 10,
        }
        .following(n)
    }

    #[test]
    fn test_forecast_path_validation() {
        let ok = ForecastPath::new(
            periods(2),
            vec![1.0, 1.1],
            vec![0.5, 0.5],
            vec![1.5, 1.7],
            vec![0.8, 0.9],
            vec![1.2, 1.3],
            "test",
        );
        assert!(ok.is_ok());

        let wrong_len = ForecastPath::new(
            periods(2),
            vec![1.0],
            vec![0.5, 0.5],
            vec![1.5, 1.7],
            vec![0.8, 0.9],
            vec![1.2, 1.3],
            "test",
        );
        assert!(matches!(wrong_len, Err(ForecastError::Validation(_))));

        let disordered = ForecastPath::new(
            periods(1),
            vec![1.0],
            vec![1.2],
            vec![1.5],
            vec![1.0],
            vec![1.0],
            "test",
        );
        assert!(disordered.is_err());

        let mut repeated = periods(2);
        repeated[1] = repeated[0];
        let repeated = ForecastPath::new(
            repeated,
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            "test",
        );
        assert!(repeated.is_err());
    }

    #[test]
    fn test_from_interval_quartiles_inside_band() {
        let path = ForecastPath::from_interval(
            periods(3),
            vec![1.5, 1.5, 1.5],
            vec![1.0, 0.8, 0.6],
            vec![2.0, 2.2, 2.4],
            ConfidenceLevel::P90,
            "interp",
        )
        .unwrap();

        for i in 0..3 {
            assert!(path.lower_bound[i] <= path.p25[i]);
            assert!(path.p75[i] <= path.upper_bound[i]);
        }
        assert!(path.p75[2] - path.p25[2] > path.p75[0] - path.p25[0]);
    }

    #[test]
    fn test_normal_probability() {
        assert_eq!(normal_probability_below(2.0, 0.5, 2.0), 50.0);
        assert_eq!(normal_probability_below(1.0, 0.0, 2.0), 100.0);
        assert!(normal_probability_below(1.0, 0.5, 2.0) > 95.0);
    }

    #[test]
    fn test_trend_classification() {
        assert_eq!(Trend::classify(1.5, 1.8, 0.2), Trend::Hausse);
        assert_eq!(Trend::classify(1.5, 1.6, 0.2), Trend::Stable);
        assert_eq!(Trend::classify(1.5, 1.2, 0.2), Trend::Baisse);
    }

    #[test]
    fn test_energy_outlook_from_diesel() {
        assert_eq!(EnergyOutlook::from_diesel_price(1.5), EnergyOutlook::Baisse);
        assert_eq!(EnergyOutlook::from_diesel_price(1.7), EnergyOutlook::Stable);
        assert_eq!(EnergyOutlook::from_diesel_price(1.9), EnergyOutlook::Hausse);
    }
}
