//! Model configuration
//!
//! Every calibrated constant of the forecasting models lives here so that it
//! can be reviewed and overridden in one place. Values are empirical
//! placeholders, not derived quantities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How forecasts are anchored on the institutional projections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AnchoringMode {
    /// Historical trend + convergence toward the ECB 2% target
    Freeform,
    /// Deterministic interpolation toward institutional projections
    InstitutionalInterpolation,
    /// Mean-reverting Monte Carlo simulation toward adjusted projections
    #[default]
    MonteCarlo,
}

impl AnchoringMode {
    /// Version tag written into the forecast bundle
    pub fn model_version(self) -> &'static str {
        match self {
            AnchoringMode::Freeform => "CFTC v2.0",
            AnchoringMode::InstitutionalInterpolation => "CFTC v3.0",
            AnchoringMode::MonteCarlo => "CFTC v4.0 (Monte Carlo)",
        }
    }

    /// Whether the mode draws random numbers
    pub fn is_stochastic(self) -> bool {
        matches!(self, AnchoringMode::MonteCarlo)
    }
}

impl fmt::Display for AnchoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnchoringMode::Freeform => "freeform",
            AnchoringMode::InstitutionalInterpolation => "institutional-interpolation",
            AnchoringMode::MonteCarlo => "monte-carlo",
        };
        f.write_str(name)
    }
}

/// Dynamics of one simulated indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDynamics {
    /// Annualized volatility in percentage points
    pub volatility: f64,
    /// Fraction of the gap to the target closed at each step
    pub mean_reversion_speed: f64,
}

/// Statutory SMIC revaluation rules and their calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmicRules {
    /// Historical margin of the January revaluation over inflation (points)
    pub annual_margin: f64,
    /// Half-width of the random perturbation of the January revaluation
    pub perturbation: f64,
    /// Statutory floor of the January revaluation (%)
    pub min_increase: f64,
    /// Margin over average forecast inflation when no projection exists
    pub fallback_margin: f64,
    /// Inflation assumed when neither projection nor forecast is available
    pub fallback_inflation: f64,
    /// Cumulative inflation that triggers an automatic revaluation (%)
    pub auto_threshold: f64,
    /// Probability gained per point of upper-bound inflation above the threshold
    pub auto_probability_slope: f64,
    /// Maximum probability of an automatic revaluation
    pub auto_probability_ceiling: f64,
    /// Automatic revaluations below this probability are not reported
    pub auto_probability_min: f64,
    /// Automatic increase = upper-bound inflation minus this offset
    pub auto_increase_offset: f64,
    /// Net-to-gross ratio reflecting payroll deductions
    pub net_to_gross: f64,
    /// Legal monthly hours for a full-time contract
    pub monthly_hours: f64,
    /// Range below the January estimate (points)
    pub range_below: f64,
    /// Range above the January estimate (points)
    pub range_above: f64,
}

impl Default for SmicRules {
    fn default() -> Self {
        Self {
            annual_margin: 0.3,
            perturbation: 0.2,
            min_increase: 1.0,
            fallback_margin: 0.5,
            fallback_inflation: 1.5,
            auto_threshold: 2.0,
            auto_probability_slope: 0.3,
            auto_probability_ceiling: 0.4,
            auto_probability_min: 0.1,
            auto_increase_offset: 0.5,
            net_to_gross: 0.792,
            monthly_hours: 151.67,
            range_below: 0.3,
            range_above: 0.5,
        }
    }
}

/// Forecast pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Anchoring strategy
    pub mode: AnchoringMode,
    /// Number of Monte Carlo trajectories
    pub n_simulations: usize,
    /// Monthly horizon (inflation, wages)
    pub horizon_months: usize,
    /// Quarterly horizon (unemployment)
    pub horizon_quarters: usize,
    /// Inflation dynamics
    pub inflation: IndicatorDynamics,
    /// Unemployment dynamics; slower reversion than inflation (labor-market inertia)
    pub unemployment: IndicatorDynamics,
    /// SMIC revaluation rules
    pub smic: SmicRules,
    /// Top-level key the bundle is written under
    pub output_key: String,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            mode: AnchoringMode::MonteCarlo,
            n_simulations: 1000,
            horizon_months: 12,
            horizon_quarters: 4,
            inflation: IndicatorDynamics {
                volatility: 0.5,
                mean_reversion_speed: 0.12,
            },
            unemployment: IndicatorDynamics {
                volatility: 0.4,
                mean_reversion_speed: 0.10,
            },
            smic: SmicRules::default(),
            output_key: "previsions_cftc".to_string(),
        }
    }
}

impl ForecastConfig {
    /// Default configuration with another anchoring mode
    pub fn with_mode(mode: AnchoringMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}
