//! Monte Carlo simulation of mean-reverting indicator paths
//!
//! Each trajectory follows a discrete Ornstein-Uhlenbeck process with an
//! additive seasonal bias:
//!
//! - drift: `speed × (target − previous)`
//! - shock: `N(0, volatility / √12)`
//! - seasonal bias for the calendar month of the step
//!
//! Values are clamped to the indicator domain and rounded to 2 decimals.
//! Published bands are cross-sectional percentiles across trajectories at
//! each step, not statistics of a single path.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use series_math::{mean, percentile, round_to, sample_std_dev};
use tracing::debug;

/// Seasonal bias of monthly inflation, indexed by calendar month (January first).
///
/// January price resets, Easter in April, summer tourism, September
/// back-to-school and December promotions.
pub const INFLATION_SEASONALITY: [f64; 12] = [
    0.10, 0.0, 0.0, 0.05, 0.0, 0.0, 0.08, 0.08, 0.12, 0.0, 0.0, -0.05,
];

/// Default seed for a run on `date`: the date as a `YYYYMMDD` integer.
///
/// Runs on the same day reproduce each other; runs on different days diverge.
pub fn seed_for_date(date: NaiveDate) -> u64 {
    let stamp = date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64;
    stamp.unsigned_abs()
}

/// Parameters of one simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    /// Starting value
    pub current: f64,
    /// Convergence target at each step; its length is the horizon
    pub targets: Vec<f64>,
    /// Annualized volatility
    pub volatility: f64,
    /// Number of independent trajectories
    pub n_simulations: usize,
    /// Fraction of the gap to the target closed at each step
    pub mean_reversion_speed: f64,
    /// Seasonal bias per calendar month
    pub seasonality: Option<[f64; 12]>,
    /// Calendar month (1-12) of the first simulated step
    pub start_month: u32,
    /// Calendar months covered by one step (1 monthly, 3 quarterly)
    pub months_per_step: u32,
    /// Range simulated values are clamped to
    pub domain: (f64, f64),
}

impl SimulationParams {
    /// Create parameters for a path from `current` toward per-step `targets`
    pub fn new(current: f64, targets: Vec<f64>, volatility: f64) -> Result<Self> {
        if targets.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Simulation horizon must be at least one step".to_string(),
            ));
        }
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Volatility must be a non-negative number, got {}",
                volatility
            )));
        }
        if !current.is_finite() || targets.iter().any(|t| !t.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Starting value and targets must be finite".to_string(),
            ));
        }

        Ok(Self {
            current,
            targets,
            volatility,
            n_simulations: 1000,
            mean_reversion_speed: 0.12,
            seasonality: None,
            start_month: 1,
            months_per_step: 1,
            domain: (-2.0, 15.0),
        })
    }

    /// Set the number of trajectories
    pub fn with_simulations(mut self, n_simulations: usize) -> Result<Self> {
        if n_simulations == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of simulations must be greater than zero".to_string(),
            ));
        }
        self.n_simulations = n_simulations;
        Ok(self)
    }

    /// Set the mean-reversion speed
    pub fn with_mean_reversion(mut self, speed: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&speed) {
            return Err(ForecastError::InvalidParameter(format!(
                "Mean reversion speed must be between 0 and 1, got {}",
                speed
            )));
        }
        self.mean_reversion_speed = speed;
        Ok(self)
    }

    /// Add a seasonal bias, the first step falling in `start_month`
    pub fn with_seasonality(mut self, table: [f64; 12], start_month: u32) -> Result<Self> {
        if !(1..=12).contains(&start_month) {
            return Err(ForecastError::InvalidParameter(format!(
                "Start month must be between 1 and 12, got {}",
                start_month
            )));
        }
        self.seasonality = Some(table);
        self.start_month = start_month;
        Ok(self)
    }

    /// Set the calendar length of one step
    pub fn with_step_months(mut self, months: u32) -> Self {
        self.months_per_step = months.max(1);
        self
    }

    /// Set the clamping range
    pub fn with_domain(mut self, low: f64, high: f64) -> Result<Self> {
        if !(low < high) {
            return Err(ForecastError::InvalidParameter(format!(
                "Invalid domain [{}, {}]",
                low, high
            )));
        }
        self.domain = (low, high);
        Ok(self)
    }

    /// Number of simulated steps
    pub fn horizon(&self) -> usize {
        self.targets.len()
    }

    fn seasonal_bias(&self, step: usize) -> f64 {
        match &self.seasonality {
            Some(table) => {
                let offset = (self.start_month - 1) as usize + step * self.months_per_step as usize;
                table[offset % 12]
            }
            None => 0.0,
        }
    }
}

/// Cross-sectional statistics of a simulated path set
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub p10: Vec<f64>,
    pub p25: Vec<f64>,
    pub p50: Vec<f64>,
    pub p75: Vec<f64>,
    pub p90: Vec<f64>,
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
    /// Final value of every trajectory
    pub terminal: Vec<f64>,
}

impl SimulationSummary {
    /// Share (%) of trajectories ending strictly below `threshold`
    pub fn probability_below(&self, threshold: f64) -> f64 {
        self.terminal_share(|v| v < threshold)
    }

    /// Share (%) of trajectories ending strictly above `threshold`
    pub fn probability_above(&self, threshold: f64) -> f64 {
        self.terminal_share(|v| v > threshold)
    }

    fn terminal_share(&self, predicate: impl Fn(f64) -> bool) -> f64 {
        if self.terminal.is_empty() {
            return 0.0;
        }
        let hits = self.terminal.iter().filter(|&&v| predicate(v)).count();
        round_to(hits as f64 / self.terminal.len() as f64 * 100.0, 1)
    }
}

/// Simulate `params.n_simulations` trajectories and summarize them
pub fn run<R: Rng + ?Sized>(params: &SimulationParams, rng: &mut R) -> Result<SimulationSummary> {
    let horizon = params.horizon();
    let shock = Normal::new(0.0, params.volatility / 12f64.sqrt())
        .map_err(|e| ForecastError::InvalidParameter(format!("Invalid shock distribution: {}", e)))?;
    let (low, high) = params.domain;

    // values[step][trajectory]
    let mut values = vec![Vec::with_capacity(params.n_simulations); horizon];

    for _ in 0..params.n_simulations {
        let mut previous = params.current;
        for (step, target) in params.targets.iter().enumerate() {
            let drift = params.mean_reversion_speed * (target - previous);
            let next = previous + drift + shock.sample(rng) + params.seasonal_bias(step);
            previous = round_to(next.clamp(low, high), 2);
            values[step].push(previous);
        }
    }

    let summary = SimulationSummary {
        p10: values.iter().map(|v| round_to(percentile(v, 10.0), 1)).collect(),
        p25: values.iter().map(|v| round_to(percentile(v, 25.0), 1)).collect(),
        p50: values.iter().map(|v| round_to(percentile(v, 50.0), 1)).collect(),
        p75: values.iter().map(|v| round_to(percentile(v, 75.0), 1)).collect(),
        p90: values.iter().map(|v| round_to(percentile(v, 90.0), 1)).collect(),
        mean: values.iter().map(|v| round_to(mean(v), 1)).collect(),
        std: values.iter().map(|v| round_to(sample_std_dev(v), 2)).collect(),
        terminal: values.pop().unwrap_or_default(),
    };

    debug!(
        horizon,
        n_simulations = params.n_simulations,
        median_end = summary.p50.last().copied().unwrap_or_default(),
        "simulation complete"
    );

    Ok(summary)
}
