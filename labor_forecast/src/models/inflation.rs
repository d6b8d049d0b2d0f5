//! Monthly inflation forecaster
//!
//! The convergence target of each forecast month is the institutional
//! projection for that month's calendar year, adjusted for the business
//! climate and the energy outlook. Three anchoring modes are supported:
//!
//! - `MonteCarlo`: mean-reverting simulation with monthly seasonality
//! - `InstitutionalInterpolation`: deterministic glide toward the projections
//! - `Freeform`: convergence toward the ECB 2% target plus historical trend

use super::{
    implied_sigma, normal_probability_below, EnergyOutlook, ForecastPath, Indicator, Trend,
};
use crate::anchors::Anchors;
use crate::calendar::{sorted_values, Period};
use crate::config::{AnchoringMode, IndicatorDynamics};
use crate::error::{ForecastError, Result};
use crate::simulation::{self, SimulationParams, INFLATION_SEASONALITY};
use chrono::{Datelike, NaiveDate};
use rand::RngCore;
use serde::Serialize;
use series_math::{linear_regression, round_to, volatility, ConfidenceLevel, IntervalBuilder};
use std::f64::consts::PI;
use tracing::debug;

/// Target adjustment per point of business climate above 100
const CLIMATE_COEFFICIENT: f64 = 0.01;
/// Range the adjusted target is clamped to
const TARGET_RANGE: (f64, f64) = (0.0, 5.0);
/// Moves smaller than this are reported as stable
const TREND_BAND: f64 = 0.2;
/// ECB medium-term inflation target
const ECB_TARGET: f64 = 2.0;
/// Annualized volatility of the interpolated path
const INTERPOLATION_VOLATILITY: f64 = 0.4;
/// Monthly convergence toward the ECB target in freeform mode
const FREEFORM_CONVERGENCE: f64 = 0.08;
/// Volatility used when history is too short in freeform mode
const FREEFORM_DEFAULT_VOLATILITY: f64 = 0.8;
/// Annual history points used for the freeform trend
const FREEFORM_HISTORY_WINDOW: usize = 5;

impl EnergyOutlook {
    /// Inflation target offset (points) for this outlook
    pub fn adjustment(self) -> f64 {
        match self {
            EnergyOutlook::Hausse => 0.3,
            EnergyOutlook::Stable => 0.0,
            EnergyOutlook::Baisse => -0.2,
        }
    }

    /// Initial energy price impulse in freeform mode
    fn impulse(self) -> f64 {
        match self {
            EnergyOutlook::Hausse => 0.3,
            EnergyOutlook::Stable => 0.0,
            EnergyOutlook::Baisse => -0.3,
        }
    }
}

/// Probabilities attached to the 12-month inflation forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InflationProbabilities {
    /// Chance (%) inflation ends below 2%
    #[serde(rename = "inflation_sous_2pct")]
    pub below_2pct: f64,
    /// Chance (%) inflation ends at or below the ECB target
    #[serde(rename = "inflation_cible_bce")]
    pub at_ecb_target: f64,
    /// Chance (%) inflation ends above 3%
    #[serde(rename = "inflation_au_dessus_3pct")]
    pub above_3pct: f64,
    pub description: String,
}

/// Target and its adjustments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InflationFactors {
    #[serde(rename = "cible_bdf")]
    pub institutional_target: f64,
    #[serde(rename = "ajustement_climat")]
    pub climate_adjustment: f64,
    #[serde(rename = "ajustement_energie")]
    pub energy_adjustment: f64,
    #[serde(rename = "cible_ajustee")]
    pub adjusted_target: f64,
}

/// Output of the inflation forecaster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InflationForecast {
    #[serde(rename = "actuel")]
    pub current: f64,
    #[serde(rename = "prevision_6m")]
    pub forecast_6m: f64,
    #[serde(rename = "prevision_12m")]
    pub forecast_12m: f64,
    #[serde(rename = "tendance")]
    pub trend: Trend,
    pub confidence: f64,
    #[serde(rename = "mensuel")]
    pub monthly: ForecastPath,
    #[serde(rename = "probabilites")]
    pub probabilities: InflationProbabilities,
    #[serde(rename = "facteurs")]
    pub factors: InflationFactors,
    pub insight: String,
}

/// Monthly inflation forecaster
#[derive(Debug, Clone)]
pub struct InflationForecaster {
    mode: AnchoringMode,
    dynamics: IndicatorDynamics,
    horizon: usize,
    n_simulations: usize,
}

impl InflationForecaster {
    /// Create a new inflation forecaster
    pub fn new(
        mode: AnchoringMode,
        dynamics: IndicatorDynamics,
        horizon: usize,
        n_simulations: usize,
    ) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Inflation horizon must be at least one month".to_string(),
            ));
        }

        Ok(Self {
            mode,
            dynamics,
            horizon,
            n_simulations,
        })
    }

    /// Name of the model
    pub fn name(&self) -> &str {
        match self.mode {
            AnchoringMode::Freeform => "Inflation (freeform)",
            AnchoringMode::InstitutionalInterpolation => "Inflation (interpolation)",
            AnchoringMode::MonteCarlo => "Inflation (Monte Carlo)",
        }
    }

    /// Forecast monthly inflation for the months following `today`
    pub fn forecast(
        &self,
        anchors: &Anchors,
        today: NaiveDate,
        rng: &mut dyn RngCore,
    ) -> Result<InflationForecast> {
        let periods = Period::month_of(today).following(self.horizon);

        let climate_adjustment = (anchors.business_climate - 100.0) * CLIMATE_COEFFICIENT;
        let energy_adjustment = anchors.energy_outlook.adjustment();
        let adjust = |target: f64| {
            (target + climate_adjustment + energy_adjustment).clamp(TARGET_RANGE.0, TARGET_RANGE.1)
        };

        let first_year = periods.first().map(Period::year).unwrap_or(today.year());
        let institutional_target = anchors.targets.inflation.for_year(first_year);
        let factors = InflationFactors {
            institutional_target,
            climate_adjustment: round_to(climate_adjustment, 2),
            energy_adjustment,
            adjusted_target: round_to(adjust(institutional_target), 2),
        };

        let (monthly, probabilities) = match self.mode {
            AnchoringMode::MonteCarlo => {
                let targets = periods
                    .iter()
                    .map(|p| adjust(anchors.targets.inflation.for_year(p.year())))
                    .collect();
                self.simulate(anchors.inflation, targets, periods, rng)?
            }
            AnchoringMode::InstitutionalInterpolation => {
                let points = interpolate(anchors, today, &periods);
                let builder = IntervalBuilder::new(INTERPOLATION_VOLATILITY, 12)?
                    .with_level(ConfidenceLevel::P90)
                    .with_floor(Indicator::Inflation.floor())
                    .with_decimals(1);
                deterministic_path(
                    periods,
                    points,
                    &builder,
                    "Interpolation vers prévisions Banque de France",
                )?
            }
            AnchoringMode::Freeform => {
                let (points, vol) = freeform(anchors, &periods);
                let builder = IntervalBuilder::new(vol, 12)?
                    .with_level(ConfidenceLevel::P95)
                    .with_floor(Indicator::Inflation.floor());
                deterministic_path(
                    periods,
                    points,
                    &builder,
                    "Convergence BCE + tendance historique + choc énergie",
                )?
            }
        };

        let forecast_12m = monthly.last_point().unwrap_or(anchors.inflation);
        let forecast_6m = monthly
            .point_at(5.min(self.horizon - 1))
            .unwrap_or(forecast_12m);
        let lower = monthly.last_lower().unwrap_or(forecast_12m);
        let upper = monthly.last_upper().unwrap_or(forecast_12m);

        let insight = format!(
            "Inflation médiane à 12 mois : {}% [IC {}% : {}% - {}%]. {}% de probabilité de rester sous 2%.",
            forecast_12m,
            self.band_coverage(),
            lower,
            upper,
            probabilities.below_2pct
        );

        debug!(
            forecast_6m,
            forecast_12m,
            lower,
            upper,
            mode = %self.mode,
            "inflation forecast ready"
        );

        Ok(InflationForecast {
            current: anchors.inflation,
            forecast_6m,
            forecast_12m,
            trend: Trend::classify(anchors.inflation, forecast_12m, TREND_BAND),
            confidence: 0.85,
            monthly,
            probabilities,
            factors,
            insight,
        })
    }

    fn band_coverage(&self) -> u32 {
        match self.mode {
            AnchoringMode::MonteCarlo => 80,
            AnchoringMode::InstitutionalInterpolation => 90,
            AnchoringMode::Freeform => 95,
        }
    }

    fn simulate(
        &self,
        current: f64,
        targets: Vec<f64>,
        periods: Vec<Period>,
        rng: &mut dyn RngCore,
    ) -> Result<(ForecastPath, InflationProbabilities)> {
        let start_month = periods.first().map(Period::start_month).unwrap_or(1);
        let (low, high) = Indicator::Inflation.domain();
        let params = SimulationParams::new(current, targets, self.dynamics.volatility)?
            .with_simulations(self.n_simulations)?
            .with_mean_reversion(self.dynamics.mean_reversion_speed)?
            .with_seasonality(INFLATION_SEASONALITY, start_month)?
            .with_domain(low, high)?;
        let summary = simulation::run(&params, rng)?;

        let below_2pct = summary.probability_below(ECB_TARGET);
        let probabilities = InflationProbabilities {
            below_2pct,
            at_ecb_target: below_2pct,
            above_3pct: summary.probability_above(3.0),
            description: describe(below_2pct),
        };

        let path = ForecastPath::new(
            periods,
            summary.p50,
            summary.p10,
            summary.p90,
            summary.p25,
            summary.p75,
            format!(
                "Monte Carlo ({} simulations) + saisonnalité + mean reversion",
                self.n_simulations
            ),
        )?;

        Ok((path, probabilities))
    }
}

fn describe(below_2pct: f64) -> String {
    format!(
        "{}% de chances que l'inflation reste sous 2% à 12 mois",
        below_2pct
    )
}

/// Bands and probabilities of a deterministic path, from a normal
/// approximation of its final interval
fn deterministic_path(
    periods: Vec<Period>,
    points: Vec<f64>,
    builder: &IntervalBuilder,
    methodology: &str,
) -> Result<(ForecastPath, InflationProbabilities)> {
    let (lower, upper) = builder.build(&points);
    let level = builder.level();
    let path = ForecastPath::from_interval(periods, points, lower, upper, level, methodology)?;

    let (point, upper) = match (path.last_point(), path.last_upper()) {
        (Some(point), Some(upper)) => (point, upper),
        _ => (ECB_TARGET, ECB_TARGET),
    };
    let sigma = implied_sigma(point, upper, level);
    let below_2pct = normal_probability_below(point, sigma, ECB_TARGET);
    let probabilities = InflationProbabilities {
        below_2pct,
        at_ecb_target: below_2pct,
        above_3pct: round_to(100.0 - normal_probability_below(point, sigma, 3.0), 1),
        description: describe(below_2pct),
    };

    Ok((path, probabilities))
}

/// Glide from the current rate toward the projection of each month's year
fn interpolate(anchors: &Anchors, today: NaiveDate, periods: &[Period]) -> Vec<f64> {
    // Months left in the current year, the current month included
    let remaining = (13 - today.month()) as f64;
    let mut current = anchors.inflation;

    periods
        .iter()
        .enumerate()
        .map(|(i, period)| {
            let target = anchors.targets.inflation.for_year(period.year());
            let progress = if period.year() == today.year() {
                i as f64 / remaining
            } else {
                (i as f64 - remaining).max(0.0) / 12.0
            };
            let next = current + (target - current) * (0.3 + 0.7 * progress.min(1.0));
            current = next;
            round_to(next, 1)
        })
        .collect()
}

/// Convergence toward the ECB target with historical trend, a decaying
/// energy impulse and sinusoidal seasonality. Returns the path and the
/// volatility of its band.
fn freeform(anchors: &Anchors, periods: &[Period]) -> (Vec<f64>, f64) {
    let history = sorted_values(&anchors.inflation_history);
    let recent = &history[history.len().saturating_sub(FREEFORM_HISTORY_WINDOW)..];

    let slope = if recent.len() < 2 {
        0.0
    } else {
        let x: Vec<f64> = (0..recent.len()).map(|i| i as f64).collect();
        linear_regression(&x, recent).0
    };
    let impulse = anchors.energy_outlook.impulse();

    let mut current = anchors.inflation;
    let points = periods
        .iter()
        .enumerate()
        .map(|(i, period)| {
            let step = (i + 1) as f64;
            current += FREEFORM_CONVERGENCE * (ECB_TARGET - current);
            current += impulse * (-step / 6.0).exp() * 0.1;
            current += slope * 0.05;

            // Summer peak
            let seasonal = 0.1 * ((period.start_month() as f64 - 3.0) * PI / 6.0).sin();
            round_to((current + seasonal).clamp(-1.0, 10.0), 2)
        })
        .collect();

    let vol = if recent.len() > 2 {
        volatility(recent)
    } else {
        FREEFORM_DEFAULT_VOLATILITY
    };

    (points, vol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn anchors() -> Anchors {
        let dataset = Dataset::from_value(&json!({
            "indicateurs_cles": { "inflation_annuelle": 1.5, "climat_affaires": 98 },
            "previsions": { "banque_de_france": { "inflation_ipch": { "2026": 1.4, "2027": 1.4 } } }
        }))
        .unwrap();
        Anchors::extract(&dataset, today(), 0.792)
    }

    fn forecaster(mode: AnchoringMode) -> InflationForecaster {
        let dynamics = IndicatorDynamics {
            volatility: 0.5,
            mean_reversion_speed: 0.12,
        };
        InflationForecaster::new(mode, dynamics, 12, 1000).unwrap()
    }

    #[rstest]
    #[case(AnchoringMode::MonteCarlo)]
    #[case(AnchoringMode::InstitutionalInterpolation)]
    #[case(AnchoringMode::Freeform)]
    fn test_twelve_month_path_in_sanity_range(#[case] mode: AnchoringMode) {
        let mut rng = StdRng::seed_from_u64(20261018);
        let forecast = forecaster(mode)
            .forecast(&anchors(), today(), &mut rng)
            .unwrap();

        assert_eq!(forecast.monthly.horizon(), 12);
        assert_eq!(forecast.monthly.periods[0].to_string(), "2026-11");
        assert_eq!(forecast.monthly.periods[11].to_string(), "2027-10");
        assert!((0.5..=2.5).contains(&forecast.forecast_12m));
        assert!((0.0..=100.0).contains(&forecast.probabilities.below_2pct));
        assert!((0.0..=100.0).contains(&forecast.probabilities.above_3pct));
    }

    #[test]
    fn test_factors_reflect_adjustments() {
        let mut rng = StdRng::seed_from_u64(1);
        let forecast = forecaster(AnchoringMode::MonteCarlo)
            .forecast(&anchors(), today(), &mut rng)
            .unwrap();

        assert_eq!(forecast.factors.institutional_target, 1.4);
        assert_eq!(forecast.factors.climate_adjustment, -0.02);
        assert_eq!(forecast.factors.energy_adjustment, 0.0);
        assert_eq!(forecast.factors.adjusted_target, 1.38);
    }

    #[test]
    fn test_freeform_without_history_has_flat_trend() {
        let anchors = anchors();
        assert!(anchors.inflation_history.is_empty());

        let periods = Period::month_of(today()).following(12);
        let (points, vol) = freeform(&anchors, &periods);
        assert_eq!(points.len(), 12);
        assert_eq!(vol, FREEFORM_DEFAULT_VOLATILITY);
    }

    #[test]
    fn test_interpolation_moves_toward_target() {
        let mut anchors = anchors();
        anchors.inflation = 3.0;
        let periods = Period::month_of(today()).following(12);
        let points = interpolate(&anchors, today(), &periods);

        assert!(points[0] < 3.0);
        assert!(points[11] < points[0]);
        assert!(points[11] >= 1.4);
    }

    #[test]
    fn test_serialized_keys() {
        let mut rng = StdRng::seed_from_u64(1);
        let forecast = forecaster(AnchoringMode::InstitutionalInterpolation)
            .forecast(&anchors(), today(), &mut rng)
            .unwrap();
        let value = serde_json::to_value(&forecast).unwrap();

        assert!(value["mensuel"]["predictions"].is_array());
        assert!(value["probabilites"]["inflation_sous_2pct"].is_number());
        assert!(value["facteurs"]["cible_ajustee"].is_number());
        assert_eq!(value["mensuel"]["periods"][0], "2026-11");
    }
}
