//! Quarterly unemployment forecaster
//!
//! Same structure as the inflation forecaster on a quarterly grid. The target
//! rises when the business climate is weak and when recruitment is easy
//! (slack labor market). No seasonality.

use super::{implied_sigma, normal_probability_below, ForecastPath, Indicator, Trend};
use crate::anchors::Anchors;
use crate::calendar::{sorted_values, Period};
use crate::config::{AnchoringMode, IndicatorDynamics};
use crate::error::{ForecastError, Result};
use crate::simulation::{self, SimulationParams};
use chrono::NaiveDate;
use rand::RngCore;
use serde::Serialize;
use series_math::{round_to, volatility, ConfidenceLevel, IntervalBuilder};
use tracing::debug;

/// Target adjustment per point of business climate below 100
const CLIMATE_COEFFICIENT: f64 = 0.02;
/// Recruitment-difficulty index of a balanced labor market
const RECRUITMENT_BASELINE: f64 = 50.0;
/// Target adjustment per point of recruitment difficulty below the baseline
const RECRUITMENT_COEFFICIENT: f64 = 0.01;
/// Realistic range of the French unemployment rate
const TARGET_RANGE: (f64, f64) = (5.0, 12.0);
const TREND_BAND: f64 = 0.2;
const LOW_THRESHOLD: f64 = 7.0;
const HIGH_THRESHOLD: f64 = 8.0;
/// Annualized volatility of the interpolated path
const INTERPOLATION_VOLATILITY: f64 = 0.3;
/// Share of the gap to the target closed over the horizon when interpolating
const INTERPOLATION_DAMPING: f64 = 0.8;
/// Okun's law: unemployment change per point of growth above potential
const OKUN_COEFFICIENT: f64 = -0.35;
/// French potential growth (%)
const POTENTIAL_GROWTH: f64 = 1.3;
/// Target adjustment per point of business climate below 100 in freeform mode
const FREEFORM_CLIMATE_COEFFICIENT: f64 = 0.015;
/// Weight of the previous quarterly change
const FREEFORM_INERTIA: f64 = 0.3;

/// Probabilities attached to the unemployment forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnemploymentProbabilities {
    /// Chance (%) the rate ends below 7%
    #[serde(rename = "chomage_sous_7pct")]
    pub below_7pct: f64,
    /// Chance (%) the rate ends above 8%
    #[serde(rename = "chomage_au_dessus_8pct")]
    pub above_8pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnemploymentFactors {
    #[serde(rename = "cible_bdf")]
    pub institutional_target: f64,
    #[serde(rename = "ajustement_climat")]
    pub climate_adjustment: f64,
    #[serde(rename = "ajustement_recrutement")]
    pub recruitment_adjustment: f64,
    #[serde(rename = "cible_ajustee")]
    pub adjusted_target: f64,
}

/// Output of the unemployment forecaster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnemploymentForecast {
    #[serde(rename = "actuel")]
    pub current: f64,
    /// Point forecast at the end of the horizon
    #[serde(rename = "prevision_q4")]
    pub forecast_end: f64,
    #[serde(rename = "tendance")]
    pub trend: Trend,
    pub confidence: f64,
    #[serde(rename = "trimestriel")]
    pub quarterly: ForecastPath,
    #[serde(rename = "probabilites")]
    pub probabilities: UnemploymentProbabilities,
    #[serde(rename = "facteurs")]
    pub factors: UnemploymentFactors,
    pub insight: String,
}

/// Quarterly unemployment forecaster
#[derive(Debug, Clone)]
pub struct UnemploymentForecaster {
    mode: AnchoringMode,
    dynamics: IndicatorDynamics,
    horizon: usize,
    n_simulations: usize,
}

impl UnemploymentForecaster {
    /// Create a new unemployment forecaster
    pub fn new(
        mode: AnchoringMode,
        dynamics: IndicatorDynamics,
        horizon: usize,
        n_simulations: usize,
    ) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Unemployment horizon must be at least one quarter".to_string(),
            ));
        }

        Ok(Self {
            mode,
            dynamics,
            horizon,
            n_simulations,
        })
    }

    /// Forecast the unemployment rate for the quarters following `today`
    pub fn forecast(
        &self,
        anchors: &Anchors,
        today: NaiveDate,
        rng: &mut dyn RngCore,
    ) -> Result<UnemploymentForecast> {
        let periods = Period::quarter_of(today).following(self.horizon);

        let climate_adjustment = (100.0 - anchors.business_climate) * CLIMATE_COEFFICIENT;
        let recruitment_adjustment =
            (RECRUITMENT_BASELINE - anchors.recruitment_difficulty) * RECRUITMENT_COEFFICIENT;
        let adjust = |target: f64| {
            (target + climate_adjustment + recruitment_adjustment)
                .clamp(TARGET_RANGE.0, TARGET_RANGE.1)
        };

        let institutional_target = anchors
            .targets
            .unemployment
            .for_year(periods[0].year());
        let factors = UnemploymentFactors {
            institutional_target,
            climate_adjustment: round_to(climate_adjustment, 2),
            recruitment_adjustment: round_to(recruitment_adjustment, 2),
            adjusted_target: round_to(adjust(institutional_target), 2),
        };

        let (quarterly, probabilities, coverage) = match self.mode {
            AnchoringMode::MonteCarlo => {
                let targets = periods
                    .iter()
                    .map(|p| adjust(anchors.targets.unemployment.for_year(p.year())))
                    .collect();
                let (path, probabilities) =
                    self.simulate(anchors.unemployment, targets, periods, rng)?;
                (path, probabilities, 80)
            }
            AnchoringMode::InstitutionalInterpolation => {
                let points = self.interpolate(anchors, &periods);
                let builder = IntervalBuilder::new(INTERPOLATION_VOLATILITY, 4)?
                    .with_level(ConfidenceLevel::P90)
                    .with_floor(Indicator::Unemployment.floor())
                    .with_decimals(1);
                let (path, probabilities) = deterministic_path(
                    periods,
                    points,
                    &builder,
                    "Interpolation vers prévisions Banque de France",
                )?;
                (path, probabilities, 90)
            }
            AnchoringMode::Freeform => {
                let (points, vol) = okun(anchors, &periods);
                let builder = IntervalBuilder::new(vol, 4)?
                    .with_level(ConfidenceLevel::P95)
                    .with_floor(Indicator::Unemployment.floor());
                let methodology = format!(
                    "Loi d'Okun (coef={}, potentiel={}%) + climat affaires",
                    OKUN_COEFFICIENT, POTENTIAL_GROWTH
                );
                let (path, probabilities) =
                    deterministic_path(periods, points, &builder, &methodology)?;
                (path, probabilities, 95)
            }
        };

        let forecast_end = quarterly.last_point().unwrap_or(anchors.unemployment);
        let insight = format!(
            "Chômage médian à {} : {}% [IC {}% : {}% - {}%].",
            quarterly
                .periods
                .last()
                .map(|p| p.to_string())
                .unwrap_or_default(),
            forecast_end,
            coverage,
            quarterly.last_lower().unwrap_or(forecast_end),
            quarterly.last_upper().unwrap_or(forecast_end),
        );

        debug!(forecast_end, mode = %self.mode, "unemployment forecast ready");

        Ok(UnemploymentForecast {
            current: anchors.unemployment,
            forecast_end,
            trend: Trend::classify(anchors.unemployment, forecast_end, TREND_BAND),
            confidence: 0.80,
            quarterly,
            probabilities,
            factors,
            insight,
        })
    }

    fn simulate(
        &self,
        current: f64,
        targets: Vec<f64>,
        periods: Vec<Period>,
        rng: &mut dyn RngCore,
    ) -> Result<(ForecastPath, UnemploymentProbabilities)> {
        let (low, high) = Indicator::Unemployment.domain();
        let params = SimulationParams::new(current, targets, self.dynamics.volatility)?
            .with_simulations(self.n_simulations)?
            .with_mean_reversion(self.dynamics.mean_reversion_speed)?
            .with_step_months(3)
            .with_domain(low, high)?;
        let summary = simulation::run(&params, rng)?;

        let probabilities = UnemploymentProbabilities {
            below_7pct: summary.probability_below(LOW_THRESHOLD),
            above_8pct: summary.probability_above(HIGH_THRESHOLD),
        };
        let path = ForecastPath::new(
            periods,
            summary.p50,
            summary.p10,
            summary.p90,
            summary.p25,
            summary.p75,
            format!(
                "Monte Carlo ({} simulations) + indicateurs avancés",
                self.n_simulations
            ),
        )?;

        Ok((path, probabilities))
    }

    /// Damped glide toward the projection of each quarter's year
    fn interpolate(&self, anchors: &Anchors, periods: &[Period]) -> Vec<f64> {
        let mut current = anchors.unemployment;
        periods
            .iter()
            .enumerate()
            .map(|(i, period)| {
                let target = anchors.targets.unemployment.for_year(period.year());
                let progress = (i + 1) as f64 / self.horizon as f64;
                current += (target - current) * progress * INTERPOLATION_DAMPING;
                round_to(current, 1)
            })
            .collect()
    }
}

fn deterministic_path(
    periods: Vec<Period>,
    points: Vec<f64>,
    builder: &IntervalBuilder,
    methodology: &str,
) -> Result<(ForecastPath, UnemploymentProbabilities)> {
    let (lower, upper) = builder.build(&points);
    let level = builder.level();
    let path = ForecastPath::from_interval(periods, points, lower, upper, level, methodology)?;

    let probabilities = match (path.last_point(), path.last_upper()) {
        (Some(point), Some(upper)) => {
            let sigma = implied_sigma(point, upper, level);
            UnemploymentProbabilities {
                below_7pct: normal_probability_below(point, sigma, LOW_THRESHOLD),
                above_8pct: round_to(
                    100.0 - normal_probability_below(point, sigma, HIGH_THRESHOLD),
                    1,
                ),
            }
        }
        _ => UnemploymentProbabilities {
            below_7pct: 0.0,
            above_8pct: 0.0,
        },
    };

    Ok((path, probabilities))
}

/// Okun's-law drift plus business-climate impact and inertia of the recent
/// trend. Returns the path and the volatility of its band.
fn okun(anchors: &Anchors, periods: &[Period]) -> (Vec<f64>, f64) {
    let history = sorted_values(&anchors.unemployment_history);
    let recent = &history[history.len().saturating_sub(8)..];

    // Average quarterly change over the last year; flat with short history
    let mut trend = if recent.len() >= 4 {
        (recent[recent.len() - 1] - recent[recent.len() - 4]) / 4.0
    } else {
        0.0
    };

    let gdp_growth = anchors
        .targets
        .gdp_growth
        .for_year(periods.first().map(Period::year).unwrap_or_default());
    let okun_impact = OKUN_COEFFICIENT * (gdp_growth - POTENTIAL_GROWTH);
    let climate_impact = (100.0 - anchors.business_climate) * FREEFORM_CLIMATE_COEFFICIENT;

    let mut current = anchors.unemployment;
    let points = periods
        .iter()
        .map(|_| {
            let delta = (okun_impact + climate_impact) / 4.0 + trend * FREEFORM_INERTIA;
            current = (current + delta).clamp(TARGET_RANGE.0, TARGET_RANGE.1);
            trend = delta;
            round_to(current, 1)
        })
        .collect();

    // Unemployment is less volatile than its raw quarterly changes suggest
    let vol = volatility(recent) * 0.5;

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

    fn anchors(history: serde_json::Value) -> Anchors {
        let dataset = Dataset::from_value(&json!({
            "indicateurs_cles": {
                "taux_chomage_actuel": 7.7,
                "climat_affaires": 97,
                "difficultes_recrutement": 55
            },
            "previsions": { "banque_de_france": {
                "taux_chomage": { "2026": 7.8, "2027": 7.6 },
                "pib_croissance": { "2026": 0.9, "2027": 1.2 }
            } },
            "chomage": history
        }))
        .unwrap();
        Anchors::extract(&dataset, today(), 0.792)
    }

    fn forecaster(mode: AnchoringMode) -> UnemploymentForecaster {
        let dynamics = IndicatorDynamics {
            volatility: 0.4,
            mean_reversion_speed: 0.10,
        };
        UnemploymentForecaster::new(mode, dynamics, 4, 1000).unwrap()
    }

    #[rstest]
    #[case(AnchoringMode::MonteCarlo)]
    #[case(AnchoringMode::InstitutionalInterpolation)]
    #[case(AnchoringMode::Freeform)]
    fn test_four_quarter_path(#[case] mode: AnchoringMode) {
        let mut rng = StdRng::seed_from_u64(20261018);
        let forecast = forecaster(mode)
            .forecast(&anchors(json!([])), today(), &mut rng)
            .unwrap();

        let labels: Vec<String> = forecast
            .quarterly
            .periods
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(labels, vec!["T1 2027", "T2 2027", "T3 2027", "T4 2027"]);
        assert!((5.0..=12.0).contains(&forecast.forecast_end));
        assert!(forecast.quarterly.lower_bound.iter().all(|&v| v >= 0.0));
        assert!((0.0..=100.0).contains(&forecast.probabilities.below_7pct));
    }

    #[test]
    fn test_target_adjustments() {
        let mut rng = StdRng::seed_from_u64(1);
        let forecast = forecaster(AnchoringMode::MonteCarlo)
            .forecast(&anchors(json!([])), today(), &mut rng)
            .unwrap();

        assert_eq!(forecast.factors.institutional_target, 7.6);
        assert_eq!(forecast.factors.climate_adjustment, 0.06);
        assert_eq!(forecast.factors.recruitment_adjustment, -0.05);
        assert_eq!(forecast.factors.adjusted_target, 7.61);
    }

    #[test]
    fn test_okun_uses_recent_trend() {
        let rising = anchors(json!([
            { "trimestre": "T4 2025", "taux": 7.0 },
            { "trimestre": "T1 2026", "taux": 7.2 },
            { "trimestre": "T2 2026", "taux": 7.4 },
            { "trimestre": "T3 2026", "taux": 7.6 }
        ]));
        let flat = anchors(json!([{ "trimestre": "T3 2026", "taux": 7.6 }]));
        let periods = Period::quarter_of(today()).following(4);

        let (rising_points, _) = okun(&rising, &periods);
        let (flat_points, flat_vol) = okun(&flat, &periods);

        assert!(rising_points[0] > flat_points[0]);
        assert_eq!(flat_vol, series_math::DEFAULT_VOLATILITY * 0.5);
    }
}
