//! SMIC revaluation rule engine
//!
//! Encodes the two statutory triggers of the French minimum wage
//! (Code du travail, art. L3231-4 to L3231-11):
//!
//! - the mandatory revaluation every January 1st, always emitted first
//! - the automatic in-year revaluation once cumulative inflation since the
//!   last revaluation reaches 2%, emitted only as a low-probability event
//!
//! The probability coefficients are placeholders to be recalibrated against
//! the historical frequency of automatic revaluations.

use super::inflation::InflationForecast;
use crate::anchors::Anchors;
use crate::calendar::next_january;
use crate::config::{AnchoringMode, SmicRules};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use rand::{Rng, RngCore};
use serde::Serialize;
use series_math::{mean, round_to};
use tracing::debug;

const LEGAL_BASIS: &str = "Code du travail, art. L3231-5";

/// What triggers a revaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriggerKind {
    /// Mandatory January 1st revaluation
    #[serde(rename = "janvier")]
    Mandatory,
    /// In-year revaluation after 2% cumulative inflation
    #[serde(rename = "automatique")]
    Automatic,
}

/// Qualitative confidence of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventConfidence {
    Haute,
    Basse,
}

/// Plausible range of an increase (%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncreaseRange {
    pub min: f64,
    pub max: f64,
}

/// A projected minimum-wage change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevaluationEvent {
    /// Effective date
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TriggerKind,
    /// 1.0 for the mandatory revaluation
    pub probability: f64,
    #[serde(rename = "estimated_increase_pct")]
    pub increase_pct: f64,
    #[serde(rename = "estimated_new_smic_brut")]
    pub gross: f64,
    #[serde(rename = "estimated_new_smic_net")]
    pub net: f64,
    pub trigger: String,
    pub legal_basis: String,
    pub confidence: EventConfidence,
    #[serde(rename = "fourchette", skip_serializing_if = "Option::is_none")]
    pub range: Option<IncreaseRange>,
}

/// SMIC in force
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmicCurrent {
    #[serde(rename = "brut")]
    pub gross: f64,
    pub net: f64,
    #[serde(rename = "horaire_brut")]
    pub hourly_gross: f64,
    #[serde(rename = "last_revalorisation")]
    pub last_revaluation: NaiveDate,
}

/// Outcome of the next mandatory revaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmicOutlook {
    pub total_increase_pct: f64,
    #[serde(rename = "final_smic_brut")]
    pub final_gross: f64,
    #[serde(rename = "final_smic_net")]
    pub final_net: f64,
    #[serde(rename = "final_horaire_brut")]
    pub final_hourly_gross: f64,
    #[serde(rename = "fourchette", skip_serializing_if = "Option::is_none")]
    pub range: Option<IncreaseRange>,
}

/// Plain-language statutory rules
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulesSummary {
    pub janvier: &'static str,
    pub seuil_2pct: &'static str,
    pub base_calcul: &'static str,
    pub coup_de_pouce: &'static str,
}

impl Default for RulesSummary {
    fn default() -> Self {
        Self {
            janvier: "Revalorisation OBLIGATOIRE chaque 1er janvier",
            seuil_2pct: "Revalorisation AUTO si inflation +2% depuis dernière reva",
            base_calcul: "Inflation des 20% ménages les plus modestes",
            coup_de_pouce: "Possible mais non prévisible",
        }
    }
}

/// Output of the SMIC forecaster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmicForecast {
    pub current: SmicCurrent,
    /// Sorted by date; the mandatory January event is always first
    pub events: Vec<RevaluationEvent>,
    pub forecast_12m: SmicOutlook,
    pub rules_summary: RulesSummary,
    pub methodology: String,
}

impl SmicForecast {
    /// The mandatory January revaluation, `None` when no event was projected
    pub fn january(&self) -> Option<&RevaluationEvent> {
        self.events
            .first()
            .filter(|e| e.kind == TriggerKind::Mandatory)
    }
}

/// SMIC revaluation forecaster
#[derive(Debug, Clone)]
pub struct SmicForecaster {
    mode: AnchoringMode,
    rules: SmicRules,
}

impl SmicForecaster {
    /// Create a new SMIC forecaster
    pub fn new(mode: AnchoringMode, rules: SmicRules) -> Result<Self> {
        if !(rules.net_to_gross > 0.0 && rules.net_to_gross <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Net-to-gross ratio must be in (0, 1], got {}",
                rules.net_to_gross
            )));
        }
        if rules.monthly_hours <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Monthly hours must be positive".to_string(),
            ));
        }

        Ok(Self { mode, rules })
    }

    /// Project the revaluations following `today`
    pub fn forecast(
        &self,
        anchors: &Anchors,
        inflation: &InflationForecast,
        today: NaiveDate,
        rng: &mut dyn RngCore,
    ) -> Result<SmicForecast> {
        let january = next_january(today);
        let increase = self.january_increase(anchors, inflation, january.year(), rng);
        let gross = self.apply(anchors.smic_gross, increase);

        let mut events = vec![RevaluationEvent {
            date: january,
            kind: TriggerKind::Mandatory,
            probability: 1.0,
            increase_pct: increase,
            gross,
            net: self.net(gross),
            trigger: "Revalorisation annuelle obligatoire".to_string(),
            legal_basis: LEGAL_BASIS.to_string(),
            confidence: EventConfidence::Haute,
            range: Some(IncreaseRange {
                min: round_to(increase - self.rules.range_below, 1),
                max: round_to(increase + self.rules.range_above, 1),
            }),
        }];

        let upper = inflation
            .monthly
            .last_upper()
            .unwrap_or(inflation.forecast_12m);
        if let Some(event) = self.automatic_event(upper, january.year(), gross) {
            events.push(event);
        }
        events.sort_by_key(|e| e.date);

        debug!(
            increase,
            gross,
            events = events.len(),
            "SMIC revaluations projected"
        );

        let first = &events[0];
        let forecast_12m = SmicOutlook {
            total_increase_pct: first.increase_pct,
            final_gross: first.gross,
            final_net: first.net,
            final_hourly_gross: round_to(first.gross / self.rules.monthly_hours, 2),
            range: first.range,
        };

        let methodology = match self.mode {
            AnchoringMode::MonteCarlo => "Règles légales + Monte Carlo inflation",
            _ => "Règles légales Code du travail (L3231-4 à L3231-11) + prévisions inflation",
        };

        Ok(SmicForecast {
            current: SmicCurrent {
                gross: anchors.smic_gross,
                net: anchors.smic_net,
                hourly_gross: round_to(anchors.smic_gross / self.rules.monthly_hours, 2),
                last_revaluation: anchors.smic_effective_date,
            },
            events,
            forecast_12m,
            rules_summary: RulesSummary::default(),
            methodology: methodology.to_string(),
        })
    }

    /// January increase (%): projected inflation plus a margin, floored.
    ///
    /// Uses the institutional projection for the January year when known,
    /// otherwise the average of the inflation forecast, otherwise a default.
    fn january_increase(
        &self,
        anchors: &Anchors,
        inflation: &InflationForecast,
        year: i32,
        rng: &mut dyn RngCore,
    ) -> f64 {
        let rules = &self.rules;
        let predictions = &inflation.monthly.predictions;

        let base = if anchors.targets.inflation.has_year(year) {
            anchors.targets.inflation.for_year(year) + rules.annual_margin
        } else if !predictions.is_empty() {
            mean(predictions) + rules.fallback_margin
        } else {
            rules.fallback_inflation + rules.fallback_margin
        };

        let perturbation = if self.mode.is_stochastic() && rules.perturbation > 0.0 {
            rng.gen_range(-rules.perturbation..=rules.perturbation)
        } else {
            0.0
        };

        round_to((base + perturbation).max(rules.min_increase), 1)
    }

    /// Automatic in-year event when the upper-bound inflation forecast
    /// reaches the statutory threshold
    fn automatic_event(&self, upper: f64, year: i32, running_gross: f64) -> Option<RevaluationEvent> {
        let rules = &self.rules;
        if upper < rules.auto_threshold {
            return None;
        }

        let probability = ((upper - rules.auto_threshold) * rules.auto_probability_slope)
            .min(rules.auto_probability_ceiling);
        if probability <= rules.auto_probability_min {
            return None;
        }

        let increase = round_to(upper - rules.auto_increase_offset, 1);
        let gross = self.apply(running_gross, increase);

        Some(RevaluationEvent {
            date: NaiveDate::from_ymd_opt(year, 7, 1)?,
            kind: TriggerKind::Automatic,
            probability: round_to(probability, 2),
            increase_pct: increase,
            gross,
            net: self.net(gross),
            trigger: format!(
                "Inflation cumulée > {}% (scénario haut)",
                rules.auto_threshold
            ),
            legal_basis: LEGAL_BASIS.to_string(),
            confidence: EventConfidence::Basse,
            range: None,
        })
    }

    fn apply(&self, gross: f64, increase_pct: f64) -> f64 {
        round_to(gross * (1.0 + increase_pct / 100.0), 2)
    }

    fn net(&self, gross: f64) -> f64 {
        round_to(gross * self.rules.net_to_gross, 2)
    }
}
