//! Reading notes
//!
//! Formats the forecast outputs into short French bullet strings for the
//! dashboard. No computation beyond selection and formatting.

use crate::models::inflation::InflationForecast;
use crate::models::smic::SmicForecast;
use crate::models::unemployment::UnemploymentForecast;
use crate::scenarios::{most_likely, WhatIfScenario};
use chrono::Datelike;
use std::collections::BTreeMap;

/// Probability (%) shown when the inflation forecast carries none
pub const DEFAULT_BELOW_2PCT_PROBABILITY: f64 = 50.0;
/// SMIC increase (%) assumed when no revaluation was projected
pub const DEFAULT_SMIC_INCREASE: f64 = 2.0;
/// Real-wage margin over forecast inflation in the negotiation ask (points)
const NEGOTIATION_MARGIN: f64 = 0.5;
/// Upper-bound inflation above which an upside risk is flagged
const UPSIDE_RISK_THRESHOLD: f64 = 2.5;

/// Build the ordered reading notes
pub fn reading_notes(
    inflation: &InflationForecast,
    smic: Option<&SmicForecast>,
    unemployment: &UnemploymentForecast,
    what_ifs: &BTreeMap<&'static str, WhatIfScenario>,
) -> Vec<String> {
    let mut notes = Vec::with_capacity(6);

    let below_2pct = Some(inflation.probabilities.below_2pct)
        .filter(|p| p.is_finite())
        .unwrap_or(DEFAULT_BELOW_2PCT_PROBABILITY);
    let inflation_upper = inflation
        .monthly
        .last_upper()
        .unwrap_or(inflation.forecast_12m);
    notes.push(format!(
        "Inflation médiane à 12 mois : {}% [{}% - {}%], {}% de chances de rester sous 2%",
        inflation.forecast_12m,
        inflation
            .monthly
            .last_lower()
            .unwrap_or(inflation.forecast_12m),
        inflation_upper,
        below_2pct
    ));

    if let Some(event) = smic.and_then(|s| s.events.first()) {
        let range = event
            .range
            .map(|r| format!(", fourchette {}-{}%", r.min, r.max))
            .unwrap_or_default();
        notes.push(format!(
            "SMIC janvier {} : {:.0}€ brut (+{}%{}), certain",
            event.date.year(),
            event.gross,
            event.increase_pct,
            range
        ));
    }

    notes.push(format!(
        "Chômage {} : {}% [{}% - {}%], tendance {}",
        unemployment
            .quarterly
            .periods
            .last()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "fin d'horizon".to_string()),
        unemployment.forecast_end,
        unemployment
            .quarterly
            .last_lower()
            .unwrap_or(unemployment.forecast_end),
        unemployment
            .quarterly
            .last_upper()
            .unwrap_or(unemployment.forecast_end),
        unemployment.trend.label()
    ));

    if inflation_upper > UPSIDE_RISK_THRESHOLD {
        notes.push(format!(
            "Risque haussier inflation : {}% en scénario défavorable",
            inflation_upper
        ));
    }

    if let Some(scenario) = most_likely(what_ifs) {
        notes.push(format!(
            "Scénario à surveiller : {} ({}% de probabilité)",
            scenario.name, scenario.probability
        ));
    }

    let smic_increase = smic
        .and_then(|s| s.events.first())
        .map(|e| e.increase_pct)
        .unwrap_or(DEFAULT_SMIC_INCREASE);
    let ask = (inflation.forecast_12m + NEGOTIATION_MARGIN).max(smic_increase);
    notes.push(format!(
        "Recommandation NAO : demander au minimum +{:.1}% pour préserver le pouvoir d'achat",
        ask
    ));

    notes
}
