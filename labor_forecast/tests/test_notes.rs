use chrono::{DateTime, Utc};
use labor_forecast::notes::{reading_notes, DEFAULT_SMIC_INCREASE};
use labor_forecast::{ForecastBundle, ForecastConfig, ForecastPipeline, RunContext};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use std::collections::BTreeMap;

fn bundle(inflation: f64, target: f64) -> ForecastBundle {
    let generated_at = DateTime::parse_from_rfc3339("2026-10-18T06:30:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let dataset = json!({
        "indicateurs_cles": { "inflation_annuelle": inflation, "taux_chomage_actuel": 7.7 },
        "smic": { "montant_brut": 1823.03 },
        "previsions": { "banque_de_france": { "inflation_ipch": { "2026": target, "2027": target } } }
    });
    ForecastPipeline::new(ForecastConfig::default())
        .unwrap()
        .run(&dataset, &RunContext::at(generated_at))
        .unwrap()
}

#[test]
fn test_notes_are_idempotent() {
    let b = bundle(1.5, 1.4);
    let first = reading_notes(&b.inflation, Some(&b.smic), &b.chomage, &b.whatif_scenarios);
    let second = reading_notes(&b.inflation, Some(&b.smic), &b.chomage, &b.whatif_scenarios);

    assert_eq!(first, second);
    assert_eq!(first, b.notes_lecture);
}

#[test]
fn test_notes_order() {
    let b = bundle(1.5, 1.4);
    let notes = &b.notes_lecture;

    assert!(notes[0].starts_with("Inflation médiane à 12 mois"));
    assert!(notes[1].starts_with("SMIC janvier 2027"));
    assert!(notes[2].starts_with("Chômage T4 2027"));
    assert!(notes.last().unwrap().starts_with("Recommandation NAO"));
}

#[test]
fn test_missing_smic_uses_default_increase() {
    let b = bundle(0.5, 0.5);
    let notes = reading_notes(&b.inflation, None, &b.chomage, &b.whatif_scenarios);

    assert!(notes.iter().all(|n| !n.starts_with("SMIC")));
    let ask = (b.inflation.forecast_12m + 0.5).max(DEFAULT_SMIC_INCREASE);
    assert_eq!(
        notes.last().unwrap(),
        &format!(
            "Recommandation NAO : demander au minimum +{:.1}% pour préserver le pouvoir d'achat",
            ask
        )
    );
}

#[test]
fn test_no_watch_note_without_what_ifs() {
    let b = bundle(1.5, 1.4);
    let notes = reading_notes(&b.inflation, Some(&b.smic), &b.chomage, &BTreeMap::new());

    assert!(notes.iter().all(|n| !n.starts_with("Scénario à surveiller")));
    assert_eq!(notes.len(), b.notes_lecture.len() - 1);
}

#[rstest]
#[case(1.5, 1.4)]
#[case(4.5, 3.5)]
fn test_upside_risk_note_follows_upper_bound(#[case] inflation: f64, #[case] target: f64) {
    let b = bundle(inflation, target);
    let upper = b.inflation.monthly.last_upper().unwrap();
    let flagged = b
        .notes_lecture
        .iter()
        .any(|n| n.starts_with("Risque haussier inflation"));

    assert_eq!(flagged, upper > 2.5);
}
