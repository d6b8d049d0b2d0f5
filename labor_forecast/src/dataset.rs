//! Typed view of the persisted dashboard dataset
//!
//! Only the fields read by the forecasting models are modeled. All of them
//! are optional: the upstream fetcher is best-effort and may omit anything.
//! Numbers are accepted either as JSON numbers or as numeric strings.
//! History rows that do not fit their record shape are skipped.

use crate::error::{ForecastError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// A number that may have been serialized as a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Numeric value, `None` when the text is not a number
    pub fn value(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) if n.is_finite() => Some(*n),
            Numeric::Number(_) => None,
            Numeric::Text(s) => s
                .trim()
                .trim_end_matches('%')
                .trim()
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite()),
        }
    }

    /// Period label: text as-is, whole numbers as years
    pub fn label(&self) -> Option<String> {
        match self {
            Numeric::Number(n) if n.is_finite() && n.fract() == 0.0 => {
                Some(format!("{}", *n as i64))
            }
            Numeric::Number(_) => None,
            Numeric::Text(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }
}

/// Resolve an optional numeric field
pub fn numeric(field: &Option<Numeric>) -> Option<f64> {
    field.as_ref().and_then(Numeric::value)
}

/// Resolve an optional period label
pub fn label(field: &Option<Numeric>) -> Option<String> {
    field.as_ref().and_then(Numeric::label)
}

/// Deserialize a list of rows, dropping the rows that do not fit `T`
fn lenient_rows<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let rows = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(rows
        .into_iter()
        .filter_map(|row| match T::deserialize(row) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "skipping malformed history row");
                None
            }
        })
        .collect())
}

/// `indicateurs_cles` block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyIndicators {
    #[serde(default)]
    pub inflation_annuelle: Option<Numeric>,
    #[serde(default)]
    pub taux_chomage_actuel: Option<Numeric>,
    #[serde(default)]
    pub difficultes_recrutement: Option<Numeric>,
    #[serde(default)]
    pub climat_affaires: Option<Numeric>,
    #[serde(default)]
    pub prix_gazole: Option<Numeric>,
}

/// `smic` block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmicSnapshot {
    #[serde(default)]
    pub montant_brut: Option<Numeric>,
    #[serde(default)]
    pub montant_net: Option<Numeric>,
    #[serde(default)]
    pub date_vigueur: Option<String>,
}

/// Year-keyed institutional projections (`previsions.banque_de_france`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstitutionalTables {
    #[serde(default)]
    pub pib_croissance: BTreeMap<String, Option<Numeric>>,
    #[serde(default)]
    pub inflation_ipch: BTreeMap<String, Option<Numeric>>,
    #[serde(default)]
    pub taux_chomage: BTreeMap<String, Option<Numeric>>,
}

/// `previsions` block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Projections {
    #[serde(default)]
    pub banque_de_france: InstitutionalTables,
}

/// Legacy top-level `climat_affaires` block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClimateBlock {
    #[serde(default)]
    pub valeur_actuelle: Option<Numeric>,
}

/// One row of `inflation_salaires`
#[derive(Debug, Clone, Deserialize)]
pub struct InflationWageRecord {
    #[serde(default)]
    pub annee: Option<Numeric>,
    #[serde(default)]
    pub inflation: Option<Numeric>,
    #[serde(default)]
    pub salaires_base: Option<Numeric>,
}

/// One row of `chomage`
#[derive(Debug, Clone, Deserialize)]
pub struct UnemploymentRecord {
    #[serde(default)]
    pub trimestre: Option<Numeric>,
    #[serde(default)]
    pub taux: Option<Numeric>,
}

/// The subset of the dataset consumed by the forecasting core
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub indicateurs_cles: KeyIndicators,
    #[serde(default)]
    pub smic: SmicSnapshot,
    #[serde(default)]
    pub previsions: Projections,
    #[serde(default)]
    pub climat_affaires: Option<ClimateBlock>,
    #[serde(default, deserialize_with = "lenient_rows")]
    pub inflation_salaires: Vec<InflationWageRecord>,
    #[serde(default, deserialize_with = "lenient_rows")]
    pub chomage: Vec<UnemploymentRecord>,
}

impl Dataset {
    /// Build the typed view from a parsed JSON document
    pub fn from_value(document: &Value) -> Result<Self> {
        if !document.is_object() {
            return Err(ForecastError::Schema(
                "Dataset root must be a JSON object".to_string(),
            ));
        }

        Dataset::deserialize(document)
            .map_err(|e| ForecastError::Schema(format!("Unexpected dataset shape: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_accepts_strings() {
        assert_eq!(Numeric::Number(1.4).value(), Some(1.4));
        assert_eq!(Numeric::Text("1.6".to_string()).value(), Some(1.6));
        assert_eq!(Numeric::Text(" 7,5 % ".to_string()).value(), Some(7.5));
        assert_eq!(Numeric::Text("n/a".to_string()).value(), None);
    }

    #[test]
    fn test_numeric_labels() {
        assert_eq!(Numeric::Number(2024.0).label().as_deref(), Some("2024"));
        assert_eq!(Numeric::Number(2024.5).label(), None);
        assert_eq!(Numeric::Text(" T3 2025 ".to_string()).label().as_deref(), Some("T3 2025"));
        assert_eq!(Numeric::Text("  ".to_string()).label(), None);
    }

    #[test]
    fn test_history_rows_are_lenient() {
        let dataset = Dataset::from_value(&json!({
            "inflation_salaires": [
                { "annee": 2024, "inflation": 2.0 },
                { "inflation": 1.0 },
                "2023",
                { "annee": "2025", "inflation": 1.1 }
            ],
            "chomage": [ { "taux": 7.5 }, { "trimestre": "T1 2026", "taux": 7.4 } ]
        }))
        .unwrap();

        assert_eq!(dataset.inflation_salaires.len(), 3);
        assert_eq!(label(&dataset.inflation_salaires[0].annee).as_deref(), Some("2024"));
        assert!(dataset.inflation_salaires[1].annee.is_none());
        assert_eq!(dataset.chomage.len(), 2);
        assert!(dataset.chomage[0].trimestre.is_none());
    }

    #[test]
    fn test_history_must_be_a_list() {
        let result = Dataset::from_value(&json!({ "chomage": { "taux": 7.5 } }));
        assert!(matches!(result, Err(ForecastError::Schema(_))));

        let dataset = Dataset::from_value(&json!({ "chomage": null })).unwrap();
        assert!(dataset.chomage.is_empty());
    }

    #[test]
    fn test_empty_object_is_valid() {
        let dataset = Dataset::from_value(&json!({})).unwrap();
        assert!(dataset.inflation_salaires.is_empty());
        assert!(numeric(&dataset.indicateurs_cles.inflation_annuelle).is_none());
    }

    #[test]
    fn test_wrong_shape_is_schema_error() {
        let result = Dataset::from_value(&json!({ "indicateurs_cles": "oops" }));
        assert!(matches!(result, Err(ForecastError::Schema(_))));

        let result = Dataset::from_value(&json!([1, 2, 3]));
        assert!(matches!(result, Err(ForecastError::Schema(_))));
    }

    #[test]
    fn test_reads_nested_fields() {
        let dataset = Dataset::from_value(&json!({
            "indicateurs_cles": { "inflation_annuelle": 0.9, "taux_chomage_actuel": 7.7 },
            "smic": { "montant_brut": 1823.03, "date_vigueur": "2026-01-01" },
            "previsions": { "banque_de_france": { "inflation_ipch": { "2026": "1.4", "2027": null } } },
            "chomage": [ { "trimestre": "T3 2025", "taux": 7.7, "jeunes": null } ],
            "last_updated": "2026-10-01T00:00:00"
        }))
        .unwrap();

        assert_eq!(numeric(&dataset.indicateurs_cles.inflation_annuelle), Some(0.9));
        assert_eq!(dataset.smic.date_vigueur.as_deref(), Some("2026-01-01"));
        let ipch = &dataset.previsions.banque_de_france.inflation_ipch;
        assert_eq!(numeric(&ipch["2026"]), Some(1.4));
        assert_eq!(numeric(&ipch["2027"]), None);
        assert_eq!(dataset.chomage.len(), 1);
    }
}
