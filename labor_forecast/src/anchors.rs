//! Anchor extraction
//!
//! Resolves every input of the forecasting models from the dataset in a
//! single place. A missing or unreadable field is replaced by the named
//! default below and logged; extraction itself never fails.

use crate::calendar::{Observation, Period};
use crate::dataset::{label, numeric, Dataset, Numeric};
use crate::models::EnergyOutlook;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Annual inflation (%) when `indicateurs_cles.inflation_annuelle` is missing
pub const DEFAULT_INFLATION: f64 = 1.5;
/// Unemployment rate (%) when `indicateurs_cles.taux_chomage_actuel` is missing
pub const DEFAULT_UNEMPLOYMENT: f64 = 7.5;
/// Monthly gross SMIC (EUR) when `smic.montant_brut` is missing
pub const DEFAULT_SMIC_GROSS: f64 = 1823.03;
/// Monthly net SMIC (EUR) when both SMIC amounts are missing
pub const DEFAULT_SMIC_NET: f64 = 1443.11;
/// Business-climate index (base 100) when no climate field is present
pub const DEFAULT_BUSINESS_CLIMATE: f64 = 100.0;
/// Share of firms reporting hiring difficulties (%) when missing
pub const DEFAULT_RECRUITMENT_DIFFICULTY: f64 = 50.0;
/// Inflation projections (year, %) when the institutional table is empty
pub const DEFAULT_INFLATION_TARGETS: [(i32, f64); 2] = [(2026, 1.4), (2027, 1.6)];
/// Unemployment projections (year, %) when the institutional table is empty
pub const DEFAULT_UNEMPLOYMENT_TARGETS: [(i32, f64); 2] = [(2026, 7.7), (2027, 7.5)];
/// GDP growth projections (year, %) when the institutional table is empty
pub const DEFAULT_GDP_TARGETS: [(i32, f64); 1] = [(2026, 1.0)];

/// Year-keyed institutional projections for one indicator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetTable {
    values: BTreeMap<i32, f64>,
}

impl TargetTable {
    /// Build a table from (year, value) pairs
    pub fn new(values: impl IntoIterator<Item = (i32, f64)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Projection for `year`.
    ///
    /// Falls back to the latest earlier year, then to the earliest later year.
    /// Tables are never empty once extracted.
    pub fn for_year(&self, year: i32) -> f64 {
        if let Some(value) = self.values.get(&year) {
            return *value;
        }
        self.values
            .range(..year)
            .next_back()
            .or_else(|| self.values.range(year..).next())
            .map(|(_, v)| *v)
            .unwrap_or(f64::NAN)
    }

    /// Whether the table has an explicit entry for `year`
    pub fn has_year(&self, year: i32) -> bool {
        self.values.contains_key(&year)
    }

    fn from_dataset(
        raw: &BTreeMap<String, Option<Numeric>>,
        defaults: &[(i32, f64)],
        name: &'static str,
        defaults_used: &mut Vec<&'static str>,
    ) -> Self {
        let values: BTreeMap<i32, f64> = raw
            .iter()
            .filter_map(|(year, value)| {
                let year = year.trim().parse::<i32>().ok()?;
                Some((year, numeric(value)?))
            })
            .collect();

        if values.is_empty() {
            warn!(field = name, "institutional projections missing, using defaults");
            defaults_used.push(name);
            return TargetTable::new(defaults.iter().copied());
        }

        TargetTable { values }
    }
}

/// Institutional projection tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionalTargets {
    pub inflation: TargetTable,
    pub unemployment: TargetTable,
    pub gdp_growth: TargetTable,
}

impl Default for InstitutionalTargets {
    fn default() -> Self {
        Self {
            inflation: TargetTable::new(DEFAULT_INFLATION_TARGETS),
            unemployment: TargetTable::new(DEFAULT_UNEMPLOYMENT_TARGETS),
            gdp_growth: TargetTable::new(DEFAULT_GDP_TARGETS),
        }
    }
}

/// Current-state snapshot used to seed every forecast
#[derive(Debug, Clone, PartialEq)]
pub struct Anchors {
    pub inflation: f64,
    pub unemployment: f64,
    pub smic_gross: f64,
    pub smic_net: f64,
    pub smic_effective_date: NaiveDate,
    pub business_climate: f64,
    pub recruitment_difficulty: f64,
    pub energy_outlook: EnergyOutlook,
    pub targets: InstitutionalTargets,
    /// Annual inflation history
    pub inflation_history: Vec<Observation>,
    /// Annual base-wage growth history
    pub wage_history: Vec<Observation>,
    /// Quarterly unemployment history
    pub unemployment_history: Vec<Observation>,
    /// Names of the fields that were replaced by defaults
    pub defaults_used: Vec<&'static str>,
}

impl Anchors {
    /// Resolve anchors from the dataset as of `today`.
    ///
    /// `net_to_gross` derives the net SMIC when only the gross amount is known.
    pub fn extract(dataset: &Dataset, today: NaiveDate, net_to_gross: f64) -> Self {
        let mut defaults_used = Vec::new();
        let indicators = &dataset.indicateurs_cles;

        let mut resolve = |value: Option<f64>, default: f64, name: &'static str| {
            value.unwrap_or_else(|| {
                warn!(field = name, default, "anchor missing, using default");
                defaults_used.push(name);
                default
            })
        };

        let inflation = resolve(
            numeric(&indicators.inflation_annuelle),
            DEFAULT_INFLATION,
            "indicateurs_cles.inflation_annuelle",
        );
        let unemployment = resolve(
            numeric(&indicators.taux_chomage_actuel),
            DEFAULT_UNEMPLOYMENT,
            "indicateurs_cles.taux_chomage_actuel",
        );
        let recruitment_difficulty = resolve(
            numeric(&indicators.difficultes_recrutement),
            DEFAULT_RECRUITMENT_DIFFICULTY,
            "indicateurs_cles.difficultes_recrutement",
        );
        let climate = numeric(&indicators.climat_affaires).or_else(|| {
            dataset
                .climat_affaires
                .as_ref()
                .and_then(|block| numeric(&block.valeur_actuelle))
        });
        let business_climate = resolve(
            climate,
            DEFAULT_BUSINESS_CLIMATE,
            "indicateurs_cles.climat_affaires",
        );

        let gross = numeric(&dataset.smic.montant_brut);
        let smic_gross = resolve(gross, DEFAULT_SMIC_GROSS, "smic.montant_brut");
        let net_default = if gross.is_some() {
            series_math::round_to(smic_gross * net_to_gross, 2)
        } else {
            DEFAULT_SMIC_NET
        };
        let smic_net = resolve(
            numeric(&dataset.smic.montant_net),
            net_default,
            "smic.montant_net",
        );

        let effective = dataset
            .smic
            .date_vigueur
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
        let smic_effective_date = effective.unwrap_or_else(|| {
            warn!(field = "smic.date_vigueur", "anchor missing, using January 1st");
            defaults_used.push("smic.date_vigueur");
            NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)
        });

        let energy_outlook = numeric(&indicators.prix_gazole)
            .map(EnergyOutlook::from_diesel_price)
            .unwrap_or(EnergyOutlook::Stable);

        let tables = &dataset.previsions.banque_de_france;
        let targets = InstitutionalTargets {
            inflation: TargetTable::from_dataset(
                &tables.inflation_ipch,
                &DEFAULT_INFLATION_TARGETS,
                "previsions.banque_de_france.inflation_ipch",
                &mut defaults_used,
            ),
            unemployment: TargetTable::from_dataset(
                &tables.taux_chomage,
                &DEFAULT_UNEMPLOYMENT_TARGETS,
                "previsions.banque_de_france.taux_chomage",
                &mut defaults_used,
            ),
            gdp_growth: TargetTable::from_dataset(
                &tables.pib_croissance,
                &DEFAULT_GDP_TARGETS,
                "previsions.banque_de_france.pib_croissance",
                &mut defaults_used,
            ),
        };

        let inflation_history = collect_history(
            dataset
                .inflation_salaires
                .iter()
                .map(|r| (label(&r.annee), numeric(&r.inflation))),
        );
        let wage_history = collect_history(
            dataset
                .inflation_salaires
                .iter()
                .map(|r| (label(&r.annee), numeric(&r.salaires_base))),
        );
        let unemployment_history = collect_history(
            dataset
                .chomage
                .iter()
                .map(|r| (label(&r.trimestre), numeric(&r.taux))),
        );

        debug!(
            inflation,
            unemployment,
            business_climate,
            recruitment_difficulty,
            inflation_points = inflation_history.len(),
            unemployment_points = unemployment_history.len(),
            "anchors extracted"
        );

        Self {
            inflation,
            unemployment,
            smic_gross,
            smic_net,
            smic_effective_date,
            business_climate,
            recruitment_difficulty,
            energy_outlook,
            targets,
            inflation_history,
            wage_history,
            unemployment_history,
            defaults_used,
        }
    }
}

fn collect_history(rows: impl Iterator<Item = (Option<String>, Option<f64>)>) -> Vec<Observation> {
    let mut observations: Vec<Observation> = rows
        .filter_map(|(label, value)| {
            let Some(label) = label else {
                debug!("skipping historical row without a period label");
                return None;
            };
            match (label.parse::<Period>(), value) {
                (Ok(period), Some(value)) => Some(Observation::new(period, value)),
                (Err(e), _) => {
                    debug!(label = %label, error = %e, "skipping historical row");
                    None
                }
                _ => None,
            }
        })
        .collect();
    observations.sort_by(|a, b| a.period.cmp(&b.period));
    observations
}
