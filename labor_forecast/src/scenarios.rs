//! Scenario generation
//!
//! Two families of scenarios are derived from a forecast run:
//!
//! - three ordered narratives (optimistic, central, pessimistic) read off the
//!   quartiles of the inflation and unemployment paths
//! - a fixed catalogue of what-if shocks, each an elasticity-derived delta on
//!   the institutional baseline, with an illustrative probability
//!
//! Nothing here is simulated.

use crate::anchors::Anchors;
use crate::models::inflation::InflationForecast;
use crate::models::smic::SmicForecast;
use crate::models::unemployment::UnemploymentForecast;
use crate::models::wages::WageForecast;
use crate::notes::DEFAULT_SMIC_INCREASE;
use serde::{Serialize, Serializer};
use series_math::round_to;
use std::collections::BTreeMap;

/// Response of inflation and unemployment (points) to one unit of a shock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elasticity {
    pub inflation: f64,
    pub unemployment: f64,
}

/// Oil price +10%
pub const OIL_10PCT: Elasticity = Elasticity {
    inflation: 0.15,
    unemployment: 0.05,
};
/// Gas price +50%
pub const GAS_50PCT: Elasticity = Elasticity {
    inflation: 0.30,
    unemployment: 0.08,
};
/// ECB policy rate +1 point
pub const ECB_RATE_1PT: Elasticity = Elasticity {
    inflation: -0.15,
    unemployment: 0.25,
};

/// Extra SMIC increase of the optimistic scenario (points)
const OPTIMISTIC_SMIC_PREMIUM: f64 = 0.3;
/// SMIC increase shortfall of the pessimistic scenario (points)
const PESSIMISTIC_SMIC_SHORTFALL: f64 = 0.2;
/// Statutory floor of the January revaluation (%)
const SMIC_FLOOR: f64 = 1.0;
/// Wage growth spread around the central scenario (points)
const WAGE_SPREAD: f64 = 0.3;
/// GDP growth spread around the institutional projection (points)
const GDP_SPREAD: f64 = 0.5;

fn signed_percent<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{:+}%", value))
}

fn percent<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{}%", value))
}

/// One coherent narrative
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub inflation_12m: f64,
    pub chomage_q4: f64,
    pub salaires_12m: f64,
    #[serde(serialize_with = "signed_percent")]
    pub smic_increase: f64,
    #[serde(serialize_with = "signed_percent")]
    pub pib: f64,
    pub hypotheses: String,
}

/// Scenarios ordered by adversity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSet {
    pub optimiste: Scenario,
    pub central: Scenario,
    pub pessimiste: Scenario,
}

/// Point impact of a shock
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShockImpact {
    pub inflation_12m: f64,
    pub chomage_q4: f64,
    /// Expected effect on the SMIC, free text
    pub smic_supp: &'static str,
}

/// A deterministic sensitivity scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhatIfScenario {
    #[serde(rename = "nom")]
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "hypotheses")]
    pub assumptions: BTreeMap<&'static str, &'static str>,
    pub impact: ShockImpact,
    /// Illustrative probability (%)
    #[serde(rename = "probabilite", serialize_with = "percent")]
    pub probability: u32,
    #[serde(rename = "declencheur")]
    pub trigger: &'static str,
}

/// How a shock moves the baseline
#[derive(Debug, Clone, Copy, PartialEq)]
enum ShockDriver {
    /// `magnitude` units of an elasticity
    Elastic(Elasticity, f64),
    /// Direct deltas (inflation, unemployment)
    Direct(f64, f64),
}

impl ShockDriver {
    fn deltas(self) -> (f64, f64) {
        match self {
            ShockDriver::Elastic(e, magnitude) => {
                (e.inflation * magnitude, e.unemployment * magnitude)
            }
            ShockDriver::Direct(inflation, unemployment) => (inflation, unemployment),
        }
    }
}

struct ShockDefinition {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    assumptions: &'static [(&'static str, &'static str)],
    driver: ShockDriver,
    smic: &'static str,
    probability: u32,
    trigger: &'static str,
}

const CATALOGUE: [ShockDefinition; 5] = [
    ShockDefinition {
        key: "choc_petrolier",
        name: "Choc pétrolier (+30%)",
        description: "Hausse brutale du prix du pétrole de 30%",
        assumptions: &[("petrole", "+30%"), ("gaz", "+20%")],
        driver: ShockDriver::Elastic(OIL_10PCT, 3.0),
        smic: "+0.5%",
        probability: 15,
        trigger: "Tensions géopolitiques Moyen-Orient",
    },
    ShockDefinition {
        key: "recession_ue",
        name: "Récession zone euro",
        description: "Contraction économique en Allemagne et Italie",
        assumptions: &[("pib_ue", "-0.5%"), ("climat", "-15pts")],
        driver: ShockDriver::Direct(-0.4, 0.5),
        smic: "0%",
        probability: 20,
        trigger: "Crise industrielle allemande",
    },
    ShockDefinition {
        key: "hausse_taux",
        name: "Hausse taux BCE (+1pt)",
        description: "Resserrement monétaire inattendu",
        assumptions: &[("taux_bce", "+1pt"), ("credit", "-10%")],
        driver: ShockDriver::Elastic(ECB_RATE_1PT, 1.0),
        smic: "0%",
        probability: 10,
        trigger: "Inflation zone euro persistante",
    },
    ShockDefinition {
        key: "reprise_forte",
        name: "Reprise économique forte",
        description: "Consommation et investissement repartent",
        assumptions: &[("pib", "+2%"), ("climat", "+10pts")],
        driver: ShockDriver::Direct(0.3, -0.4),
        smic: "+0.3% (coup de pouce possible)",
        probability: 25,
        trigger: "Confiance ménages, baisse épargne",
    },
    ShockDefinition {
        key: "crise_energie",
        name: "Crise énergétique",
        description: "Rupture approvisionnement gaz",
        assumptions: &[("gaz", "+100%"), ("electricite", "+50%")],
        driver: ShockDriver::Elastic(GAS_50PCT, 2.0),
        smic: "+1% (revalorisation automatique probable)",
        probability: 10,
        trigger: "Conflit Russie-Ukraine escalade",
    },
];

/// Optimistic, central and pessimistic narratives from the forecast quartiles
pub fn central_scenarios(
    anchors: &Anchors,
    inflation: &InflationForecast,
    unemployment: &UnemploymentForecast,
    wages: &WageForecast,
    smic: &SmicForecast,
    year: i32,
) -> ScenarioSet {
    let last = |values: &[f64], fallback: f64| values.last().copied().unwrap_or(fallback);
    let gdp = anchors.targets.gdp_growth.for_year(year);
    let smic_increase = smic
        .january()
        .map(|e| e.increase_pct)
        .unwrap_or(DEFAULT_SMIC_INCREASE);

    ScenarioSet {
        optimiste: Scenario {
            inflation_12m: last(&inflation.monthly.p25, inflation.forecast_12m),
            chomage_q4: last(&unemployment.quarterly.p25, unemployment.forecast_end),
            salaires_12m: round_to(wages.forecast_12m + WAGE_SPREAD, 2),
            smic_increase: round_to(smic_increase + OPTIMISTIC_SMIC_PREMIUM, 1),
            pib: round_to(gdp + GDP_SPREAD, 1),
            hypotheses: "Scénario favorable (percentile 25)".to_string(),
        },
        central: Scenario {
            inflation_12m: inflation.forecast_12m,
            chomage_q4: unemployment.forecast_end,
            salaires_12m: wages.forecast_12m,
            smic_increase,
            pib: round_to(gdp, 1),
            hypotheses: "Scénario médian (Banque de France)".to_string(),
        },
        pessimiste: Scenario {
            inflation_12m: last(&inflation.monthly.p75, inflation.forecast_12m),
            chomage_q4: last(&unemployment.quarterly.p75, unemployment.forecast_end),
            salaires_12m: round_to(wages.forecast_12m - WAGE_SPREAD, 2),
            smic_increase: round_to(
                (smic_increase - PESSIMISTIC_SMIC_SHORTFALL).max(SMIC_FLOOR),
                1,
            ),
            pib: round_to(gdp - GDP_SPREAD, 1),
            hypotheses: "Scénario défavorable (percentile 75)".to_string(),
        },
    }
}

/// The what-if catalogue applied to the institutional baseline of `year`
pub fn what_if_scenarios(anchors: &Anchors, year: i32) -> BTreeMap<&'static str, WhatIfScenario> {
    let base_inflation = anchors.targets.inflation.for_year(year);
    let base_unemployment = anchors.targets.unemployment.for_year(year);

    CATALOGUE
        .iter()
        .map(|shock| {
            let (d_inflation, d_unemployment) = shock.driver.deltas();
            let scenario = WhatIfScenario {
                name: shock.name,
                description: shock.description,
                assumptions: shock.assumptions.iter().copied().collect(),
                impact: ShockImpact {
                    inflation_12m: round_to(base_inflation + d_inflation, 1),
                    chomage_q4: round_to(base_unemployment + d_unemployment, 1),
                    smic_supp: shock.smic,
                },
                probability: shock.probability,
                trigger: shock.trigger,
            };
            (shock.key, scenario)
        })
        .collect()
}

/// The what-if scenario with the highest probability
pub fn most_likely<'a>(
    scenarios: &'a BTreeMap<&'static str, WhatIfScenario>,
) -> Option<&'a WhatIfScenario> {
    scenarios.values().max_by_key(|s| s.probability)
}
