//! Forecast orchestration
//!
//! A run is a single linear sequence of stages:
//!
//! `Load → ExtractAnchors → Inflation → Unemployment → Wages → Smic →
//! Scenarios → Notes → Assemble → Merge → Persist`
//!
//! Missing inputs never abort a run: they are resolved to documented
//! defaults during anchor extraction. A document that cannot be read or
//! parsed aborts the run before anything is written.

use crate::anchors::Anchors;
use crate::config::{AnchoringMode, ForecastConfig};
use crate::dataset::Dataset;
use crate::error::{ForecastError, Result};
use crate::models::inflation::{InflationForecast, InflationForecaster};
use crate::models::smic::{SmicForecast, SmicForecaster};
use crate::models::unemployment::{UnemploymentForecast, UnemploymentForecaster};
use crate::models::wages::{WageForecast, WageForecaster};
use crate::notes::reading_notes;
use crate::scenarios::{central_scenarios, what_if_scenarios, ScenarioSet, WhatIfScenario};
use crate::simulation::seed_for_date;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stages of a forecast run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    ExtractAnchors,
    Inflation,
    Unemployment,
    Wages,
    Smic,
    Scenarios,
    Notes,
    Assemble,
    Merge,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::ExtractAnchors => "extract-anchors",
            Stage::Inflation => "inflation",
            Stage::Unemployment => "unemployment",
            Stage::Wages => "wages",
            Stage::Smic => "smic",
            Stage::Scenarios => "scenarios",
            Stage::Notes => "notes",
            Stage::Assemble => "assemble",
            Stage::Merge => "merge",
            Stage::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Clock and randomness of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Date the forecast horizon starts from
    pub today: NaiveDate,
    /// Timestamp written into the bundle
    pub generated_at: DateTime<Utc>,
    /// Explicit seed; defaults to `YYYYMMDD` of `today`
    pub seed: Option<u64>,
}

impl RunContext {
    /// Context for a run starting now
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Context for a run at `generated_at`
    pub fn at(generated_at: DateTime<Utc>) -> Self {
        Self {
            today: generated_at.date_naive(),
            generated_at,
            seed: None,
        }
    }

    /// Use an explicit seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Seed of the random generator
    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| seed_for_date(self.today))
    }
}

/// How the bundle was produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Methodology {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulations: Option<usize>,
    pub features: Vec<&'static str>,
}

/// Everything a run produces, written under the output key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastBundle {
    pub generated_at: DateTime<Utc>,
    pub model_version: &'static str,
    pub mode: AnchoringMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_simulations: Option<usize>,
    pub horizon: String,
    pub inflation: InflationForecast,
    pub salaires: WageForecast,
    pub smic: SmicForecast,
    pub chomage: UnemploymentForecast,
    pub scenarios: ScenarioSet,
    pub whatif_scenarios: BTreeMap<&'static str, WhatIfScenario>,
    pub notes_lecture: Vec<String>,
    pub sources: Vec<String>,
    pub methodology: Methodology,
    pub disclaimer: &'static str,
}

/// Runs the forecasting models over a dataset
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: ForecastConfig,
    inflation: InflationForecaster,
    unemployment: UnemploymentForecaster,
    wages: WageForecaster,
    smic: SmicForecaster,
}

impl ForecastPipeline {
    /// Create a new pipeline, validating the configuration
    pub fn new(config: ForecastConfig) -> Result<Self> {
        if config.output_key.trim().is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Output key must not be empty".to_string(),
            ));
        }
        if config.n_simulations == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of simulations must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            inflation: InflationForecaster::new(
                config.mode,
                config.inflation,
                config.horizon_months,
                config.n_simulations,
            )?,
            unemployment: UnemploymentForecaster::new(
                config.mode,
                config.unemployment,
                config.horizon_quarters,
                config.n_simulations,
            )?,
            wages: WageForecaster::new(),
            smic: SmicForecaster::new(config.mode, config.smic.clone())?,
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast from a parsed dataset document
    pub fn run(&self, document: &Value, ctx: &RunContext) -> Result<ForecastBundle> {
        let dataset = Dataset::from_value(document)?;
        self.forecast(&dataset, ctx)
    }

    /// Forecast from a typed dataset
    pub fn forecast(&self, dataset: &Dataset, ctx: &RunContext) -> Result<ForecastBundle> {
        let mode = self.config.mode;
        let mut rng = StdRng::seed_from_u64(ctx.seed());
        info!(%mode, seed = ctx.seed(), today = %ctx.today, "starting forecast run");

        info!(stage = %Stage::ExtractAnchors, "running stage");
        let anchors = Anchors::extract(dataset, ctx.today, self.config.smic.net_to_gross);
        if !anchors.defaults_used.is_empty() {
            info!(
                count = anchors.defaults_used.len(),
                "some anchors were resolved to defaults"
            );
        }

        info!(stage = %Stage::Inflation, model = self.inflation.name(), "running stage");
        let inflation = self.inflation.forecast(&anchors, ctx.today, &mut rng)?;

        info!(stage = %Stage::Unemployment, "running stage");
        let unemployment = self.unemployment.forecast(&anchors, ctx.today, &mut rng)?;

        info!(stage = %Stage::Wages, "running stage");
        let wages = self.wages.forecast(&anchors, &inflation)?;

        info!(stage = %Stage::Smic, "running stage");
        let smic = self.smic.forecast(&anchors, &inflation, ctx.today, &mut rng)?;

        info!(stage = %Stage::Scenarios, "running stage");
        let year = baseline_year(ctx.today);
        let scenarios = central_scenarios(&anchors, &inflation, &unemployment, &wages, &smic, year);
        let whatif_scenarios = what_if_scenarios(&anchors, year);

        info!(stage = %Stage::Notes, "running stage");
        let notes_lecture = reading_notes(&inflation, Some(&smic), &unemployment, &whatif_scenarios);

        info!(stage = %Stage::Assemble, "running stage");
        let n_simulations = mode.is_stochastic().then_some(self.config.n_simulations);

        Ok(ForecastBundle {
            generated_at: ctx.generated_at,
            model_version: mode.model_version(),
            mode,
            n_simulations,
            horizon: format!("{} mois", self.config.horizon_months),
            inflation,
            salaires: wages,
            smic,
            chomage: unemployment,
            scenarios,
            whatif_scenarios,
            notes_lecture,
            sources: sources(mode, self.config.n_simulations),
            methodology: methodology(mode, self.config.n_simulations),
            disclaimer: disclaimer(mode),
        })
    }

    /// Insert `bundle` into `document` under the configured key
    pub fn merge(&self, document: &mut Value, bundle: &ForecastBundle) -> Result<()> {
        info!(stage = %Stage::Merge, key = %self.config.output_key, "running stage");
        let root = document.as_object_mut().ok_or_else(|| {
            ForecastError::Schema("Dataset root must be a JSON object".to_string())
        })?;
        root.insert(self.config.output_key.clone(), serde_json::to_value(bundle)?);
        Ok(())
    }

    /// Load `input`, forecast, and write the augmented document to `output`.
    ///
    /// `output` may be the same path as `input`. Nothing is written when any
    /// stage fails.
    pub fn run_file(&self, input: &Path, output: &Path, ctx: &RunContext) -> Result<ForecastBundle> {
        info!(stage = %Stage::Load, path = %input.display(), "running stage");
        let mut document = load(input)?;

        let bundle = self.run(&document, ctx)?;
        self.merge(&mut document, &bundle)?;

        info!(stage = %Stage::Persist, path = %output.display(), "running stage");
        persist(&document, output)?;

        info!(
            inflation_12m = bundle.inflation.forecast_12m,
            unemployment_end = bundle.chomage.forecast_end,
            smic_increase = ?bundle.smic.january().map(|e| e.increase_pct),
            "forecast run complete"
        );
        Ok(bundle)
    }
}

/// Read and parse a dataset document
pub fn load(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| ForecastError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| ForecastError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `document` to `path` through a sibling temporary file
pub fn persist(document: &Value, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(document)?;

    let tmp = temporary_sibling(path);
    fs::write(&tmp, text).map_err(|e| ForecastError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        ForecastError::io(path, e)
    })?;

    debug!(path = %path.display(), "document written");
    Ok(())
}

/// Year whose institutional projections back the scenarios: the one the
/// 12-month horizon ends in
fn baseline_year(today: NaiveDate) -> i32 {
    today.year() + 1
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "forecast.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn sources(mode: AnchoringMode, n_simulations: usize) -> Vec<String> {
    let model = match mode {
        AnchoringMode::MonteCarlo => format!(
            "Modèle {} ({} simulations)",
            mode.model_version(),
            n_simulations
        ),
        AnchoringMode::InstitutionalInterpolation => {
            format!("Modèle {} - Interpolation et règles légales", mode.model_version())
        }
        AnchoringMode::Freeform => {
            format!("Modèle {} - Tendances historiques", mode.model_version())
        }
    };

    vec![
        "Banque de France - Projections macroéconomiques".to_string(),
        "INSEE - Indices des prix et climat des affaires".to_string(),
        "Code du travail - Articles L3231-4 à L3231-11".to_string(),
        model,
    ]
}

fn methodology(mode: AnchoringMode, n_simulations: usize) -> Methodology {
    match mode {
        AnchoringMode::MonteCarlo => Methodology {
            kind: "Monte Carlo avec mean reversion",
            simulations: Some(n_simulations),
            features: vec![
                "Saisonnalité mensuelle (inflation)",
                "Indicateurs avancés (climat affaires)",
                "Intervalles de confiance probabilistes",
                "Scénarios what-if pré-calculés",
            ],
        },
        AnchoringMode::InstitutionalInterpolation => Methodology {
            kind: "Interpolation vers projections institutionnelles",
            simulations: None,
            features: vec![
                "Ancrage sur les projections Banque de France",
                "Intervalles de confiance à 90%",
                "Règles légales de revalorisation du SMIC",
            ],
        },
        AnchoringMode::Freeform => Methodology {
            kind: "Tendance historique et convergence BCE",
            simulations: None,
            features: vec![
                "Régression sur l'historique annuel",
                "Loi d'Okun pour le chômage",
                "Intervalles de confiance à 95%",
            ],
        },
    }
}

fn disclaimer(mode: AnchoringMode) -> &'static str {
    match mode {
        AnchoringMode::MonteCarlo => "Prévisions probabilistes basées sur simulations Monte Carlo. Les probabilités indiquées reflètent l'incertitude du modèle.",
        AnchoringMode::InstitutionalInterpolation => "Prévisions basées sur les projections Banque de France et les règles légales. Les données institutionnelles font référence.",
        AnchoringMode::Freeform => "Prévisions indicatives extrapolées des tendances historiques. À interpréter avec prudence.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> RunContext {
        let generated_at = DateTime::parse_from_rfc3339("2026-10-18T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        RunContext::at(generated_at)
    }

    #[test]
    fn test_default_seed_is_run_date() {
        assert_eq!(ctx().seed(), 20261018);
        assert_eq!(ctx().with_seed(7).seed(), 7);
    }

    #[test]
    fn test_merge_requires_object_root() {
        let pipeline = ForecastPipeline::new(ForecastConfig::default()).unwrap();
        let bundle = pipeline.run(&json!({}), &ctx()).unwrap();

        let mut document = json!({ "last_updated": "2026-10-01" });
        pipeline.merge(&mut document, &bundle).unwrap();
        assert!(document["previsions_cftc"]["inflation"].is_object());
        assert_eq!(document["last_updated"], "2026-10-01");

        let mut not_object = json!([]);
        assert!(pipeline.merge(&mut not_object, &bundle).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ForecastConfig {
            output_key: " ".to_string(),
            ..ForecastConfig::default()
        };
        assert!(ForecastPipeline::new(config).is_err());

        let config = ForecastConfig {
            horizon_months: 0,
            ..ForecastConfig::default()
        };
        assert!(ForecastPipeline::new(config).is_err());
    }

    #[test]
    fn test_scenarios_use_next_year_projections() {
        let pipeline = ForecastPipeline::new(ForecastConfig::default()).unwrap();
        let document = json!({
            "previsions": {
                "banque_de_france": {
                    "pib_croissance": { "2026": 0.9, "2027": 1.2 },
                    "inflation_ipch": { "2026": 1.0, "2027": 1.6 },
                    "taux_chomage": { "2026": 7.8, "2027": 7.4 }
                }
            }
        });
        let bundle = pipeline.run(&document, &ctx()).unwrap();

        assert_eq!(baseline_year(ctx().today), 2027);
        assert_eq!(bundle.scenarios.central.pib, 1.2);
        let recession = &bundle.whatif_scenarios["recession_ue"];
        assert_eq!(recession.impact.inflation_12m, 1.2);
        assert_eq!(recession.impact.chomage_q4, 7.9);
    }

    #[test]
    fn test_temporary_sibling() {
        let tmp = temporary_sibling(Path::new("/data/public/data.json"));
        assert_eq!(tmp, PathBuf::from("/data/public/data.json.tmp"));
    }
}
