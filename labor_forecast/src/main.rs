//! Forecast the dashboard dataset in place.
//!
//! Usage: `labor-forecast [INPUT] [OUTPUT]`
//!
//! INPUT defaults to `public/data.json`; OUTPUT defaults to INPUT.

use anyhow::{Context, Result};
use labor_forecast::{ForecastConfig, ForecastPipeline, RunContext};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_INPUT: &str = "public/data.json";
const DEFAULT_LOG_FILTER: &str = "info";

/// `RUST_LOG` when set and valid, `info` otherwise
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(log_filter()).init();

    let mut args = std::env::args_os().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
    let output = args.next().map(PathBuf::from).unwrap_or_else(|| input.clone());

    let config = ForecastConfig::default();
    info!(
        version = labor_forecast::VERSION,
        model = config.mode.model_version(),
        input = %input.display(),
        output = %output.display(),
        "labor-forecast starting"
    );

    let pipeline = ForecastPipeline::new(config).context("Invalid forecast configuration")?;
    let bundle = pipeline
        .run_file(&input, &output, &RunContext::now())
        .with_context(|| format!("Forecast run failed for {}", input.display()))?;

    for note in &bundle.notes_lecture {
        info!("{}", note);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_respects_rust_log() {
        std::env::set_var("RUST_LOG", "labor_forecast=debug");
        assert_eq!(log_filter().to_string(), "labor_forecast=debug");

        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter().to_string(), DEFAULT_LOG_FILTER);
    }
}
