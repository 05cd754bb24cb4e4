use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::scorer::CostRates;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub greenhouse_api_key: String,
    pub openai_api_key: String,
    pub output_dir: PathBuf,
    pub cost_rates: CostRates,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = CostRates::default();

        Ok(Config {
            greenhouse_api_key: require_env("GREENHOUSE_API_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            output_dir: std::env::var("HIRESCOPE_OUTPUT_DIR")
                .unwrap_or_else(|_| "analysis_results".to_string())
                .into(),
            cost_rates: CostRates {
                input_per_1k: env_rate("OPENAI_INPUT_COST_PER_1K", defaults.input_per_1k)?,
                output_per_1k: env_rate("OPENAI_OUTPUT_COST_PER_1K", defaults.output_per_1k)?,
                reasoning_per_1k: env_rate(
                    "OPENAI_REASONING_COST_PER_1K",
                    defaults.reasoning_per_1k,
                )?,
            },
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_rate(key: &str, default: f64) -> Result<f64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("'{key}' must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
