// src/config/mod.rs
mod models;

pub use models::Config;

use anyhow::{Context, Result};

/// Load configuration from the process environment.
///
/// Recognized variables: `HOST`, `PORT`, `API_TOKEN`, `OLLAMA_INSTANCES`,
/// `DEBUG`, `METRICS_ENABLED`, `METRICS_PORT`, `METRICS_PATH`. Everything
/// has a default; an empty environment yields a working dev configuration.
pub fn load_config() -> Result<Config> {
    let raw = ::config::Config::builder()
        .add_source(::config::Environment::default().try_parsing(true))
        .build()
        .context("Failed to read environment")?;

    let config: Config = raw
        .try_deserialize()
        .context("Failed to parse configuration from environment")?;

    config.validate()?;
    Ok(config)
}
