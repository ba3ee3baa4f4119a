//! Check command implementation
//!
//! Validates the effective configuration and, optionally, a market data file.

use std::path::Path;
use tracing::info;

use super::calibrate::load_market_points;
use crate::config::{CliConfig, ENV_KEYS};
use crate::Result;

/// Run the check command
pub fn run(config: &CliConfig, market_data: Option<&Path>) -> Result<()> {
    info!("Checking configuration...");
    config.validate()?;

    for key in ENV_KEYS {
        if std::env::var(key).is_ok() {
            info!(key, "Environment override present");
        }
    }

    let summary = summarise(config)?;
    println!("{}", summary);

    if let Some(path) = market_data {
        let points = load_market_points(path)?;
        info!(points = points.len(), "Market data OK: {}", path.display());
    }

    info!("Configuration OK");
    Ok(())
}

/// Effective configuration as pretty JSON
pub fn summarise(config: &CliConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
