//! CLI configuration management
//!
//! Settings come from a TOML file, `SMILE_*` environment variables and
//! command-line flags, in increasing order of precedence.

use serde::{Deserialize, Serialize};
use smile_models::calibration::{CalibrationError, ZabrCalibrationConfig};
use smile_models::models::zabr::ZabrEvaluation;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Environment variables read by [`CliConfig::apply_env`]
pub const ENV_KEYS: [&str; 9] = [
    "SMILE_LOG_LEVEL",
    "SMILE_EVALUATION",
    "SMILE_VEGA_WEIGHTED",
    "SMILE_ERROR_ACCEPT",
    "SMILE_USE_MAX_ERROR",
    "SMILE_MAX_RESTARTS",
    "SMILE_MAX_ITERATIONS",
    "SMILE_MAX_DURATION_SECS",
    "SMILE_PARALLEL",
];

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),

    #[error("Invalid calibration settings: {0}")]
    Calibration(#[from] CalibrationError),
}

/// Log levels accepted by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Full CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level used when `RUST_LOG` is unset
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Calibration settings
    pub calibration: ZabrCalibrationConfig,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: CliConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Override settings from environment variables.
    ///
    /// `lookup` returns the value of a variable if it is set.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("SMILE_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }

        let calibration = &mut self.calibration;
        if let Some(evaluation) = lookup("SMILE_EVALUATION") {
            calibration.evaluation = parse_env("SMILE_EVALUATION", &evaluation)?;
        }
        if let Some(flag) = lookup("SMILE_VEGA_WEIGHTED") {
            calibration.vega_weighted = parse_bool("SMILE_VEGA_WEIGHTED", &flag)?;
        }
        if let Some(accept) = lookup("SMILE_ERROR_ACCEPT") {
            calibration.error_accept = parse_env("SMILE_ERROR_ACCEPT", &accept)?;
        }
        if let Some(flag) = lookup("SMILE_USE_MAX_ERROR") {
            calibration.use_max_error = parse_bool("SMILE_USE_MAX_ERROR", &flag)?;
        }
        if let Some(restarts) = lookup("SMILE_MAX_RESTARTS") {
            calibration.max_restarts = parse_env("SMILE_MAX_RESTARTS", &restarts)?;
        }
        if let Some(iterations) = lookup("SMILE_MAX_ITERATIONS") {
            calibration.end_criteria.max_iterations =
                parse_env("SMILE_MAX_ITERATIONS", &iterations)?;
        }
        if let Some(secs) = lookup("SMILE_MAX_DURATION_SECS") {
            calibration.max_duration_secs = Some(parse_env("SMILE_MAX_DURATION_SECS", &secs)?);
        }
        if let Some(flag) = lookup("SMILE_PARALLEL") {
            calibration.parallel = parse_bool("SMILE_PARALLEL", &flag)?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        }

        let calibration = &mut self.calibration;
        if let Some(evaluation) = cli.evaluation {
            calibration.evaluation = evaluation;
        }
        if cli.vega_weighted {
            calibration.vega_weighted = true;
        }
        if cli.use_max_error {
            calibration.use_max_error = true;
        }
        if let Some(accept) = cli.error_accept {
            calibration.error_accept = accept;
        }
        if let Some(restarts) = cli.max_restarts {
            calibration.max_restarts = restarts;
        }
        if let Some(secs) = cli.max_duration_secs {
            calibration.max_duration_secs = Some(secs);
        }
        if cli.sequential {
            calibration.parallel = false;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calibration.validate()?;
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{}={} could not be parsed", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::EnvError(format!(
            "{}={} is not a boolean",
            key, value
        ))),
    }
}

/// Configuration overrides taken from the command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
    /// Evaluation mode override
    pub evaluation: Option<ZabrEvaluation>,
    /// Enable vega weighting
    pub vega_weighted: bool,
    /// Accept on max error instead of RMS error
    pub use_max_error: bool,
    /// Acceptance threshold override
    pub error_accept: Option<f64>,
    /// Restart budget override
    pub max_restarts: Option<usize>,
    /// Wall-clock budget override
    pub max_duration_secs: Option<f64>,
    /// Run restarts on the calling thread only
    pub sequential: bool,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig, ConfigError> {
    build_config_with_env(cli, |key| std::env::var(key).ok())
}

/// [`build_config`] with an explicit environment lookup
pub fn build_config_with_env<F>(cli: &CliArgs, lookup: F) -> Result<CliConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };

    config.apply_env(lookup)?;
    config.merge_with_cli(cli)?;

    // Final validation
    config.validate()?;
    Ok(config)
}
