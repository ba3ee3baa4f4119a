//! CLI error types

use smile_models::calibration::CalibrationError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Bad command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded or validated
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Calibration rejected its inputs
    #[error("Calibration failed: {0}")]
    Calibration(#[from] CalibrationError),

    /// Market data file could not be parsed
    #[error("Market data error: {0}")]
    MarketData(#[from] csv::Error),

    /// Report could not be serialised
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;
