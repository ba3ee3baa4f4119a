//! Calibrate command implementation
//!
//! Reads a smile from CSV (`strike,volatility` columns), calibrates ZABR
//! parameters and writes a JSON report.

use serde::Serialize;
use smile_models::calibration::{
    validate_points, FitResult, MarketPoint, ZabrGuess, ZabrInterpolation, ZabrParamIndex,
};
use smile_models::models::zabr::{MarketContext, ZabrEvaluation};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::CliConfig;
use crate::{CliError, Result};

/// Inputs of the calibrate command
#[derive(Debug, Clone, Default)]
pub struct CalibrateOptions {
    /// CSV file with `strike` and `volatility` columns
    pub market_data: PathBuf,
    /// Forward of the underlying
    pub forward: f64,
    /// Time to expiry in years
    pub expiry: f64,
    /// Initial guesses in alpha, beta, nu, rho, gamma order
    pub values: [Option<f64>; 5],
    /// Names of parameters held at their given value
    pub fix: Vec<String>,
    /// Report path; stdout when absent
    pub output: Option<PathBuf>,
}

/// Fitted volatility at one market strike
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FittedPoint {
    pub strike: f64,
    pub market: f64,
    pub model: f64,
    pub weight: f64,
}

/// JSON report written by the command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationReport {
    pub expiry: f64,
    pub forward: f64,
    pub evaluation: ZabrEvaluation,
    pub vega_weighted: bool,
    pub result: FitResult,
    pub points: Vec<FittedPoint>,
}

/// Run the calibrate command
pub fn run(options: &CalibrateOptions, config: &CliConfig) -> Result<()> {
    info!("Starting calibration...");
    info!("  Market data: {}", options.market_data.display());
    info!("  Evaluation: {}", config.calibration.evaluation);

    let points = load_market_points(&options.market_data)?;
    let context = MarketContext::new(options.expiry, options.forward)?;
    let guess = build_guess(&options.values, &options.fix)?;

    let report = calibrate(points, context, guess, config)?;
    info!(
        rms_error = report.result.rms_error,
        max_error = report.result.max_error,
        status = %report.result.status,
        "Calibration complete"
    );

    let json = serde_json::to_string_pretty(&report)?;
    match &options.output {
        Some(path) => {
            info!("Writing report to: {}", path.display());
            std::fs::write(path, json)?;
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Calibrate `points` and collect the report
pub fn calibrate(
    points: Vec<MarketPoint>,
    context: MarketContext,
    guess: ZabrGuess,
    config: &CliConfig,
) -> Result<CalibrationReport> {
    let smile = ZabrInterpolation::new(points, context, guess, config.calibration.clone())?;

    let fitted = smile
        .points()
        .iter()
        .zip(smile.weights())
        .map(|(point, &weight)| -> Result<FittedPoint> {
            Ok(FittedPoint {
                strike: point.strike,
                market: point.volatility,
                model: smile.volatility(point.strike)?,
                weight,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CalibrationReport {
        expiry: smile.expiry(),
        forward: smile.forward(),
        evaluation: config.calibration.evaluation,
        vega_weighted: config.calibration.vega_weighted,
        result: *smile.result(),
        points: fitted,
    })
}

/// Read and validate market points from a CSV file
pub fn load_market_points(path: &Path) -> Result<Vec<MarketPoint>> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    read_market_points(std::fs::File::open(path)?)
}

/// Read and validate market points from CSV with a header row
pub fn read_market_points<R: Read>(reader: R) -> Result<Vec<MarketPoint>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let points = reader
        .deserialize::<MarketPoint>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    validate_points(&points)?;
    Ok(points)
}

/// Build the initial guess from per-parameter values and fixed names.
///
/// A fixed parameter must also be given a value.
pub fn build_guess(values: &[Option<f64>; 5], fix: &[String]) -> Result<ZabrGuess> {
    let mut guess = ZabrGuess::default();
    for (index, value) in values.iter().enumerate() {
        if let Some(value) = value {
            guess = guess.with_free(index, *value);
        }
    }

    for name in fix {
        let index = ZabrParamIndex::NAMES
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "unknown parameter '{}'. Supported: {}",
                    name,
                    ZabrParamIndex::NAMES.join(", ")
                ))
            })?;
        let value = values[index].ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "--fix {0} needs a value, pass --{0} <value>",
                ZabrParamIndex::name(index)
            ))
        })?;
        guess = guess.with_fixed(index, value);
    }

    guess.resolve()?;
    Ok(guess)
}
