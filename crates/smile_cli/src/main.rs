//! ZABR smile calibration CLI
//!
//! # Commands
//!
//! - `smile calibrate --market-data <csv> --forward <F> --expiry <T>` - Fit a smile
//! - `smile check` - Validate the effective configuration
//!
//! Settings are read from `--config <toml>`, then `SMILE_*` environment
//! variables, then command-line flags. `RUST_LOG` overrides the log level.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use smile_models::models::zabr::ZabrEvaluation;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use commands::calibrate::CalibrateOptions;
use config::{build_config, CliArgs, LogLevel};

/// ZABR smile calibration CLI
#[derive(Parser)]
#[command(name = "smile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true, env = "SMILE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(flatten)]
    calibration: CalibrationFlags,

    #[command(subcommand)]
    command: Commands,
}

/// Calibration setting overrides
#[derive(Args)]
struct CalibrationFlags {
    /// Evaluation mode (short-maturity-lognormal, short-maturity-normal, hagan-lognormal)
    #[arg(long, global = true)]
    evaluation: Option<ZabrEvaluation>,

    /// Weight market points by vega
    #[arg(long, global = true)]
    vega_weighted: bool,

    /// Accept on the max error instead of the RMS error
    #[arg(long, global = true)]
    use_max_error: bool,

    /// Stop restarting once the error is at or below this
    #[arg(long, global = true)]
    error_accept: Option<f64>,

    /// Maximum number of restarts
    #[arg(long, global = true)]
    max_restarts: Option<usize>,

    /// Wall-clock budget in seconds
    #[arg(long, global = true)]
    max_duration: Option<f64>,

    /// Run restarts sequentially
    #[arg(long, global = true)]
    sequential: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calibrate ZABR parameters to a market smile
    Calibrate {
        /// CSV file with strike and volatility columns
        #[arg(short, long)]
        market_data: PathBuf,

        /// Forward of the underlying
        #[arg(short, long)]
        forward: f64,

        /// Time to expiry in years
        #[arg(short, long)]
        expiry: f64,

        /// Initial alpha
        #[arg(long)]
        alpha: Option<f64>,

        /// Initial beta
        #[arg(long)]
        beta: Option<f64>,

        /// Initial nu
        #[arg(long)]
        nu: Option<f64>,

        /// Initial rho
        #[arg(long)]
        rho: Option<f64>,

        /// Initial gamma
        #[arg(long)]
        gamma: Option<f64>,

        /// Parameters to hold fixed (comma separated, e.g. beta,gamma)
        #[arg(long, value_delimiter = ',')]
        fix: Vec<String>,

        /// Output file for the JSON report (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the configuration and optionally a market data file
    Check {
        /// CSV file to validate
        #[arg(short, long)]
        market_data: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config_file: cli.config.clone(),
        log_level: if cli.verbose {
            Some(LogLevel::Debug.to_string())
        } else {
            cli.log_level.clone()
        },
        evaluation: cli.calibration.evaluation,
        vega_weighted: cli.calibration.vega_weighted,
        use_max_error: cli.calibration.use_max_error,
        error_accept: cli.calibration.error_accept,
        max_restarts: cli.calibration.max_restarts,
        max_duration_secs: cli.calibration.max_duration,
        sequential: cli.calibration.sequential,
    };
    let config = build_config(&args).context("failed to load configuration")?;

    // Initialise tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }
    debug!(?config, "Effective configuration");

    match cli.command {
        Commands::Calibrate {
            market_data,
            forward,
            expiry,
            alpha,
            beta,
            nu,
            rho,
            gamma,
            fix,
            output,
        } => {
            let options = CalibrateOptions {
                market_data,
                forward,
                expiry,
                values: [alpha, beta, nu, rho, gamma],
                fix,
                output,
            };
            commands::calibrate::run(&options, &config).context("calibration failed")?;
        }
        Commands::Check { market_data } => {
            commands::check::run(&config, market_data.as_deref()).context("check failed")?;
        }
    }
    Ok(())
}
