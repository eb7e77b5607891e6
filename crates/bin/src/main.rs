//! Albany CLI binary.
//!
//! Builds the regime-switching model or calibrates the factor model and
//! prints the resulting parameters.

mod config;

use albany::model::{CalibratorConfig, FactorCalibrator, RegimeModel, RegimeModelConfig};
use albany::output::{CalibrationSummary, OutputFormat, RegimeSummary, Report};
use clap::{Parser, Subcommand};
use config::CalibrationOverrides;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "albany")]
#[command(about = "Albany: regime and factor model parameters", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the regime-switching model parameters
    Regime {
        /// TOML file overriding the default model
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Calibrate the VAR(1) factor model from factor and return tables
    Calibrate {
        /// TOML file overriding the default calibration settings
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: CalibrationOverrides,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_logging(verbose: bool) {
    let default = if verbose { "albany=debug" } else { "albany=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let report = match cli.command {
        Commands::Regime { config, format } => regime_report(config, format)?,
        Commands::Calibrate {
            config,
            overrides,
            format,
        } => calibration_report(config, overrides, format)?,
    };
    println!("{report}");
    Ok(())
}

fn regime_report(
    path: Option<PathBuf>,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let config: RegimeModelConfig = config::load(path.as_deref())?;
    let model = RegimeModel::new(config)?;
    tracing::debug!(
        regimes = model.regimes(),
        assets = model.assets(),
        "built regime model"
    );
    Ok(RegimeSummary::from_model(&model).render(format)?)
}

fn calibration_report(
    path: Option<PathBuf>,
    overrides: CalibrationOverrides,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut config: CalibratorConfig = config::load(path.as_deref())?;
    overrides.apply(&mut config);

    tracing::info!(
        factors = config.factor_count(),
        assets = config.asset_count(),
        begin = %config.begin_date,
        end = %config.end_date,
        "calibrating factor model"
    );
    let calibrator = FactorCalibrator::from_config(&config)?;
    Ok(CalibrationSummary::from_calibrator(&calibrator).render(format)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fmt::Write as _;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_calibrate_flags() {
        let cli = Cli::try_parse_from([
            "albany",
            "calibrate",
            "--factors",
            "Mkt-RF,SMB",
            "--begin",
            "2000-01-01",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Calibrate { format, .. } = cli.command else {
            panic!("expected calibrate");
        };
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["albany", "regime", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_regime_report_defaults() {
        let text = regime_report(None, OutputFormat::Text).unwrap();
        assert!(text.contains("Regimes (M):"));
        assert!(text.contains("Covariance, regime 0"));
    }

    #[test]
    fn test_regime_report_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("regime.toml");
        std::fs::write(&path, "transition = [[0.5, 0.6], [0.4, 0.6]]\n").unwrap();

        assert!(regime_report(Some(path), OutputFormat::Text).is_err());
    }

    #[test]
    fn test_calibration_report_from_files() {
        let dir = TempDir::new().unwrap();
        let factor_path = dir.path().join("factors.csv");
        let return_path = dir.path().join("returns.csv");

        let mut factors = String::from("index,F1,RF\n");
        let mut returns = String::from("index\tA1\n");
        for t in 0..12 {
            let f = 2.0 * 0.8_f64.powi(t) + 0.1 * f64::from(t % 3);
            writeln!(factors, "2001{:02},{f},0.25", t + 1).unwrap();
            writeln!(returns, "2001{:02}\t{}", t + 1, 0.5 + 1.5 * f).unwrap();
        }
        std::fs::write(&factor_path, factors).unwrap();
        std::fs::write(&return_path, returns).unwrap();

        let config_path = dir.path().join("calibrate.toml");
        let toml = format!(
            "factors = [\"F1\"]\nfactor_path = {:?}\nreturn_path = {:?}\n",
            factor_path.display().to_string(),
            return_path.display().to_string(),
        );
        std::fs::write(&config_path, toml).unwrap();

        let cli = Cli::try_parse_from([
            "albany",
            "calibrate",
            "--assets",
            "A1",
            "--begin",
            "2001-01-01",
            "--end",
            "2001-12-31",
        ])
        .unwrap();
        let Commands::Calibrate { overrides, .. } = cli.command else {
            panic!("expected calibrate");
        };
        let json = calibration_report(Some(config_path), overrides, OutputFormat::Json).unwrap();
        assert!(json.contains("\"observations\": 12"));
        assert!(json.contains("\"A1\""));
    }
}
