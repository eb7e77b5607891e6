//! Configuration files and command-line overrides.

use albany::CalibratorConfig;
use chrono::NaiveDate;
use clap::Args;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected structure.
    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Read `path` as TOML, or fall back to the defaults when no file is given.
///
/// Keys missing from the file keep their default values.
pub(crate) fn load<T>(path: Option<&Path>) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        return Ok(T::default());
    };

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&text).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Flags that override individual calibration settings.
#[derive(Debug, Default, Args)]
pub(crate) struct CalibrationOverrides {
    /// Factor columns, comma separated
    #[arg(long, value_delimiter = ',')]
    factors: Option<Vec<String>>,

    /// Asset columns, comma separated
    #[arg(long, value_delimiter = ',')]
    assets: Option<Vec<String>>,

    /// First date of the sample (YYYY-MM-DD)
    #[arg(long)]
    begin: Option<NaiveDate>,

    /// Last date of the sample (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Factor table path
    #[arg(long)]
    factor_path: Option<PathBuf>,

    /// Return table path
    #[arg(long)]
    return_path: Option<PathBuf>,
}

impl CalibrationOverrides {
    /// Overwrite every field of `config` that was given on the command line.
    pub(crate) fn apply(self, config: &mut CalibratorConfig) {
        if let Some(factors) = self.factors {
            config.factors = factors;
        }
        if let Some(assets) = self.assets {
            config.assets = assets;
        }
        if let Some(begin) = self.begin {
            config.begin_date = begin;
        }
        if let Some(end) = self.end {
            config.end_date = end;
        }
        if let Some(path) = self.factor_path {
            config.factor_path = path;
        }
        if let Some(path) = self.return_path {
            config.return_path = path;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use albany::RegimeModelConfig;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config: CalibratorConfig = load(None).unwrap();
        assert_eq!(config.factor_count(), 6);
        assert_eq!(config.factor_path, PathBuf::from("./data/six_factors.csv"));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("regime.toml");
        std::fs::write(&path, "risk_free_rate = 1.01\n").unwrap();

        let config: RegimeModelConfig = load(Some(&path)).unwrap();
        assert_eq!(config.risk_free_rate, 1.01);
        assert_eq!(config.regimes, 2);
        assert_eq!(config.assets, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load::<CalibratorConfig>(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "factors = 3\n").unwrap();
        let err = load::<CalibratorConfig>(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let mut config = CalibratorConfig::default();
        let overrides = CalibrationOverrides {
            factors: Some(vec!["Mkt-RF".to_string()]),
            end: NaiveDate::from_ymd_opt(2000, 12, 31),
            ..Default::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.factors, vec!["Mkt-RF".to_string()]);
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2000, 12, 31).unwrap());
        assert_eq!(config.asset_count(), 10);
        assert_eq!(config.begin_date, NaiveDate::from_ymd_opt(1964, 1, 1).unwrap());
    }
}
