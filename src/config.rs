//! TOML configuration.
//!
//! Every section is optional; an empty file gives the defaults.
//!
//! ```toml
//! [matrix]
//! identifier_column = "Processo"
//!
//! [transformity]
//! "Water" = 41000.0
//! "Diesel" = 66000.0
//!
//! [logging]
//! filter = "emergy=debug"
//! ```

use crate::calculator::EmergyCalculator;
use crate::matrix::{MatrixManager, DEFAULT_IDENTIFIER_COLUMN};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub matrix: MatrixConfig,
    /// Overrides merged over the default transformities
    pub transformity: BTreeMap<String, f64>,
    pub logging: LoggingConfig,
}

/// Matrix import settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatrixConfig {
    /// Column holding the process identifiers
    pub identifier_column: String,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        MatrixConfig { identifier_column: DEFAULT_IDENTIFIER_COLUMN.to_string() }
    }
}

/// Logging settings for the binary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { filter: "info".to_string() }
    }
}

impl Config {
    /// Reads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses and validates TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.matrix.identifier_column.trim().is_empty() {
            return Err(ConfigError::Invalid("matrix.identifier_column must not be empty".into()));
        }
        if let Some((name, _)) = self.transformity.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("transformity '{name}' is not finite")));
        }
        Ok(())
    }

    /// Matrix manager using the configured identifier column.
    pub fn matrix_manager(&self) -> MatrixManager {
        MatrixManager::with_identifier_column(self.matrix.identifier_column.clone())
    }

    /// Calculator seeded with the defaults, the configured overrides and
    /// then `extra`, later entries winning.
    pub fn calculator<I>(&self, extra: I) -> EmergyCalculator
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut calculator = EmergyCalculator::new();
        calculator.set_transformity_factors(self.transformity.clone().into_iter().chain(extra));
        calculator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.matrix.identifier_column, "Process");
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.matrix_manager().identifier_column(), "Process");
    }

    #[test]
    fn test_transformity_overrides_merge_with_defaults() {
        let config = Config::parse(
            r#"
            [transformity]
            "Water" = 5.0
            "Diesel" = 66000.0
            "#,
        )
        .unwrap();

        let calculator = config.calculator(std::iter::empty());
        let table = calculator.transformity();
        assert_eq!(table.get("Water"), Some(5.0));
        assert_eq!(table.get("Diesel"), Some(66000.0));
        assert_eq!(table.get("Wind Energy"), Some(1500.0));
    }

    #[test]
    fn test_extra_factors_win_over_config() {
        let config = Config::parse("[transformity]\nA = 5.0\nB = 7.0\n").unwrap();
        let calculator = config.calculator([("A".to_string(), 2.0)]);
        assert_eq!(calculator.transformity().get("A"), Some(2.0));
        assert_eq!(calculator.transformity().get("B"), Some(7.0));
    }

    #[test]
    fn test_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "[matrix]\nidentifier_column = \"Processo\"\n[logging]\nfilter = \"debug\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.matrix.identifier_column, "Processo");
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_rejects_empty_identifier() {
        let err = Config::parse("[matrix]\nidentifier_column = \" \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = Config::parse("[matrix]\nidentifer_column = \"Process\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/nonexistent/emergy.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
    }
}
