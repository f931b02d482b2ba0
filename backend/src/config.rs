//! Configuration management for the Oud Grading Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides: `OUD_` prefix, `__` between nested keys
//!    (`OUD_ENVIRONMENT`, `OUD_LOGGING__JSON=true`, `OUD_LOGGING__FILTER=debug`)

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{CriteriaTable, GradingCriterion};

use crate::error::{AppError, AppResult};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Grading engine configuration
    #[serde(default)]
    pub grading: GradingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directives, overridden by `RUST_LOG`
    pub filter: String,

    /// Emit JSON log lines instead of human-readable output
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GradingConfig {
    /// Criteria table override; the built-in table is used when absent
    #[serde(default)]
    pub criteria: Option<Vec<GradingCriterion>>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("OUD_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("logging.filter", "oud_grader=info,oud_grading_backend=info")?
            .set_default("logging.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (OUD_ prefix)
            .add_source(environment_overrides())
            .build()?;

        config.try_deserialize()
    }

    /// Criteria table to start the segregation service with
    pub fn criteria_table(&self) -> AppResult<CriteriaTable> {
        match &self.grading.criteria {
            Some(entries) => CriteriaTable::new(entries.clone())
                .map_err(|e| AppError::Configuration(e.to_string())),
            None => Ok(CriteriaTable::default()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            logging: LoggingConfig::default(),
            grading: GradingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "oud_grader=info,oud_grading_backend=info".to_string(),
            json: false,
        }
    }
}

/// `OUD_LOGGING__JSON` -> `logging.json`
fn environment_overrides() -> Environment {
    Environment::with_prefix("OUD")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::GradeKind;

    #[test]
    fn test_default_config_uses_builtin_criteria() {
        let config = Config::default();
        assert_eq!(config.criteria_table().unwrap(), CriteriaTable::default());
    }

    #[test]
    fn test_criteria_override() {
        let mut entries = CriteriaTable::default().entries().to_vec();
        entries[0].min_score = Decimal::from(95);

        let mut config = Config::default();
        config.grading.criteria = Some(entries);

        let table = config.criteria_table().unwrap();
        assert_eq!(table.threshold_for(GradeKind::Royal), Some(Decimal::from(95)));
    }

    #[test]
    fn test_invalid_criteria_is_configuration_error() {
        let mut config = Config::default();
        config.grading.criteria = Some(Vec::new());
        assert!(matches!(
            config.criteria_table(),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_from_toml_source() {
        let toml = r#"
            environment = "test"

            [logging]
            filter = "debug"
            json = true

            [[grading.criteria]]
            grade = "royal"
            min_score = 92
            price_range = { min = 200, max = 320 }

            [[grading.criteria]]
            grade = "premium"
            min_score = 78
            price_range = { min = 90, max = 160 }

            [[grading.criteria]]
            grade = "super"
            min_score = 62
            price_range = { min = 45, max = 85 }

            [[grading.criteria]]
            grade = "regular"
            min_score = 41
            price_range = { min = 15, max = 40 }
        "#;

        let config: Config = config::Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(config.logging.json);
        let table = config.criteria_table().unwrap();
        assert_eq!(table.price_for(GradeKind::Royal), Decimal::from(260));
    }

    #[test]
    fn test_environment_variable_names() {
        let vars = config::Map::from([
            ("OUD_ENVIRONMENT".to_string(), "production".to_string()),
            ("OUD_LOGGING__JSON".to_string(), "true".to_string()),
            ("OUD_LOGGING__FILTER".to_string(), "debug".to_string()),
        ]);

        let config: Config = config::Config::builder()
            .add_source(environment_overrides().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.environment, "production");
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "debug");
    }
}
