use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::scoring::{RuleSourceError, RuleTable};
use crate::submissions::DEFAULT_SECONDARY_THRESHOLD;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub scoring: ScoringConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let rules_path = env::var("APP_RULES_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let secondary_threshold = match env::var("APP_SECONDARY_THRESHOLD") {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or(ConfigError::InvalidThreshold { value: raw })?,
            Err(_) => DEFAULT_SECONDARY_THRESHOLD,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            scoring: ScoringConfig {
                rules_path,
                secondary_threshold,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Where the rule table comes from and how results are presented.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Rule table override; the bundled table is used when unset.
    pub rules_path: Option<PathBuf>,
    pub secondary_threshold: f64,
}

impl ScoringConfig {
    /// Loads and validates the configured rule table. Run once at startup.
    pub fn rule_table(&self) -> Result<Arc<RuleTable>, RuleSourceError> {
        match &self.rules_path {
            Some(path) => RuleTable::from_path(path).map(Arc::new),
            None => RuleTable::bundled()
                .map(|table| Arc::new(table.clone()))
                .map_err(|err| RuleSourceError::Bundled(err.to_string())),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidThreshold { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidThreshold { value } => write!(
                f,
                "APP_SECONDARY_THRESHOLD must be a finite number, got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
