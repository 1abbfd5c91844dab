use std::env;
use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::settlement::SettlementPolicy;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8000;
const CONFIG_DIR: &str = "config";
const DEFAULT_TEST_DELAY_MS: u64 = 1_000;

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL (SQLite by default, Postgres supported)
    pub database_url: String,

    /// Host to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Runtime environment: "development" or "production"
    pub environment: String,

    /// Log level: trace, debug, info, warn, error
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow any origin even outside development (explicit override)
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// Create tables at startup if they do not exist
    #[serde(default = "default_true")]
    pub auto_migrate: bool,

    /// Seed the test merchant at startup
    #[serde(default = "default_true")]
    pub seed_test_data: bool,

    /// Deterministic settlement: fixed delay and outcome instead of the
    /// randomized simulation. Intended for tests and local development.
    #[serde(default)]
    pub settlement_test_mode: bool,

    /// Fixed settlement delay in milliseconds (deterministic mode only)
    #[serde(default = "default_test_delay_ms")]
    pub settlement_test_delay_ms: u64,

    /// Fixed settlement outcome (deterministic mode only)
    #[serde(default = "default_true")]
    pub settlement_test_outcome: bool,
}

fn default_true() -> bool {
    true
}

fn default_test_delay_ms() -> u64 {
    DEFAULT_TEST_DELAY_MS
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
            || self.environment.eq_ignore_ascii_case("dev")
    }

    /// Permissive CORS is acceptable in development or behind the explicit
    /// override flag; production must configure origins.
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// The settlement policy the payment engine runs with.
    pub fn settlement_policy(&self) -> SettlementPolicy {
        if self.settlement_test_mode {
            SettlementPolicy::Deterministic {
                delay: Duration::from_millis(self.settlement_test_delay_ms),
                success: self.settlement_test_outcome,
            }
        } else {
            SettlementPolicy::Randomized
        }
    }

    /// Constraints that cut across fields and so cannot be expressed as
    /// per-field `validator` attributes.
    pub fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        if !self.is_development()
            && !self.cors_allow_any_origin
            && self
                .cors_allowed_origins
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .is_none()
        {
            let mut errors = ValidationErrors::new();
            errors.add(
                "cors_allowed_origins",
                ValidationError::new("cors_origins_required_outside_development"),
            );
            return Err(errors);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over the configured
/// level when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("paysim_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration.
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. `config/default.toml`
/// 3. `config/{env}.toml` selected via `RUN_ENV`/`APP_ENV`
/// 4. Environment variables (`APP__*`)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://paysim.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite://paysim.db?mode=memory".into(),
            host: "127.0.0.1".into(),
            port: 8000,
            environment: "production".into(),
            log_level: "info".into(),
            log_json: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            auto_migrate: true,
            seed_test_data: true,
            settlement_test_mode: false,
            settlement_test_delay_ms: DEFAULT_TEST_DELAY_MS,
            settlement_test_outcome: true,
        }
    }

    #[test]
    fn production_requires_cors_origins() {
        let cfg = base_config();
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn production_allows_override_flag() {
        let mut cfg = base_config();
        cfg.cors_allow_any_origin = true;
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn development_is_permissive() {
        let mut cfg = base_config();
        cfg.environment = "development".into();
        assert!(cfg.validate_additional_constraints().is_ok());
        assert!(cfg.should_allow_permissive_cors());
    }

    #[test]
    fn test_mode_yields_deterministic_policy() {
        let mut cfg = base_config();
        cfg.settlement_test_mode = true;
        cfg.settlement_test_delay_ms = 5;
        cfg.settlement_test_outcome = false;
        match cfg.settlement_policy() {
            SettlementPolicy::Deterministic { delay, success } => {
                assert_eq!(delay, Duration::from_millis(5));
                assert!(!success);
            }
            SettlementPolicy::Randomized => panic!("expected deterministic policy"),
        }
    }

    #[test]
    fn default_policy_is_randomized() {
        let cfg = base_config();
        assert!(matches!(
            cfg.settlement_policy(),
            SettlementPolicy::Randomized
        ));
    }
}
