//! # Configuration
//!
//! Process configuration assembled from layered sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. Optional `shipquote.toml` in the working directory, or the file given
//!    with `--config`
//! 3. Environment variables prefixed with `SHIPQUOTE_`, nested with `__`
//!    (`SHIPQUOTE_CARRIER__TIMEOUT_MS=5000`)
//!
//! A `.env` file, when present, is loaded into the environment first.

use crate::application::services::{CircuitBreakerConfig, OrchestratorConfig};
use crate::domain::services::BillingCalculator;
use crate::infrastructure::carriers::FrenetConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "shipquote";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SHIPQUOTE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Values were read but are not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Base URL of the frontend serving labels.
    pub frontend_url: String,
    /// Exposes the carrier connectivity probe endpoint.
    pub enable_carrier_probe: bool,
}

/// Carrier call policy and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CarrierConfig {
    /// Per-attempt timeout.
    pub timeout_ms: u64,
    /// Retries after the first attempt.
    pub retry_attempts: u32,
    /// Consecutive failed calls that open a carrier's breaker.
    pub circuit_breaker_threshold: u32,
    /// Time an open breaker stays open after the last failure.
    pub circuit_breaker_reset_ms: u64,
    /// Frenet settings.
    #[serde(default)]
    pub frenet: FrenetConfig,
}

/// Pricing settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BillingConfig {
    /// Markup over the negotiated cost, in percent.
    pub markup_percent: Decimal,
    /// Fee added after the markup.
    pub fixed_fee: Decimal,
}

/// Quote store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL. Quotes are kept in memory when absent.
    pub url: Option<String>,
    /// Pool size.
    pub max_connections: u32,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

/// Complete process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// HTTP server.
    pub server: ServerConfig,
    /// Carrier calls.
    pub carrier: CarrierConfig,
    /// Pricing.
    pub billing: BillingConfig,
    /// Quote store.
    pub database: DatabaseConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from defaults, the config file and the environment.
    ///
    /// When `path` is given the file must exist; otherwise `shipquote.toml`
    /// is used if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source cannot be read and
    /// `ConfigError::Invalid` if the result fails validation.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let builder = defaults()?.add_source(file).add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        Self::build(builder)
    }

    /// Loads configuration from defaults overlaid with TOML `contents`.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::load`].
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Self::build(defaults()?.add_source(File::from_str(contents, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> ConfigResult<Self> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the sources cannot constrain.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a zero timeout, a zero breaker
    /// threshold, a negative markup or a negative fixed fee.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.carrier.timeout_ms == 0 {
            return Err(ConfigError::invalid("carrier.timeout_ms must be positive"));
        }
        if self.carrier.circuit_breaker_threshold == 0 {
            return Err(ConfigError::invalid(
                "carrier.circuit_breaker_threshold must be positive",
            ));
        }
        if self.billing.markup_percent < Decimal::ZERO {
            return Err(ConfigError::invalid(
                "billing.markup_percent cannot be negative",
            ));
        }
        if self.billing.fixed_fee < Decimal::ZERO {
            return Err(ConfigError::invalid("billing.fixed_fee cannot be negative"));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid(
                "database.max_connections must be positive",
            ));
        }
        Ok(())
    }

    /// Timeout and retry policy for the orchestrator.
    #[must_use]
    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            timeout: Duration::from_millis(self.carrier.timeout_ms),
            retry_attempts: self.carrier.retry_attempts,
            ..OrchestratorConfig::default()
        }
    }

    /// Circuit breaker settings.
    #[must_use]
    pub fn circuit_breaker(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.carrier.circuit_breaker_threshold,
            reset_timeout: Duration::from_millis(self.carrier.circuit_breaker_reset_ms),
        }
    }

    /// Billing calculator for the configured markup and fee.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if either value is negative.
    pub fn billing_calculator(&self) -> ConfigResult<BillingCalculator> {
        BillingCalculator::from_percent(self.billing.markup_percent, self.billing.fixed_fee)
            .map_err(|e| ConfigError::invalid(e.to_string()))
    }

    /// Socket address string the server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn defaults() -> ConfigResult<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("server.frontend_url", "http://localhost:5173")?
        .set_default("server.enable_carrier_probe", false)?
        .set_default("carrier.timeout_ms", 10_000)?
        .set_default("carrier.retry_attempts", 1)?
        .set_default("carrier.circuit_breaker_threshold", 5)?
        .set_default("carrier.circuit_breaker_reset_ms", 60_000)?
        .set_default(
            "carrier.frenet.base_url",
            crate::infrastructure::carriers::frenet::DEFAULT_BASE_URL,
        )?
        .set_default("billing.markup_percent", "20")?
        .set_default("billing.fixed_fee", "5.00")?
        .set_default("database.max_connections", 5)?
        .set_default("logging.level", "info")?
        .set_default("logging.json", false)?)
}
