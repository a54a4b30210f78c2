//! # Logging
//!
//! Installs the global `tracing` subscriber.
//!
//! `RUST_LOG` wins over the configured level. Initialization happens at most
//! once per process; later calls are no-ops, which lets tests and the binary
//! share the same entry point.

use crate::config::LoggingConfig;
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Builds the filter: `RUST_LOG` when set and valid, else `default_level`.
#[must_use]
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes logging for the process.
pub fn init(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = env_filter(&config.level);
        let layer = if config.json {
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        };

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("global tracing subscriber already set, keeping it");
        }

        tracing::info!(
            level = %config.level,
            json = config.json,
            "logging initialized"
        );
    });
}
