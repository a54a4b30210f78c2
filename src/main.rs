//! # shipquote server
//!
//! Loads configuration, wires the quote broker and serves the REST API.
//!
//! ```bash
//! shipquote-server --config ./shipquote.toml --port 8080
//! SHIPQUOTE_CARRIER__FRENET__TOKEN=... shipquote-server
//! ```

use anyhow::Context;
use clap::Parser;
use shipquote::api::rest::{AppState, create_router};
use shipquote::application::services::{
    CarrierOrchestrator, CircuitBreaker, LabelService, QuoteLifecycleManager,
};
use shipquote::config::AppConfig;
use shipquote::infrastructure::carriers::{CarrierRegistry, FrenetAdapter};
use shipquote::infrastructure::labels::PdfLabelRenderer;
use shipquote::infrastructure::persistence::{
    InMemoryQuoteRepository, PostgresQuoteRepository, QuoteRepository,
};
use shipquote::logging;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

/// Shipping-rate quote broker.
#[derive(Debug, Parser)]
#[command(name = "shipquote-server", version, about)]
struct Cli {
    /// Configuration file; `shipquote.toml` is used when present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `server.port`.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(&config.logging);
    info!(version = env!("CARGO_PKG_VERSION"), "starting shipquote server");

    let state = Arc::new(build_state(&config).await?);
    let router = create_router(state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(address = %address, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let repository = build_repository(config).await?;

    let frenet = &config.carrier.frenet;
    if frenet.credential().is_empty() {
        warn!("no Frenet token or api key configured, carrier calls will be rejected");
    }
    let adapter = FrenetAdapter::new(frenet.clone(), config.carrier.timeout_ms)
        .context("failed to create Frenet adapter")?;
    let registry = CarrierRegistry::new().with_adapter(Arc::new(adapter));

    let orchestrator = CarrierOrchestrator::new(
        Arc::new(registry),
        Arc::new(CircuitBreaker::new(config.circuit_breaker())),
        config.orchestrator(),
    );
    let billing = config
        .billing_calculator()
        .context("invalid billing configuration")?;

    info!(
        carriers = ?orchestrator.available_carriers(),
        timeout_ms = config.carrier.timeout_ms,
        retry_attempts = config.carrier.retry_attempts,
        markup_percent = %config.billing.markup_percent,
        fixed_fee = %config.billing.fixed_fee,
        "quote broker configured"
    );

    Ok(AppState {
        lifecycle: QuoteLifecycleManager::new(orchestrator, billing, repository.clone()),
        labels: LabelService::new(
            repository,
            Arc::new(PdfLabelRenderer::new()),
            config.server.frontend_url.clone(),
        ),
        enable_carrier_probe: config.server.enable_carrier_probe,
    })
}

async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn QuoteRepository>> {
    match &config.database.url {
        Some(url) => {
            let repository = PostgresQuoteRepository::connect(url, config.database.max_connections)
                .await
                .context("failed to connect to PostgreSQL")?;
            repository
                .ensure_schema()
                .await
                .context("failed to prepare quote schema")?;
            info!("using PostgreSQL quote store");
            Ok(Arc::new(repository))
        }
        None => {
            warn!("database.url not set, quotes are kept in memory");
            Ok(Arc::new(InMemoryQuoteRepository::new()))
        }
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C"),
        () = terminate => info!("received SIGTERM"),
    }
}
