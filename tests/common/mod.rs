//! Shared fixtures for integration tests.
//!
//! Quotes are obtained from a real [`FrenetAdapter`] pointed at a wiremock
//! server, so every test drives the full HTTP path.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shipquote::application::services::{
    CarrierOrchestrator, CircuitBreaker, CircuitBreakerConfig, LabelService, OrchestratorConfig,
    QuoteLifecycleManager,
};
use shipquote::domain::entities::{Dimensions, Quote, ShipmentRequest};
use shipquote::domain::services::BillingCalculator;
use shipquote::domain::value_objects::{ClientId, QuoteId};
use shipquote::infrastructure::carriers::{CarrierRegistry, FrenetAdapter, FrenetConfig};
use shipquote::infrastructure::labels::PdfLabelRenderer;
use shipquote::infrastructure::persistence::{
    InMemoryQuoteRepository, QuoteFilter, QuotePage, QuoteRepository, RepositoryError,
    RepositoryResult,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";

/// Frenet reply offering the given `(code, name, price)` services.
pub fn frenet_reply(services: &[(&str, &str, &str)]) -> Value {
    let services: Vec<Value> = services
        .iter()
        .map(|(code, name, price)| {
            json!({
                "serviceCode": code,
                "serviceName": name,
                "shippingPrice": price,
                "deliveryTime": "3",
                "error": false
            })
        })
        .collect();
    json!([{ "shippingServices": services }])
}

/// Mounts a Frenet quote endpoint answering `status` with `body`.
pub async fn mount_quote(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/shipping/quote"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts a Frenet quote endpoint that answers only after `delay`.
pub async fn mount_slow_quote(server: &MockServer, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/shipping/quote"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(frenet_reply(&[("04014", "SEDEX", "10.00")]))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Number of quote requests the server received.
pub async fn quote_calls(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}

pub fn shipment() -> ShipmentRequest {
    ShipmentRequest::builder(
        "01310-100",
        "04547-000",
        Decimal::new(25, 1),
        Dimensions::new(Decimal::from(30), Decimal::from(20), Decimal::TEN),
    )
    .build()
    .unwrap()
}

/// Fast policy for tests: short timeout and backoff.
pub fn fast_policy(retry_attempts: u32) -> OrchestratorConfig {
    OrchestratorConfig {
        timeout: Duration::from_millis(300),
        retry_attempts,
        base_backoff: Duration::from_millis(10),
    }
}

pub fn breaker_config(threshold: u32, reset: Duration) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold: threshold,
        reset_timeout: reset,
    }
}

/// Lifecycle manager, label service and backing store wired to `server`.
pub struct Harness {
    pub lifecycle: QuoteLifecycleManager,
    pub labels: LabelService,
    pub repository: Arc<dyn QuoteRepository>,
}

impl Harness {
    pub fn new(
        server: &MockServer,
        policy: OrchestratorConfig,
        breaker: CircuitBreakerConfig,
        repository: Arc<dyn QuoteRepository>,
    ) -> Self {
        let config = FrenetConfig::new(server.uri()).with_token(TOKEN);
        let adapter = FrenetAdapter::new(config, 5_000).unwrap();
        let registry = CarrierRegistry::new().with_adapter(Arc::new(adapter));
        let orchestrator = CarrierOrchestrator::new(
            Arc::new(registry),
            Arc::new(CircuitBreaker::new(breaker)),
            policy,
        );
        Self {
            lifecycle: QuoteLifecycleManager::new(
                orchestrator,
                BillingCalculator::default(),
                repository.clone(),
            ),
            labels: LabelService::new(
                repository.clone(),
                Arc::new(PdfLabelRenderer::new()),
                "http://localhost:5173",
            ),
            repository,
        }
    }

    pub fn in_memory(server: &MockServer, policy: OrchestratorConfig) -> Self {
        Self::new(
            server,
            policy,
            CircuitBreakerConfig::default(),
            Arc::new(InMemoryQuoteRepository::new()),
        )
    }
}

/// Repository whose saves start failing after `healthy_saves` successes.
#[derive(Debug)]
pub struct FlakyRepository {
    inner: InMemoryQuoteRepository,
    healthy_saves: usize,
    saves: AtomicUsize,
}

impl FlakyRepository {
    pub fn new(healthy_saves: usize) -> Self {
        Self {
            inner: InMemoryQuoteRepository::new(),
            healthy_saves,
            saves: AtomicUsize::new(0),
        }
    }

    pub fn attempted_saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteRepository for FlakyRepository {
    async fn save(&self, quote: &Quote) -> RepositoryResult<()> {
        let attempt = self.saves.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.healthy_saves {
            return Err(RepositoryError::connection("database unavailable"));
        }
        self.inner.save(quote).await
    }

    async fn get(&self, client_id: &ClientId, id: &QuoteId) -> RepositoryResult<Option<Quote>> {
        self.inner.get(client_id, id).await
    }

    async fn list(&self, client_id: &ClientId, filter: &QuoteFilter) -> RepositoryResult<QuotePage> {
        self.inner.list(client_id, filter).await
    }
}
