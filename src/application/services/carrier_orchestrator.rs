//! # Carrier Orchestrator
//!
//! Obtains a normalized rate from a carrier under a latency and failure
//! budget.
//!
//! For one [`CarrierOrchestrator::get_quote`] call:
//!
//! 1. Resolve the adapter; unknown carriers fail with `UnsupportedCarrier`.
//! 2. Reject immediately with `CarrierUnavailable` while the breaker is open.
//! 3. Normalize the request once.
//! 4. Try up to `retry_attempts + 1` times, strictly one after another.
//!    Attempt `n > 0` waits `2^(n-1) * base_backoff` first. Each attempt is
//!    bounded by `timeout`; when the deadline fires the in-flight call is
//!    dropped, which aborts its connection.
//! 5. The breaker is updated once per call, on the final outcome: success
//!    resets it, exhaustion records one failure.
//!
//! A carrier that answers with no usable service has given a definitive
//! answer. It is not retried, it counts as reachable for the breaker, and it
//! surfaces as `NoServiceAvailable`.

use crate::application::error::{QuoteError, QuoteResult};
use crate::application::services::circuit_breaker::CircuitBreaker;
use crate::domain::entities::{Dimensions, NormalizedCarrierResponse, ShipmentRequest};
use crate::domain::value_objects::{Carrier, CorrelationId};
use crate::infrastructure::carriers::{CarrierError, CarrierRegistry};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, warn};

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;

/// Default delay before the first retry.
pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(1_000);

/// Timeout and retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Budget of a single attempt.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub retry_attempts: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub base_backoff: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            base_backoff: DEFAULT_BASE_BACKOFF,
        }
    }
}

impl OrchestratorConfig {
    /// Total attempts per call.
    #[inline]
    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.retry_attempts.saturating_add(1)
    }

    /// Delay before attempt `attempt` (zero-based). Zero for the first.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_backoff
            .saturating_mul(2u32.saturating_pow(attempt - 1))
    }
}

/// Composes adapters, the circuit breaker and the retry/timeout policy.
#[derive(Debug, Clone)]
pub struct CarrierOrchestrator {
    registry: Arc<CarrierRegistry>,
    breaker: Arc<CircuitBreaker>,
    config: OrchestratorConfig,
}

impl CarrierOrchestrator {
    /// Creates an orchestrator.
    #[must_use]
    pub fn new(
        registry: Arc<CarrierRegistry>,
        breaker: Arc<CircuitBreaker>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            breaker,
            config,
        }
    }

    /// Retry and timeout policy.
    #[inline]
    #[must_use]
    pub fn config(&self) -> OrchestratorConfig {
        self.config
    }

    /// Shared circuit breaker.
    #[inline]
    #[must_use]
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Carriers with a registered adapter.
    #[must_use]
    pub fn available_carriers(&self) -> Vec<Carrier> {
        self.registry.carriers()
    }

    /// Gets a normalized quote from `carrier`.
    ///
    /// # Errors
    ///
    /// - `QuoteError::UnsupportedCarrier` - No adapter registered
    /// - `QuoteError::CarrierUnavailable` - Breaker open, no call attempted
    /// - `QuoteError::NoServiceAvailable` - Carrier offered nothing usable
    /// - `QuoteError::CarrierTimeout` - Every attempt failed or timed out
    pub async fn get_quote(
        &self,
        carrier: Carrier,
        request: &ShipmentRequest,
        correlation_id: &CorrelationId,
    ) -> QuoteResult<NormalizedCarrierResponse> {
        let adapter = self
            .registry
            .get(carrier)
            .ok_or_else(|| QuoteError::UnsupportedCarrier(carrier.to_string()))?;

        if self.breaker.is_open(carrier) {
            warn!(
                correlation_id = %correlation_id,
                carrier = %carrier,
                "circuit breaker open, rejecting call"
            );
            return Err(QuoteError::carrier_unavailable(carrier));
        }

        let carrier_request = adapter.normalize_request(request);
        let total_attempts = self.config.total_attempts();
        let timeout_ms = u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX);
        let mut last_error: Option<CarrierError> = None;

        for attempt in 0..total_attempts {
            if attempt > 0 {
                let delay = self.config.backoff(attempt);
                debug!(
                    correlation_id = %correlation_id,
                    carrier = %carrier,
                    attempt = attempt + 1,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "backing off before retry"
                );
                sleep(delay).await;
            }

            let deadline = Instant::now() + self.config.timeout;
            let outcome = match timeout_at(deadline, adapter.call_carrier(&carrier_request, deadline))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(CarrierError::timeout_with_duration(
                    format!("carrier did not answer within {timeout_ms}ms"),
                    timeout_ms,
                )),
            }
            .and_then(|response| adapter.normalize_response(response, request));

            match outcome {
                Ok(normalized) => {
                    self.breaker.record_success(carrier);
                    info!(
                        correlation_id = %correlation_id,
                        carrier = %carrier,
                        attempt = attempt + 1,
                        service = normalized.carrier_service_id(),
                        negotiated_cost = %normalized.negotiated_cost(),
                        "carrier quote obtained"
                    );
                    return Ok(normalized);
                }
                Err(error) if error.is_no_service_available() => {
                    self.breaker.record_success(carrier);
                    info!(
                        correlation_id = %correlation_id,
                        carrier = %carrier,
                        attempt = attempt + 1,
                        "carrier has no service available"
                    );
                    return Err(QuoteError::no_service_available(carrier, error.message()));
                }
                Err(error) => {
                    warn!(
                        correlation_id = %correlation_id,
                        carrier = %carrier,
                        attempt = attempt + 1,
                        total_attempts,
                        retryable = error.is_retryable(),
                        error = %error,
                        "carrier attempt failed"
                    );
                    last_error = Some(error);
                }
            }
        }

        let opened = self.breaker.record_failure(carrier);
        let last_error = last_error.map(|e| e.to_string()).unwrap_or_default();
        warn!(
            correlation_id = %correlation_id,
            carrier = %carrier,
            attempts = total_attempts,
            breaker_open = opened,
            last_error = %last_error,
            "carrier attempts exhausted"
        );
        Err(QuoteError::carrier_timeout(carrier, total_attempts, last_error))
    }

    /// Runs a quote for a fixed sample shipment to check connectivity.
    ///
    /// Goes through the breaker and retry policy like any other call.
    ///
    /// # Errors
    ///
    /// Same as [`CarrierOrchestrator::get_quote`].
    pub async fn probe(
        &self,
        carrier: Carrier,
        correlation_id: &CorrelationId,
    ) -> QuoteResult<NormalizedCarrierResponse> {
        let sample = probe_shipment()?;
        self.get_quote(carrier, &sample, correlation_id).await
    }
}

fn probe_shipment() -> QuoteResult<ShipmentRequest> {
    let side = Decimal::TEN;
    Ok(ShipmentRequest::builder(
        "01001000",
        "20040002",
        Decimal::ONE,
        Dimensions::new(side, side, side),
    )
    .build()?)
}
