//! # Quote Lifecycle
//!
//! Creates, reads and lists quotes.
//!
//! ```text
//! processing ──► success
//!            ├─► error
//!            └─► carrier_timeout
//! ```
//!
//! A quote is saved in `processing` before the carrier is called and saved
//! again once it reaches a terminal state. On the failure path the second
//! save is best effort: a persistence error is logged and the caller still
//! receives the carrier error, tagged with its correlation id.

use crate::application::error::{QuoteError, QuoteFailure, QuoteResult};
use crate::application::services::carrier_orchestrator::CarrierOrchestrator;
use crate::domain::entities::{Quote, ShipmentRequest};
use crate::domain::services::BillingCalculator;
use crate::domain::value_objects::{Carrier, ClientId, CorrelationId, QuoteId, QuoteStatus};
use crate::infrastructure::persistence::{MAX_PAGE_SIZE, QuoteFilter, QuotePage, QuoteRepository};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Owns quote state transitions.
#[derive(Debug, Clone)]
pub struct QuoteLifecycleManager {
    orchestrator: CarrierOrchestrator,
    billing: BillingCalculator,
    repository: Arc<dyn QuoteRepository>,
}

impl QuoteLifecycleManager {
    /// Creates a lifecycle manager.
    #[must_use]
    pub fn new(
        orchestrator: CarrierOrchestrator,
        billing: BillingCalculator,
        repository: Arc<dyn QuoteRepository>,
    ) -> Self {
        Self {
            orchestrator,
            billing,
            repository,
        }
    }

    /// Carrier orchestrator.
    #[inline]
    #[must_use]
    pub fn orchestrator(&self) -> &CarrierOrchestrator {
        &self.orchestrator
    }

    /// Quote repository.
    #[inline]
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn QuoteRepository> {
        &self.repository
    }

    /// Creates a quote for `shipment` against `carrier`.
    ///
    /// # Errors
    ///
    /// Returns a [`QuoteFailure`] carrying the correlation id, and the quote
    /// id when a quote was recorded. The underlying error is the
    /// orchestrator's failure, a pricing failure, or a persistence failure
    /// on the write-ahead or success save.
    pub async fn create_quote(
        &self,
        client_id: ClientId,
        carrier: Carrier,
        shipment: ShipmentRequest,
        correlation_id: CorrelationId,
    ) -> Result<Quote, QuoteFailure> {
        let mut quote = Quote::processing(client_id, carrier, shipment, correlation_id.clone());
        let quote_id = quote.id();
        let fail = |error: QuoteError| {
            QuoteFailure::new(error, correlation_id.clone()).with_quote_id(quote_id)
        };

        info!(
            correlation_id = %correlation_id,
            quote_id = %quote_id,
            client_id = %quote.client_id(),
            carrier = %carrier,
            "creating quote"
        );

        self.repository
            .save(&quote)
            .await
            .map_err(|e| QuoteFailure::new(e.into(), correlation_id.clone()))?;

        let priced = match self
            .orchestrator
            .get_quote(carrier, quote.shipment(), &correlation_id)
            .await
        {
            Ok(response) => self
                .billing
                .calculate_final_price(response.negotiated_cost())
                .map(|price| (response, price))
                .map_err(QuoteError::from),
            Err(e) => Err(e),
        };

        match priced {
            Ok((response, final_price)) => {
                quote.complete(&response, final_price).map_err(|e| fail(e.into()))?;
                self.repository
                    .save(&quote)
                    .await
                    .map_err(|e| fail(e.into()))?;

                info!(
                    correlation_id = %correlation_id,
                    quote_id = %quote_id,
                    negotiated_cost = %quote.negotiated_cost(),
                    final_price = %quote.final_price(),
                    "quote created"
                );
                Ok(quote)
            }
            Err(cause) => {
                let status = if cause.is_carrier_timeout() {
                    QuoteStatus::CarrierTimeout
                } else {
                    QuoteStatus::Error
                };
                quote
                    .fail(status, cause.to_payload())
                    .map_err(|e| fail(e.into()))?;
                self.persist_failed_quote_best_effort(&quote).await;

                warn!(
                    correlation_id = %correlation_id,
                    quote_id = %quote_id,
                    status = %status,
                    code = %cause.code(),
                    error = %cause,
                    "quote failed"
                );
                Err(fail(cause))
            }
        }
    }

    /// Saves a failed quote, logging instead of returning any error.
    ///
    /// Returns true if the save succeeded.
    pub async fn persist_failed_quote_best_effort(&self, quote: &Quote) -> bool {
        match self.repository.save(quote).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    correlation_id = %quote.correlation_id(),
                    quote_id = %quote.id(),
                    status = %quote.status(),
                    error = %e,
                    "failed to persist failed quote"
                );
                false
            }
        }
    }

    /// Fetches a quote owned by `client_id`.
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::NotFound` if the quote is absent or owned by
    /// another client.
    pub async fn get_quote(&self, client_id: &ClientId, quote_id: &QuoteId) -> QuoteResult<Quote> {
        self.repository
            .get(client_id, quote_id)
            .await?
            .ok_or_else(|| QuoteError::quote_not_found(quote_id))
    }

    /// Lists quotes owned by `client_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::InvalidArgument` if the page size is outside
    /// `1..=100` or the date range is inverted.
    pub async fn list_quotes(
        &self,
        client_id: &ClientId,
        filter: &QuoteFilter,
    ) -> QuoteResult<QuotePage> {
        if filter.limit == 0 || filter.limit > MAX_PAGE_SIZE {
            return Err(QuoteError::invalid_argument(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if start > end {
                return Err(QuoteError::invalid_argument(
                    "start_date must not be after end_date",
                ));
            }
        }
        Ok(self.repository.list(client_id, filter).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::application::services::circuit_breaker::CircuitBreaker;
    use crate::application::services::carrier_orchestrator::OrchestratorConfig;
    use crate::domain::entities::Dimensions;
    use crate::infrastructure::carriers::CarrierRegistry;
    use crate::infrastructure::persistence::InMemoryQuoteRepository;
    use rust_decimal::Decimal;

    fn manager(repository: Arc<dyn QuoteRepository>) -> QuoteLifecycleManager {
        let orchestrator = CarrierOrchestrator::new(
            Arc::new(CarrierRegistry::new()),
            Arc::new(CircuitBreaker::default()),
            OrchestratorConfig::default(),
        );
        QuoteLifecycleManager::new(orchestrator, BillingCalculator::default(), repository)
    }

    fn shipment() -> ShipmentRequest {
        ShipmentRequest::builder(
            "01310100",
            "04547000",
            Decimal::ONE,
            Dimensions::new(Decimal::TEN, Decimal::TEN, Decimal::TEN),
        )
        .build()
        .unwrap()
    }

    #[tokio::test]
    async fn unsupported_carrier_records_error_quote() {
        let repository = Arc::new(InMemoryQuoteRepository::new());
        let manager = manager(repository.clone());
        let client = ClientId::new("alice");

        let failure = manager
            .create_quote(
                client.clone(),
                Carrier::Frenet,
                shipment(),
                CorrelationId::new("corr-1"),
            )
            .await
            .unwrap_err();

        assert_eq!(failure.correlation_id.as_str(), "corr-1");
        let quote_id = failure.quote_id.expect("quote id recorded");
        let quote = manager.get_quote(&client, &quote_id).await.unwrap();
        assert_eq!(quote.status(), QuoteStatus::Error);
        assert_eq!(quote.error().unwrap().code, "UNSUPPORTED_CARRIER");
    }

    #[tokio::test]
    async fn get_quote_not_found_for_other_client() {
        let repository = Arc::new(InMemoryQuoteRepository::new());
        let manager = manager(repository);

        let failure = manager
            .create_quote(
                ClientId::new("alice"),
                Carrier::Frenet,
                shipment(),
                CorrelationId::new("corr-1"),
            )
            .await
            .unwrap_err();
        let quote_id = failure.quote_id.unwrap();

        let err = manager
            .get_quote(&ClientId::new("bob"), &quote_id)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    mod list_quotes {
        use super::*;
        use crate::domain::value_objects::Timestamp;

        #[tokio::test]
        async fn rejects_out_of_range_limit() {
            let manager = manager(Arc::new(InMemoryQuoteRepository::new()));
            let client = ClientId::new("alice");

            for limit in [0, MAX_PAGE_SIZE + 1] {
                let filter = QuoteFilter {
                    limit,
                    ..QuoteFilter::default()
                };
                let err = manager.list_quotes(&client, &filter).await.unwrap_err();
                assert!(matches!(err, QuoteError::InvalidArgument(_)));
            }
        }

        #[tokio::test]
        async fn rejects_inverted_range() {
            let manager = manager(Arc::new(InMemoryQuoteRepository::new()));
            let filter = QuoteFilter {
                start_date: Timestamp::from_millis(2_000),
                end_date: Timestamp::from_millis(1_000),
                ..QuoteFilter::default()
            };
            let err = manager
                .list_quotes(&ClientId::new("alice"), &filter)
                .await
                .unwrap_err();
            assert!(matches!(err, QuoteError::InvalidArgument(_)));
        }

        #[tokio::test]
        async fn accepts_max_limit() {
            let manager = manager(Arc::new(InMemoryQuoteRepository::new()));
            let filter = QuoteFilter {
                limit: MAX_PAGE_SIZE,
                ..QuoteFilter::default()
            };
            let page = manager
                .list_quotes(&ClientId::new("alice"), &filter)
                .await
                .unwrap();
            assert!(page.quotes.is_empty());
            assert!(page.next_cursor.is_none());
        }
    }
}
