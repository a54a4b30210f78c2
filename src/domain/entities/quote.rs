//! # Quote Entity
//!
//! A shipping quote and its lifecycle.
//!
//! A quote is created in [`QuoteStatus::Processing`] before the carrier is
//! called and moves exactly once to a terminal state when the call resolves.
//!
//! # Examples
//!
//! ```
//! use shipquote::domain::entities::{Dimensions, NormalizedCarrierResponse, Quote, ShipmentRequest};
//! use shipquote::domain::value_objects::{Carrier, ClientId, CorrelationId, QuoteStatus};
//! use rust_decimal::Decimal;
//!
//! let shipment = ShipmentRequest::builder(
//!     "01310100",
//!     "04547000",
//!     Decimal::ONE,
//!     Dimensions::new(Decimal::TEN, Decimal::TEN, Decimal::TEN),
//! )
//! .build()
//! .unwrap();
//!
//! let mut quote = Quote::processing(
//!     ClientId::new("client-1"),
//!     Carrier::Frenet,
//!     shipment,
//!     CorrelationId::new("corr-1"),
//! );
//! assert_eq!(quote.status(), QuoteStatus::Processing);
//!
//! let response = NormalizedCarrierResponse::new(Decimal::TEN, "04014", serde_json::json!({})).unwrap();
//! quote.complete(&response, Decimal::from(17)).unwrap();
//! assert_eq!(quote.status(), QuoteStatus::Success);
//! ```

use crate::domain::entities::carrier_response::NormalizedCarrierResponse;
use crate::domain::entities::shipment::ShipmentRequest;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{
    Carrier, ClientId, CorrelationId, QuoteId, QuoteStatus, Timestamp,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error attached to a quote that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorPayload {
    /// Creates an error payload.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Shipping label metadata recorded on a successful quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelInfo {
    /// Label identifier.
    pub label_id: String,
    /// When the label was generated.
    pub generated_at: Timestamp,
}

/// A shipping quote.
///
/// # Invariants
///
/// - Starts in `Processing` (or `Pending` when reconstructed from storage)
/// - Reaches a terminal state at most once
/// - `negotiated_cost`, `final_price` and `service` are only set on success
/// - Only successful quotes carry label metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    id: QuoteId,
    client_id: ClientId,
    carrier: Carrier,
    service: String,
    carrier_service_id: Option<String>,
    negotiated_cost: Decimal,
    final_price: Decimal,
    status: QuoteStatus,
    created_at: Timestamp,
    updated_at: Option<Timestamp>,
    correlation_id: CorrelationId,
    shipment: ShipmentRequest,
    estimated_delivery: Option<Timestamp>,
    carrier_response: Option<serde_json::Value>,
    error: Option<ErrorPayload>,
    label: Option<LabelInfo>,
}

impl Quote {
    /// Creates a new quote in the `Processing` state.
    ///
    /// The shipment is copied verbatim into the quote.
    #[must_use]
    pub fn processing(
        client_id: ClientId,
        carrier: Carrier,
        shipment: ShipmentRequest,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            id: QuoteId::new_v4(),
            client_id,
            carrier,
            service: String::new(),
            carrier_service_id: None,
            negotiated_cost: Decimal::ZERO,
            final_price: Decimal::ZERO,
            status: QuoteStatus::Processing,
            created_at: Timestamp::now(),
            updated_at: None,
            correlation_id,
            shipment,
            estimated_delivery: None,
            carrier_response: None,
            error: None,
            label: None,
        }
    }

    /// Overrides the creation time.
    ///
    /// Used when replaying stored quotes and in tests that need a fixed order.
    #[must_use]
    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = created_at;
        self
    }

    fn transition(&mut self, to: QuoteStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(to) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = Some(Timestamp::now());
        Ok(())
    }

    /// Records a successful carrier reply and the computed sale price.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` if the quote is not
    /// `Processing`.
    pub fn complete(
        &mut self,
        response: &NormalizedCarrierResponse,
        final_price: Decimal,
    ) -> DomainResult<()> {
        self.transition(QuoteStatus::Success)?;
        self.negotiated_cost = response.negotiated_cost();
        self.final_price = final_price;
        self.service = response.display_service().to_string();
        self.carrier_service_id = Some(response.carrier_service_id().to_string());
        self.estimated_delivery = response.estimated_delivery();
        self.carrier_response = Some(response.raw().clone());
        Ok(())
    }

    /// Records a failed quote.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if `status` is not a failure
    /// state, or `DomainError::InvalidStateTransition` if the quote is not
    /// `Processing`.
    pub fn fail(&mut self, status: QuoteStatus, error: ErrorPayload) -> DomainResult<()> {
        if !matches!(status, QuoteStatus::Error | QuoteStatus::CarrierTimeout) {
            return Err(DomainError::invalid_state(format!(
                "{status} is not a failure status"
            )));
        }
        self.transition(status)?;
        self.error = Some(error);
        Ok(())
    }

    /// Attaches label metadata.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` unless the quote succeeded.
    pub fn attach_label(&mut self, label: LabelInfo) -> DomainResult<()> {
        if self.status != QuoteStatus::Success {
            return Err(DomainError::invalid_state(format!(
                "cannot generate label for quote with status: {}",
                self.status
            )));
        }
        self.label = Some(label);
        self.updated_at = Some(Timestamp::now());
        Ok(())
    }

    /// Returns true if `client_id` owns this quote.
    #[inline]
    #[must_use]
    pub fn is_owned_by(&self, client_id: &ClientId) -> bool {
        &self.client_id == client_id
    }

    /// Quote identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> QuoteId {
        self.id
    }

    /// Owning client.
    #[inline]
    #[must_use]
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Carrier quoted against.
    #[inline]
    #[must_use]
    pub fn carrier(&self) -> Carrier {
        self.carrier
    }

    /// Chosen service name; empty until success.
    #[inline]
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Carrier service code of the chosen service.
    #[inline]
    #[must_use]
    pub fn carrier_service_id(&self) -> Option<&str> {
        self.carrier_service_id.as_deref()
    }

    /// Negotiated cost; zero until success.
    #[inline]
    #[must_use]
    pub fn negotiated_cost(&self) -> Decimal {
        self.negotiated_cost
    }

    /// Sale price; zero until success.
    #[inline]
    #[must_use]
    pub fn final_price(&self) -> Decimal {
        self.final_price
    }

    /// Lifecycle status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    /// Creation time.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last mutation time.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Option<Timestamp> {
        self.updated_at
    }

    /// Correlation id of the request that created the quote.
    #[inline]
    #[must_use]
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Shipment attributes.
    #[inline]
    #[must_use]
    pub fn shipment(&self) -> &ShipmentRequest {
        &self.shipment
    }

    /// Estimated delivery, if known.
    #[inline]
    #[must_use]
    pub fn estimated_delivery(&self) -> Option<Timestamp> {
        self.estimated_delivery
    }

    /// Raw carrier response retained for audit.
    #[inline]
    #[must_use]
    pub fn carrier_response(&self) -> Option<&serde_json::Value> {
        self.carrier_response.as_ref()
    }

    /// Error payload of a failed quote.
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&ErrorPayload> {
        self.error.as_ref()
    }

    /// Label metadata, if a label was generated.
    #[inline]
    #[must_use]
    pub fn label(&self) -> Option<&LabelInfo> {
        self.label.as_ref()
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quote({} {} {} status={})",
            self.id, self.client_id, self.carrier, self.status
        )
    }
}
