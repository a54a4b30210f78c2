//! # Carrier Adapter Trait
//!
//! Port definition for carrier integrations.
//!
//! Every carrier implements [`CarrierAdapter`] in three steps: translate the
//! generic [`ShipmentRequest`] into the carrier's wire request, perform one
//! network call, and reduce the reply to a [`NormalizedCarrierResponse`].
//! Retry, timeout and circuit breaking live in the orchestrator, not here.
//!
//! Wire shapes are closed enumerations keyed by carrier so the trait stays
//! object safe and the registry can hold `Arc<dyn CarrierAdapter>`.

use crate::domain::entities::{NormalizedCarrierResponse, ShipmentRequest};
use crate::domain::value_objects::Carrier;
use crate::infrastructure::carriers::error::CarrierResult;
use crate::infrastructure::carriers::frenet::{FrenetQuoteRequest, FrenetQuoteResponse};
use async_trait::async_trait;
use std::fmt;
use tokio::time::Instant;

/// Carrier-specific request body.
#[derive(Debug, Clone, PartialEq)]
pub enum CarrierRequest {
    /// Frenet `/shipping/quote` body.
    Frenet(FrenetQuoteRequest),
}

impl CarrierRequest {
    /// Carrier this request is addressed to.
    #[must_use]
    pub fn carrier(&self) -> Carrier {
        match self {
            Self::Frenet(_) => Carrier::Frenet,
        }
    }
}

/// Carrier-specific reply body.
#[derive(Debug, Clone, PartialEq)]
pub enum CarrierResponse {
    /// Frenet shipping options.
    Frenet(FrenetQuoteResponse),
}

/// Trait defining the interface for carrier adapters.
///
/// # Cancellation
///
/// `call_carrier` receives the deadline of the current attempt. The
/// orchestrator drops the returned future when the deadline passes, so
/// implementations must not spawn work that outlives the future.
#[async_trait]
pub trait CarrierAdapter: Send + Sync + fmt::Debug {
    /// Stable carrier identity; the registry and circuit-breaker key.
    fn carrier(&self) -> Carrier;

    /// Translates a shipment into the carrier's request shape.
    fn normalize_request(&self, request: &ShipmentRequest) -> CarrierRequest;

    /// Performs exactly one call to the carrier.
    ///
    /// # Errors
    ///
    /// - `CarrierError::Timeout` - The deadline passed
    /// - `CarrierError::Connection` - Transport failure or 5xx reply
    /// - `CarrierError::Authentication` - Credentials rejected
    /// - `CarrierError::Protocol` - Unparseable reply
    async fn call_carrier(
        &self,
        request: &CarrierRequest,
        deadline: Instant,
    ) -> CarrierResult<CarrierResponse>;

    /// Reduces a reply to the cheapest usable service.
    ///
    /// # Errors
    ///
    /// - `CarrierError::NoServiceAvailable` - The reply holds no usable option
    /// - `CarrierError::Protocol` - The selected option is malformed
    fn normalize_response(
        &self,
        response: CarrierResponse,
        request: &ShipmentRequest,
    ) -> CarrierResult<NormalizedCarrierResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Dimensions;
    use rust_decimal::Decimal;

    #[test]
    fn request_carrier() {
        let shipment = ShipmentRequest::builder(
            "01310100",
            "04547000",
            Decimal::ONE,
            Dimensions::new(Decimal::TEN, Decimal::TEN, Decimal::TEN),
        )
        .build();
        let Ok(shipment) = shipment else {
            panic!("valid shipment rejected");
        };
        let request = CarrierRequest::Frenet(FrenetQuoteRequest::from_shipment(&shipment));
        assert_eq!(request.carrier(), Carrier::Frenet);
    }
}
