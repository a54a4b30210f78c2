//! # Normalized Carrier Response
//!
//! Carrier-neutral form of a successful rate reply.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A carrier reply reduced to what the quote lifecycle needs.
///
/// Produced once per successful carrier call and never mutated. The raw
/// payload is kept verbatim for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCarrierResponse {
    negotiated_cost: Decimal,
    carrier_service_id: String,
    service_name: Option<String>,
    estimated_delivery: Option<Timestamp>,
    raw: serde_json::Value,
}

impl NormalizedCarrierResponse {
    /// Creates a normalized response.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if the negotiated cost is negative.
    pub fn new(
        negotiated_cost: Decimal,
        carrier_service_id: impl Into<String>,
        raw: serde_json::Value,
    ) -> DomainResult<Self> {
        if negotiated_cost < Decimal::ZERO {
            return Err(DomainError::invalid_argument(
                "negotiated cost cannot be negative",
            ));
        }
        Ok(Self {
            negotiated_cost,
            carrier_service_id: carrier_service_id.into(),
            service_name: None,
            estimated_delivery: None,
            raw,
        })
    }

    /// Sets the human-readable service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Sets the estimated delivery instant.
    #[must_use]
    pub fn with_estimated_delivery(mut self, at: Timestamp) -> Self {
        self.estimated_delivery = Some(at);
        self
    }

    /// Price quoted by the carrier before markup.
    #[inline]
    #[must_use]
    pub fn negotiated_cost(&self) -> Decimal {
        self.negotiated_cost
    }

    /// Carrier's service code.
    #[inline]
    #[must_use]
    pub fn carrier_service_id(&self) -> &str {
        &self.carrier_service_id
    }

    /// Service name, if the carrier supplied one.
    #[inline]
    #[must_use]
    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    /// Name to show for the service: the service name, else the service code.
    #[must_use]
    pub fn display_service(&self) -> &str {
        self.service_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(self.carrier_service_id.as_str())
    }

    /// Estimated delivery instant.
    #[inline]
    #[must_use]
    pub fn estimated_delivery(&self) -> Option<Timestamp> {
        self.estimated_delivery
    }

    /// Raw carrier payload.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_negative_cost() {
        let result = NormalizedCarrierResponse::new(Decimal::NEGATIVE_ONE, "04014", json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn display_service_falls_back_to_code() {
        let response = NormalizedCarrierResponse::new(Decimal::TEN, "04014", json!({})).unwrap();
        assert_eq!(response.display_service(), "04014");

        let named = response.with_service_name("SEDEX");
        assert_eq!(named.display_service(), "SEDEX");
    }
}
