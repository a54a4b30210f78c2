//! # Shipment Request
//!
//! Validated description of a package to be quoted.
//!
//! A [`ShipmentRequest`] is immutable once built: every field is checked in
//! [`ShipmentRequestBuilder::build`] and only read accessors are exposed.
//!
//! # Examples
//!
//! ```
//! use shipquote::domain::entities::{Dimensions, ShipmentRequest};
//! use rust_decimal::Decimal;
//!
//! let request = ShipmentRequest::builder(
//!     "01310-100",
//!     "04547000",
//!     Decimal::new(55, 1),
//!     Dimensions::new(Decimal::from(30), Decimal::from(20), Decimal::from(10)),
//! )
//! .service_option("tracking")
//! .declared_value(Decimal::from(1000))
//! .build()
//! .unwrap();
//!
//! assert_eq!(request.origin_digits(), "01310100");
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Number of digits in a postal code.
pub const POSTAL_CODE_LEN: usize = 8;

/// Maximum package weight in kilograms.
pub const MAX_WEIGHT_KG: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Maximum length of any single package side in centimetres.
pub const MAX_DIMENSION_CM: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Package dimensions in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Length in cm.
    pub length: Decimal,
    /// Width in cm.
    pub width: Decimal,
    /// Height in cm.
    pub height: Decimal,
}

impl Dimensions {
    /// Creates a dimension triple.
    #[must_use]
    pub const fn new(length: Decimal, width: Decimal, height: Decimal) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    fn validate(&self) -> DomainResult<()> {
        for (name, value) in [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
        ] {
            if value <= Decimal::ZERO || value > MAX_DIMENSION_CM {
                return Err(DomainError::invalid_argument(format!(
                    "{name} must be greater than 0 and at most {MAX_DIMENSION_CM} cm"
                )));
            }
        }
        Ok(())
    }
}

/// Shipment to be quoted.
///
/// # Invariants
///
/// - Postal codes contain exactly 8 digits once non-digits are stripped
/// - `0 < weight <= 1000` kg
/// - `0 < length, width, height <= 200` cm
/// - `declared_value >= 0` when present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRequest {
    origin_postal: String,
    destination_postal: String,
    weight: Decimal,
    dimensions: Dimensions,
    service_options: BTreeSet<String>,
    declared_value: Option<Decimal>,
}

impl ShipmentRequest {
    /// Returns a builder for a shipment request.
    #[must_use]
    pub fn builder(
        origin_postal: impl Into<String>,
        destination_postal: impl Into<String>,
        weight: Decimal,
        dimensions: Dimensions,
    ) -> ShipmentRequestBuilder {
        ShipmentRequestBuilder::new(origin_postal, destination_postal, weight, dimensions)
    }

    /// Origin postal code as submitted.
    #[inline]
    #[must_use]
    pub fn origin_postal(&self) -> &str {
        &self.origin_postal
    }

    /// Destination postal code as submitted.
    #[inline]
    #[must_use]
    pub fn destination_postal(&self) -> &str {
        &self.destination_postal
    }

    /// Origin postal code with every non-digit removed.
    #[must_use]
    pub fn origin_digits(&self) -> String {
        digits_only(&self.origin_postal)
    }

    /// Destination postal code with every non-digit removed.
    #[must_use]
    pub fn destination_digits(&self) -> String {
        digits_only(&self.destination_postal)
    }

    /// Weight in kilograms.
    #[inline]
    #[must_use]
    pub fn weight(&self) -> Decimal {
        self.weight
    }

    /// Package dimensions.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Requested service options.
    #[inline]
    #[must_use]
    pub fn service_options(&self) -> &BTreeSet<String> {
        &self.service_options
    }

    /// Declared value, if any.
    #[inline]
    #[must_use]
    pub fn declared_value(&self) -> Option<Decimal> {
        self.declared_value
    }
}

/// Builder for [`ShipmentRequest`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ShipmentRequestBuilder {
    origin_postal: String,
    destination_postal: String,
    weight: Decimal,
    dimensions: Dimensions,
    service_options: BTreeSet<String>,
    declared_value: Option<Decimal>,
}

impl ShipmentRequestBuilder {
    /// Creates a builder with the required fields.
    pub fn new(
        origin_postal: impl Into<String>,
        destination_postal: impl Into<String>,
        weight: Decimal,
        dimensions: Dimensions,
    ) -> Self {
        Self {
            origin_postal: origin_postal.into(),
            destination_postal: destination_postal.into(),
            weight,
            dimensions,
            service_options: BTreeSet::new(),
            declared_value: None,
        }
    }

    /// Adds a service option.
    pub fn service_option(mut self, option: impl Into<String>) -> Self {
        self.service_options.insert(option.into());
        self
    }

    /// Adds several service options.
    pub fn service_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.service_options
            .extend(options.into_iter().map(Into::into));
        self
    }

    /// Sets the declared value.
    pub fn declared_value(mut self, value: Decimal) -> Self {
        self.declared_value = Some(value);
        self
    }

    /// Sets the declared value from an optional.
    pub fn maybe_declared_value(mut self, value: Option<Decimal>) -> Self {
        self.declared_value = value;
        self
    }

    /// Validates and builds the request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` when any field violates the
    /// shipment invariants.
    pub fn build(self) -> DomainResult<ShipmentRequest> {
        validate_postal("origin postal code", &self.origin_postal)?;
        validate_postal("destination postal code", &self.destination_postal)?;

        if self.weight <= Decimal::ZERO || self.weight > MAX_WEIGHT_KG {
            return Err(DomainError::invalid_argument(format!(
                "weight must be greater than 0 and at most {MAX_WEIGHT_KG} kg"
            )));
        }
        self.dimensions.validate()?;

        if let Some(value) = self.declared_value {
            if value < Decimal::ZERO {
                return Err(DomainError::invalid_argument(
                    "declared value cannot be negative",
                ));
            }
        }

        Ok(ShipmentRequest {
            origin_postal: self.origin_postal,
            destination_postal: self.destination_postal,
            weight: self.weight,
            dimensions: self.dimensions,
            service_options: self.service_options,
            declared_value: self.declared_value,
        })
    }
}

fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn validate_postal(field: &str, value: &str) -> DomainResult<()> {
    if digits_only(value).len() != POSTAL_CODE_LEN {
        return Err(DomainError::invalid_argument(format!(
            "{field} must contain {POSTAL_CODE_LEN} digits"
        )));
    }
    Ok(())
}
