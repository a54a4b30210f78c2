//! # Application Errors
//!
//! Error taxonomy of the quote broker.
//!
//! Adapter and transport failures never cross this layer raw: the
//! orchestrator converts them into [`QuoteError`] variants, each of which
//! maps to a stable [`ErrorCode`] and an [`ErrorClass`] that tells callers
//! whether retrying later makes sense.
//!
//! # Error Hierarchy
//!
//! ```text
//! QuoteError
//! ├── UnsupportedCarrier      - No adapter for the carrier        (client)
//! ├── CarrierUnavailable      - Circuit breaker open              (unavailable)
//! ├── CarrierTimeout          - Every attempt failed              (unavailable)
//! ├── NoServiceAvailable      - Carrier offered no usable service (unavailable)
//! ├── InvalidArgument         - Malformed input                   (client)
//! ├── NotFound                - Missing or not owned              (not found)
//! ├── InvalidState            - Operation not allowed in state    (client)
//! ├── Repository              - Persistence failure               (internal)
//! └── Internal                - Anything else                     (internal)
//! ```
//!
//! # Examples
//!
//! ```
//! use shipquote::application::error::{ErrorClass, ErrorCode, QuoteError};
//! use shipquote::domain::value_objects::Carrier;
//!
//! let err = QuoteError::carrier_timeout(Carrier::Frenet, 2, "connection refused");
//! assert_eq!(err.code(), ErrorCode::CarrierTimeout);
//! assert_eq!(err.class(), ErrorClass::ServiceUnavailable);
//! assert!(err.is_retryable());
//! ```

use crate::domain::entities::ErrorPayload;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{Carrier, CorrelationId, QuoteId, UnsupportedCarrierError};
use crate::infrastructure::persistence::RepositoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No adapter is registered for the carrier.
    UnsupportedCarrier,
    /// Circuit breaker is open.
    CarrierUnavailable,
    /// Every attempt failed or timed out.
    CarrierTimeout,
    /// Carrier answered with no usable service.
    NoServiceAvailable,
    /// Input failed validation.
    InvalidArgument,
    /// Quote missing or not owned by the caller.
    NotFound,
    /// Operation not allowed in the current quote state.
    InvalidState,
    /// Persistence failure.
    PersistenceError,
    /// Unexpected failure.
    InternalError,
}

impl ErrorCode {
    /// Code as it appears on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedCarrier => "UNSUPPORTED_CARRIER",
            Self::CarrierUnavailable => "CARRIER_UNAVAILABLE",
            Self::CarrierTimeout => "CARRIER_TIMEOUT",
            Self::NoServiceAvailable => "NO_SERVICE_AVAILABLE",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidState => "INVALID_STATE",
            Self::PersistenceError => "PERSISTENCE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a caller should treat an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Temporarily unavailable; retry later.
    ServiceUnavailable,
    /// The request itself is wrong; do not retry.
    ClientError,
    /// The resource does not exist for this caller.
    NotFound,
    /// Unexpected server-side failure.
    Internal,
}

/// Error type for quote operations.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// No adapter is registered for the carrier.
    #[error("carrier {0} not supported")]
    UnsupportedCarrier(String),

    /// The carrier's circuit breaker is open.
    #[error("carrier {carrier} is temporarily unavailable")]
    CarrierUnavailable {
        /// Carrier.
        carrier: Carrier,
    },

    /// Every attempt failed.
    #[error("carrier {carrier} failed after {attempts} attempts: {last_error}")]
    CarrierTimeout {
        /// Carrier.
        carrier: Carrier,
        /// Attempts made.
        attempts: u32,
        /// Message of the last failure.
        last_error: String,
    },

    /// The carrier answered but offered no usable service.
    #[error("carrier {carrier} has no service available: {message}")]
    NoServiceAvailable {
        /// Carrier.
        carrier: Carrier,
        /// Carrier message.
        message: String,
    },

    /// Input failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Resource missing or not owned by the caller.
    #[error("{resource} {id} not found")]
    NotFound {
        /// Resource type.
        resource: &'static str,
        /// Resource identifier.
        id: String,
    },

    /// Operation not allowed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Persistence failure.
    #[error("persistence error: {0}")]
    Repository(#[from] RepositoryError),

    /// Unexpected failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QuoteError {
    /// Creates a carrier unavailable error.
    #[must_use]
    pub fn carrier_unavailable(carrier: Carrier) -> Self {
        Self::CarrierUnavailable { carrier }
    }

    /// Creates a carrier timeout error.
    #[must_use]
    pub fn carrier_timeout(carrier: Carrier, attempts: u32, last_error: impl Into<String>) -> Self {
        Self::CarrierTimeout {
            carrier,
            attempts,
            last_error: last_error.into(),
        }
    }

    /// Creates a no service available error.
    #[must_use]
    pub fn no_service_available(carrier: Carrier, message: impl Into<String>) -> Self {
        Self::NoServiceAvailable {
            carrier,
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a quote not found error.
    #[must_use]
    pub fn quote_not_found(id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource: "quote",
            id: id.to_string(),
        }
    }

    /// Creates an invalid state error.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable code of this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedCarrier(_) => ErrorCode::UnsupportedCarrier,
            Self::CarrierUnavailable { .. } => ErrorCode::CarrierUnavailable,
            Self::CarrierTimeout { .. } => ErrorCode::CarrierTimeout,
            Self::NoServiceAvailable { .. } => ErrorCode::NoServiceAvailable,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::InvalidState(_) => ErrorCode::InvalidState,
            Self::Repository(_) => ErrorCode::PersistenceError,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Caller-facing class of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::CarrierUnavailable { .. }
            | Self::CarrierTimeout { .. }
            | Self::NoServiceAvailable { .. } => ErrorClass::ServiceUnavailable,
            Self::UnsupportedCarrier(_) | Self::InvalidArgument(_) | Self::InvalidState(_) => {
                ErrorClass::ClientError
            }
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Repository(_) | Self::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Returns true if the caller may retry later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::ServiceUnavailable
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if every carrier attempt was exhausted.
    #[must_use]
    pub fn is_carrier_timeout(&self) -> bool {
        matches!(self, Self::CarrierTimeout { .. })
    }

    /// Error payload recorded on a failed quote.
    #[must_use]
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload::new(self.code().as_str(), self.to_string())
    }
}

impl From<DomainError> for QuoteError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidArgument(message) => Self::InvalidArgument(message),
            other => Self::InvalidState(other.to_string()),
        }
    }
}

impl From<UnsupportedCarrierError> for QuoteError {
    fn from(error: UnsupportedCarrierError) -> Self {
        Self::UnsupportedCarrier(error.0)
    }
}

/// Result type for quote operations.
pub type QuoteResult<T> = Result<T, QuoteError>;

/// A failed quote request, carrying the correlation id of the request.
#[derive(Debug, Error)]
#[error("{error} (correlation id {correlation_id})")]
pub struct QuoteFailure {
    /// Underlying error.
    #[source]
    pub error: QuoteError,
    /// Correlation id of the failed request.
    pub correlation_id: CorrelationId,
    /// Quote recorded for the failed request, when one was created.
    pub quote_id: Option<QuoteId>,
}

impl QuoteFailure {
    /// Wraps an error with its correlation id.
    #[must_use]
    pub fn new(error: QuoteError, correlation_id: CorrelationId) -> Self {
        Self {
            error,
            correlation_id,
            quote_id: None,
        }
    }

    /// Sets the recorded quote id.
    #[must_use]
    pub fn with_quote_id(mut self, quote_id: QuoteId) -> Self {
        self.quote_id = Some(quote_id);
        self
    }

    /// Stable code of the underlying error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.error.code()
    }
}
