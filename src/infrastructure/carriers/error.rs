//! # Carrier Errors
//!
//! Error types for carrier adapter operations.
//!
//! These never leave the application layer: the orchestrator converts them
//! into [`QuoteError`](crate::application::error::QuoteError).
//!
//! # Examples
//!
//! ```
//! use shipquote::infrastructure::carriers::error::CarrierError;
//!
//! let error = CarrierError::timeout_with_duration("carrier did not answer", 10_000);
//! assert!(error.is_retryable());
//!
//! let error = CarrierError::no_service_available("no usable shipping option");
//! assert!(error.is_no_service_available());
//! ```

use thiserror::Error;

/// Error type for carrier adapter operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CarrierError {
    /// Request timed out.
    #[error("carrier timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
        /// Timeout duration in milliseconds.
        timeout_ms: Option<u64>,
    },

    /// Network or connection error, including carrier 5xx replies.
    #[error("carrier connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Credentials rejected by the carrier.
    #[error("carrier authentication error: {message}")]
    Authentication {
        /// Error message.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("carrier rate limit exceeded: {message}")]
    RateLimited {
        /// Error message.
        message: String,
    },

    /// Carrier rejected the request parameters.
    #[error("carrier invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// Carrier answered but offered no usable service.
    #[error("no service available: {message}")]
    NoServiceAvailable {
        /// Error message.
        message: String,
    },

    /// Unexpected response shape.
    #[error("carrier protocol error: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// Local failure building or sending the request.
    #[error("carrier internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl CarrierError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: None,
        }
    }

    /// Creates a timeout error with duration.
    #[must_use]
    pub fn timeout_with_duration(message: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: Some(timeout_ms),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a no service available error.
    #[must_use]
    pub fn no_service_available(message: impl Into<String>) -> Self {
        Self::NoServiceAvailable {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error is transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection { .. } | Self::RateLimited { .. }
        )
    }

    /// Returns true if the carrier rejected the request itself.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. } | Self::Authentication { .. }
        )
    }

    /// Returns true if the carrier answered with zero usable options.
    ///
    /// The orchestrator treats this as a final answer rather than a failure.
    #[must_use]
    pub fn is_no_service_available(&self) -> bool {
        matches!(self, Self::NoServiceAvailable { .. })
    }

    /// Returns true if this is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns the message without the variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Timeout { message, .. }
            | Self::Connection { message }
            | Self::Authentication { message }
            | Self::RateLimited { message }
            | Self::InvalidRequest { message }
            | Self::NoServiceAvailable { message }
            | Self::Protocol { message }
            | Self::Internal { message } => message,
        }
    }
}

/// Result type for carrier operations.
pub type CarrierResult<T> = Result<T, CarrierError>;
