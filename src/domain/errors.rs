//! # Domain Errors
//!
//! Errors raised when a business rule is violated.

use crate::domain::value_objects::QuoteStatus;
use thiserror::Error;

/// Error type for domain rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// An argument failed validation (negative cost, malformed shipment field).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A quote state transition that the lifecycle does not allow.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// Current state.
        from: QuoteStatus,
        /// Requested state.
        to: QuoteStatus,
    },

    /// Operation requires a different quote state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl DomainError {
    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates an invalid state error.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Returns true if this is an argument validation failure.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
