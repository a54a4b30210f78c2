//! # Quote Status
//!
//! Quote lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//! Pending ──► Processing ──┬──► Success
//!                          ├──► Error
//!                          └──► CarrierTimeout
//! ```
//!
//! `Pending` is an external-facing default reserved for future states; the
//! quote path itself starts in `Processing`.
//!
//! # Examples
//!
//! ```
//! use shipquote::domain::value_objects::QuoteStatus;
//!
//! let state = QuoteStatus::Processing;
//! assert!(state.can_transition_to(QuoteStatus::Success));
//! assert!(!QuoteStatus::Success.can_transition_to(QuoteStatus::Error));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle state of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Reserved external default; not produced by the quote path.
    Pending,
    /// Carrier call in flight.
    #[default]
    Processing,
    /// Carrier answered and the sale price was computed (terminal).
    Success,
    /// Carrier or pricing failure other than exhaustion (terminal).
    Error,
    /// All carrier attempts failed or timed out (terminal).
    CarrierTimeout,
}

impl QuoteStatus {
    /// Returns true if this is a terminal state.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::CarrierTimeout)
    }

    /// Returns true if this state can transition to the target state.
    ///
    /// - Pending → Processing
    /// - Processing → Success, Error, CarrierTimeout
    /// - Terminal states → (none)
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Success)
                | (Self::Processing, Self::Error)
                | (Self::Processing, Self::CarrierTimeout)
        )
    }

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Error => "error",
            Self::CarrierTimeout => "carrier_timeout",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid quote status: {0}")]
pub struct InvalidQuoteStatusError(pub String);

impl FromStr for QuoteStatus {
    type Err = InvalidQuoteStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "carrier_timeout" => Ok(Self::CarrierTimeout),
            _ => Err(InvalidQuoteStatusError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!QuoteStatus::Pending.is_terminal());
        assert!(!QuoteStatus::Processing.is_terminal());
        assert!(QuoteStatus::Success.is_terminal());
        assert!(QuoteStatus::Error.is_terminal());
        assert!(QuoteStatus::CarrierTimeout.is_terminal());
    }

    #[test]
    fn processing_reaches_every_terminal() {
        for target in [
            QuoteStatus::Success,
            QuoteStatus::Error,
            QuoteStatus::CarrierTimeout,
        ] {
            assert!(QuoteStatus::Processing.can_transition_to(target));
        }
    }

    #[test]
    fn terminal_states_are_final() {
        for from in [
            QuoteStatus::Success,
            QuoteStatus::Error,
            QuoteStatus::CarrierTimeout,
        ] {
            assert!(!from.can_transition_to(QuoteStatus::Processing));
            assert!(!from.can_transition_to(QuoteStatus::Success));
        }
    }

    #[test]
    fn wire_names() {
        assert_eq!(
            serde_json::to_string(&QuoteStatus::CarrierTimeout).unwrap(),
            "\"carrier_timeout\""
        );
        assert_eq!(
            QuoteStatus::from_str("carrier_timeout").unwrap(),
            QuoteStatus::CarrierTimeout
        );
        assert!(QuoteStatus::from_str("done").is_err());
    }
}
