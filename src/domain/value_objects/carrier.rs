//! # Carrier
//!
//! Closed enumeration of the carriers the broker can quote against.
//!
//! Carrier names arriving from callers are parsed here, at the boundary, so
//! an unknown carrier never reaches the orchestration loop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A supported shipping carrier.
///
/// # Examples
///
/// ```
/// use shipquote::domain::value_objects::Carrier;
///
/// let carrier: Carrier = "FRENET".parse().unwrap();
/// assert_eq!(carrier, Carrier::Frenet);
/// assert_eq!(carrier.as_str(), "frenet");
/// assert!("dhl".parse::<Carrier>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Carrier {
    /// Frenet shipping-rate aggregator.
    Frenet,
}

impl Carrier {
    /// All supported carriers.
    pub const ALL: [Carrier; 1] = [Carrier::Frenet];

    /// Stable lowercase identifier, used as breaker and registry key.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Frenet => "frenet",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a carrier name is not supported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("carrier {0} not supported")]
pub struct UnsupportedCarrierError(pub String);

impl FromStr for Carrier {
    type Err = UnsupportedCarrierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "frenet" => Ok(Self::Frenet),
            _ => Err(UnsupportedCarrierError(s.to_string())),
        }
    }
}
