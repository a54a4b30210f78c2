//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`QuoteId`]: UUID-based quote identifier
//! - [`ClientId`]: owning client identifier
//! - [`CorrelationId`]: caller-supplied request tracing token
//!
//! ## Domain Enums
//!
//! - [`Carrier`]: supported carriers (closed set)
//! - [`QuoteStatus`]: quote lifecycle states
//!
//! ## Time
//!
//! - [`Timestamp`]: UTC instant

pub mod carrier;
pub mod ids;
pub mod quote_status;
pub mod timestamp;

pub use carrier::{Carrier, UnsupportedCarrierError};
pub use ids::{ClientId, CorrelationId, QuoteId};
pub use quote_status::{InvalidQuoteStatusError, QuoteStatus};
pub use timestamp::Timestamp;
