//! # Domain Entities
//!
//! - [`ShipmentRequest`]: validated, immutable shipment description
//! - [`NormalizedCarrierResponse`]: carrier reply in carrier-neutral form
//! - [`Quote`]: quote aggregate with its lifecycle state machine

pub mod carrier_response;
pub mod quote;
pub mod shipment;

pub use carrier_response::NormalizedCarrierResponse;
pub use quote::{ErrorPayload, LabelInfo, Quote};
pub use shipment::{Dimensions, ShipmentRequest, ShipmentRequestBuilder};
