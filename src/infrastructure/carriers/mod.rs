//! # Carrier Adapters
//!
//! Integrations with external carrier rate APIs.
//!
//! - [`traits`]: the [`CarrierAdapter`] port and wire-shape enums
//! - [`error`]: adapter error type
//! - [`http_client`]: shared `reqwest` wrapper
//! - [`frenet`]: Frenet adapter
//! - [`registry`]: carrier to adapter map

pub mod error;
pub mod frenet;
pub mod http_client;
pub mod registry;
pub mod traits;

pub use error::{CarrierError, CarrierResult};
pub use frenet::{FrenetAdapter, FrenetConfig};
pub use registry::CarrierRegistry;
pub use traits::{CarrierAdapter, CarrierRequest, CarrierResponse};
