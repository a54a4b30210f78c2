//! # Domain Layer
//!
//! Business types and rules of the quote broker, free of I/O.
//!
//! - [`value_objects`]: identifiers, carriers, quote status, timestamps
//! - [`entities`]: shipment requests, normalized carrier responses, quotes
//! - [`services`]: pure domain services such as billing
//! - [`errors`]: domain error type

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::{DomainError, DomainResult};
