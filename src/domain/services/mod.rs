//! # Domain Services
//!
//! Pure domain logic that doesn't belong to a single entity.
//!
//! - [`billing::BillingCalculator`]: negotiated cost to sale price

pub mod billing;

pub use billing::BillingCalculator;
