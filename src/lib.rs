//! # shipquote
//!
//! Shipping-rate quote broker.
//!
//! Accepts a shipment description, asks an external carrier rate API for a
//! price, converts the carrier's negotiated cost into a sale price and records
//! the outcome as a [`Quote`](domain::entities::Quote).
//!
//! # Architecture
//!
//! ```text
//! api::rest ──► application::QuoteLifecycleManager
//!                   │             │
//!                   │             └─► domain::services::BillingCalculator
//!                   ▼
//!        application::CarrierOrchestrator ──► application::CircuitBreaker
//!                   │
//!                   ▼
//!        infrastructure::carriers::CarrierAdapter (Frenet, ...)
//!
//! infrastructure::persistence::QuoteRepository (in-memory, PostgreSQL)
//! ```
//!
//! - [`domain`]: value objects, entities and pure domain services
//! - [`application`]: orchestration, circuit breaking and the quote lifecycle
//! - [`infrastructure`]: carrier adapters, persistence and label rendering
//! - [`api`]: REST surface
//! - [`config`] / [`logging`]: process configuration and tracing setup

#![warn(missing_docs)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
