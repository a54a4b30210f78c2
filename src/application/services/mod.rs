//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! - [`CircuitBreaker`]: per-carrier failure tracking
//! - [`CarrierOrchestrator`]: timeout, retry and breaker policy around adapters
//! - [`QuoteLifecycleManager`]: quote creation, lookup and listing
//! - [`LabelService`]: label generation for successful quotes

pub mod carrier_orchestrator;
pub mod circuit_breaker;
pub mod label_service;
pub mod quote_lifecycle;

pub use carrier_orchestrator::{CarrierOrchestrator, OrchestratorConfig};
pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig};
pub use label_service::{GeneratedLabel, LabelService};
pub use quote_lifecycle::QuoteLifecycleManager;
