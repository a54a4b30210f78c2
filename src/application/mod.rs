//! # Application Layer
//!
//! Use cases of the quote broker, built on the domain and driven through
//! infrastructure adapters.
//!
//! - [`services`]: orchestration, circuit breaking, quote lifecycle, labels
//! - [`error`]: error taxonomy shared by every use case

pub mod error;
pub mod services;

pub use error::{ErrorClass, ErrorCode, QuoteError, QuoteFailure, QuoteResult};
pub use services::{
    BreakerSnapshot, CarrierOrchestrator, CircuitBreaker, CircuitBreakerConfig, GeneratedLabel,
    LabelService, OrchestratorConfig, QuoteLifecycleManager,
};
