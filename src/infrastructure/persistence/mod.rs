//! # Persistence Layer
//!
//! Quote storage.
//!
//! ## Repository Traits (Ports)
//!
//! - [`QuoteRepository`]: persistence for quotes, scoped per client
//!
//! ## Implementations
//!
//! - `in_memory`: `Arc<RwLock<HashMap>>` store for tests and local runs
//! - `postgres`: sqlx store with JSONB documents

pub mod in_memory;
pub mod postgres;
pub mod traits;

pub use in_memory::InMemoryQuoteRepository;
pub use postgres::PostgresQuoteRepository;
pub use traits::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, QuoteFilter, QuotePage, QuoteRepository, RepositoryError,
    RepositoryResult,
};
