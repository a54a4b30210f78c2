//! # In-Memory Repositories
//!
//! In-memory implementations for tests and database-less deployments.
//!
//! All implementations use `Arc<RwLock<HashMap>>` for thread-safe access.

pub mod quote_repository;

pub use quote_repository::InMemoryQuoteRepository;
