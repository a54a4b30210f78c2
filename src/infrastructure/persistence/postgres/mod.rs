//! # PostgreSQL Repositories
//!
//! sqlx-backed repository implementations.

pub mod quote_repository;

pub use quote_repository::PostgresQuoteRepository;
