//! # API Layer
//!
//! External interfaces of the quote broker.
//!
//! - [`rest`]: JSON over HTTP with axum

pub mod rest;
