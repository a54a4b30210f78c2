//! # REST API
//!
//! HTTP surface of the quote broker, built on axum.
//!
//! Callers identify themselves with the `x-client-id` header. Every response
//! carries `x-correlation-id`, echoed from the request or generated.
//!
//! # Endpoints
//!
//! ## Quotes
//! - `POST /api/v1/quotes` - Create a quote (201)
//! - `GET /api/v1/quotes` - List quotes with filters and cursor pagination
//! - `GET /api/v1/quotes/{id}` - Get a quote
//! - `POST /api/v1/quotes/{id}/label` - Generate a PDF label
//!
//! ## Carriers
//! - `GET /api/v1/carriers` - Registered carriers and breaker state
//! - `GET /api/v1/carriers/{name}/test` - Connectivity probe (when enabled)
//!
//! ## Health
//! - `GET /api/v1/health` - Liveness
//!
//! # Usage
//!
//! ```ignore
//! use shipquote::api::rest::{create_router, AppState};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState {
//!     lifecycle: /* ... */,
//!     labels: /* ... */,
//!     enable_carrier_probe: false,
//! });
//!
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use error::{ApiError, ErrorResponse};
pub use handlers::{
    AppState, CarrierStatus, CarriersResponse, CreateQuoteRequest, HealthResponse,
    ListQuotesQuery, ProbeResponse, QuoteListResponse, QuoteResponse,
};
pub use middleware::{CLIENT_ID_HEADER, CORRELATION_ID_HEADER, RequestContext};
pub use routes::create_router;
