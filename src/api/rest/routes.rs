//! # REST Routes
//!
//! Route table of the quote API.

use crate::api::rest::handlers::{self, AppState};
use crate::api::rest::middleware::correlation_id;
use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Quote routes.
pub fn quote_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/quotes",
            post(handlers::create_quote).get(handlers::list_quotes),
        )
        .route("/quotes/{id}", get(handlers::get_quote))
        .route("/quotes/{id}/label", post(handlers::generate_label))
}

/// Carrier diagnostics routes.
pub fn carrier_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/carriers", get(handlers::list_carriers))
        .route("/carriers/{name}/test", get(handlers::probe_carrier))
}

/// Builds the application router under `/api/v1`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(quote_routes())
        .merge(carrier_routes())
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(from_fn(correlation_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
