//! # Request Context Middleware
//!
//! Correlation ids and caller identity.
//!
//! Every request carries a correlation id: the `x-correlation-id` header when
//! the caller sends one, otherwise a generated UUID. It is stored in the
//! request extensions for handlers and echoed on the response.

use crate::api::rest::error::ApiError;
use crate::domain::value_objects::{ClientId, CorrelationId};
use axum::extract::{FromRequestParts, Request};
use axum::http::HeaderValue;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

/// Header carrying the correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Header carrying the caller's client id.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

fn header_str<'a>(parts: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    parts
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Assigns a correlation id to the request and echoes it on the response.
pub async fn correlation_id(mut request: Request, next: Next) -> Response {
    let id = header_str(request.headers(), CORRELATION_ID_HEADER)
        .map(ToString::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(CorrelationId::new(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

/// Correlation id of the current request.
///
/// Falls back to a fresh id when the middleware did not run.
#[derive(Debug, Clone)]
pub struct RequestCorrelation(pub CorrelationId);

impl<S: Send + Sync> FromRequestParts<S> for RequestCorrelation {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(correlation_of(parts)))
    }
}

/// Authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Owning client.
    pub client_id: ClientId,
    /// Correlation id.
    pub correlation_id: CorrelationId,
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = correlation_of(parts);
        let Some(client) = header_str(&parts.headers, CLIENT_ID_HEADER) else {
            return Err(ApiError::unauthorized(
                format!("missing {CLIENT_ID_HEADER} header"),
                correlation_id,
            ));
        };
        Ok(Self {
            client_id: ClientId::new(client),
            correlation_id,
        })
    }
}

fn correlation_of(parts: &Parts) -> CorrelationId {
    parts
        .extensions
        .get::<CorrelationId>()
        .cloned()
        .unwrap_or_else(|| CorrelationId::new(Uuid::new_v4().to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::routing::get;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                get(|RequestCorrelation(id): RequestCorrelation| async move { id.to_string() }),
            )
            .layer(axum::middleware::from_fn(correlation_id))
    }

    #[tokio::test]
    async fn echoes_supplied_correlation_id() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header(CORRELATION_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(CORRELATION_ID_HEADER).unwrap(),
            "abc-123"
        );
    }

    #[tokio::test]
    async fn generates_missing_correlation_id() {
        let response = app()
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }
}
