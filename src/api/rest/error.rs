//! # REST Errors
//!
//! Maps application errors onto HTTP responses.
//!
//! | Class                | Status |
//! |----------------------|--------|
//! | `ServiceUnavailable` | 503    |
//! | `ClientError`        | 400    |
//! | `NotFound`           | 404    |
//! | `Internal`           | 500    |

use crate::application::error::{ErrorClass, QuoteError, QuoteFailure};
use crate::domain::value_objects::{CorrelationId, Timestamp};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Correlation id of the failed request.
    pub correlation_id: String,
    /// When the error was produced.
    pub timestamp: Timestamp,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: String,
    message: String,
    correlation_id: CorrelationId,
}

impl ApiError {
    /// Renders an application error.
    #[must_use]
    pub fn from_quote_error(error: &QuoteError, correlation_id: CorrelationId) -> Self {
        Self {
            status: status_for(error.class()),
            code: error.code().to_string(),
            message: error.to_string(),
            correlation_id,
        }
    }

    /// Missing caller identity.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>, correlation_id: CorrelationId) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED".to_string(),
            message: message.into(),
            correlation_id,
        }
    }

    /// Malformed request.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>, correlation_id: CorrelationId) -> Self {
        Self::from_quote_error(&QuoteError::invalid_argument(message), correlation_id)
    }

    /// HTTP status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Error code.
    #[inline]
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl From<QuoteFailure> for ApiError {
    fn from(failure: QuoteFailure) -> Self {
        Self::from_quote_error(&failure.error, failure.correlation_id)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() && self.status != StatusCode::SERVICE_UNAVAILABLE {
            error!(
                correlation_id = %self.correlation_id,
                code = %self.code,
                message = %self.message,
                "request failed"
            );
        } else {
            warn!(
                correlation_id = %self.correlation_id,
                status = self.status.as_u16(),
                code = %self.code,
                message = %self.message,
                "request rejected"
            );
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
            correlation_id: self.correlation_id.to_string(),
            timestamp: Timestamp::now(),
        };
        (self.status, Json(body)).into_response()
    }
}

fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorClass::ClientError => StatusCode::BAD_REQUEST,
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Carrier;
    use crate::infrastructure::persistence::RepositoryError;

    fn corr() -> CorrelationId {
        CorrelationId::new("corr-err")
    }

    #[test]
    fn status_follows_error_class() {
        let cases = [
            (QuoteError::carrier_unavailable(Carrier::Frenet), 503),
            (QuoteError::carrier_timeout(Carrier::Frenet, 2, "timeout"), 503),
            (QuoteError::no_service_available(Carrier::Frenet, "none"), 503),
            (QuoteError::UnsupportedCarrier("dhl".to_string()), 400),
            (QuoteError::invalid_argument("bad"), 400),
            (QuoteError::invalid_state("nope"), 400),
            (QuoteError::quote_not_found("q-1"), 404),
            (QuoteError::from(RepositoryError::connection("down")), 500),
            (QuoteError::internal("boom"), 500),
        ];
        for (error, status) in cases {
            let api = ApiError::from_quote_error(&error, corr());
            assert_eq!(api.status().as_u16(), status, "{error}");
            assert_eq!(api.code(), error.code().as_str());
        }
    }

    #[test]
    fn failure_keeps_correlation_id() {
        let failure = QuoteFailure::new(
            QuoteError::carrier_timeout(Carrier::Frenet, 2, "timeout"),
            corr(),
        );
        let api = ApiError::from(failure);
        assert_eq!(api.correlation_id.as_str(), "corr-err");
        assert_eq!(api.code(), "CARRIER_TIMEOUT");
    }

    #[test]
    fn unauthorized_is_401() {
        let api = ApiError::unauthorized("missing x-client-id header", corr());
        assert_eq!(api.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
