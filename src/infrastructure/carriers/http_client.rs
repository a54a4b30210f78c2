//! # HTTP Client Utilities
//!
//! Shared HTTP client for carrier adapters.
//!
//! Wraps `reqwest` with JSON handling, status-code classification and a
//! per-request deadline so an attempt abandoned by the orchestrator also
//! releases its connection.
//!
//! # Examples
//!
//! ```ignore
//! use shipquote::infrastructure::carriers::http_client::HttpClient;
//!
//! let client = HttpClient::new(10_000)?;
//! let reply: serde_json::Value = client
//!     .post_with_headers(url, &body, headers, Some(remaining))
//!     .await?;
//! ```

use crate::infrastructure::carriers::error::{CarrierError, CarrierResult};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client wrapper for carrier adapters.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a client whose requests never outlive `timeout_ms`.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError::Internal` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> CarrierResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| CarrierError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a POST request with a JSON body and custom headers.
    ///
    /// When `timeout` is given it bounds this request in addition to the
    /// client-wide timeout.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError::Timeout` or `CarrierError::Connection` if the
    /// request fails, a status-specific error for non-2xx replies, and
    /// `CarrierError::Protocol` if the body cannot be parsed.
    pub async fn post_with_headers<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        headers: HeaderMap,
        timeout: Option<Duration>,
    ) -> CarrierResult<T> {
        let mut request = self.client.post(url).json(body).headers(headers);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> CarrierResult<T> {
    let status = response.status();

    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| CarrierError::protocol(format!("failed to parse response: {e}")))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }
}

fn map_reqwest_error(error: reqwest::Error) -> CarrierError {
    if error.is_timeout() {
        CarrierError::timeout("request timed out")
    } else if error.is_connect() {
        CarrierError::connection(format!("connection failed: {error}"))
    } else {
        CarrierError::connection(format!("HTTP request failed: {error}"))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> CarrierError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            CarrierError::invalid_request(format!("bad request: {body}"))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CarrierError::authentication(format!("authentication failed: {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => CarrierError::rate_limited("rate limit exceeded"),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CarrierError::timeout(format!("carrier timed out ({status})"))
        }
        s if s.is_server_error() => {
            CarrierError::connection(format!("server error ({status}): {body}"))
        }
        _ => CarrierError::protocol(format!("HTTP error ({status}): {body}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn new_client() {
        let client = HttpClient::new(5000).unwrap();
        assert_eq!(client.timeout_ms(), 5000);
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            map_status_error(StatusCode::UNAUTHORIZED, ""),
            CarrierError::Authentication { .. }
        ));
        assert!(matches!(
            map_status_error(StatusCode::BAD_REQUEST, "zip"),
            CarrierError::InvalidRequest { .. }
        ));
        assert!(map_status_error(StatusCode::BAD_GATEWAY, "").is_retryable());
        assert!(map_status_error(StatusCode::GATEWAY_TIMEOUT, "").is_timeout());
        assert!(matches!(
            map_status_error(StatusCode::NOT_FOUND, ""),
            CarrierError::Protocol { .. }
        ));
    }
}
