//! # Frenet Adapter
//!
//! Carrier adapter for the Frenet shipping-quote API.
//!
//! Frenet answers `POST /shipping/quote` with an array of shipping options,
//! each carrying a list of services. The adapter picks the cheapest usable
//! service across all options, keeping the first one on ties.

use crate::domain::entities::{NormalizedCarrierResponse, ShipmentRequest};
use crate::domain::value_objects::{Carrier, Timestamp};
use crate::infrastructure::carriers::error::{CarrierError, CarrierResult};
use crate::infrastructure::carriers::http_client::HttpClient;
use crate::infrastructure::carriers::traits::{CarrierAdapter, CarrierRequest, CarrierResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tokio::time::Instant;
use tracing::debug;

/// Default Frenet API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.frenet.com.br";

const QUOTE_PATH: &str = "/shipping/quote";

/// Frenet connection settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrenetConfig {
    /// API base URL.
    pub base_url: String,
    /// Access token; preferred over the API key.
    pub token: Option<String>,
    /// API key.
    pub api_key: Option<String>,
}

impl FrenetConfig {
    /// Creates settings for `base_url` without credentials.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            api_key: None,
        }
    }

    /// Sets the access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Credential sent in the `token` header: the token, else the API key.
    #[must_use]
    pub fn credential(&self) -> &str {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.api_key.as_deref())
            .unwrap_or_default()
    }
}

impl Default for FrenetConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl fmt::Debug for FrenetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrenetConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// One package in a Frenet quote request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrenetProduct {
    /// Weight in kg.
    #[serde(with = "rust_decimal::serde::float")]
    pub weight: Decimal,
    /// Height in cm.
    #[serde(with = "rust_decimal::serde::float")]
    pub height: Decimal,
    /// Width in cm.
    #[serde(with = "rust_decimal::serde::float")]
    pub width: Decimal,
    /// Length in cm.
    #[serde(with = "rust_decimal::serde::float")]
    pub length: Decimal,
    /// Number of identical packages.
    pub quantity: u32,
}

/// Body of `POST /shipping/quote`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrenetQuoteRequest {
    /// Origin postal code, digits only.
    pub zip_code_origin: String,
    /// Destination postal code, digits only.
    pub zip_code_destination: String,
    /// Packages.
    pub products: Vec<FrenetProduct>,
    /// Declared value; zero when not declared.
    #[serde(with = "rust_decimal::serde::float")]
    pub declared_value: Decimal,
    /// Requested service options.
    pub services: Vec<String>,
}

impl FrenetQuoteRequest {
    /// Builds the Frenet body for a shipment.
    #[must_use]
    pub fn from_shipment(request: &ShipmentRequest) -> Self {
        let dimensions = request.dimensions();
        Self {
            zip_code_origin: request.origin_digits(),
            zip_code_destination: request.destination_digits(),
            products: vec![FrenetProduct {
                weight: request.weight(),
                height: dimensions.height,
                width: dimensions.width,
                length: dimensions.length,
                quantity: 1,
            }],
            declared_value: request.declared_value().unwrap_or(Decimal::ZERO),
            services: request.service_options().iter().cloned().collect(),
        }
    }
}

/// One service inside a Frenet shipping option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrenetShippingService {
    /// Service code.
    #[serde(default)]
    pub service_code: Option<String>,
    /// Service name.
    #[serde(default)]
    pub service_name: Option<String>,
    /// Price quoted for this service.
    #[serde(default)]
    pub shipping_price: Option<Decimal>,
    /// Delivery time in days.
    #[serde(default, deserialize_with = "lenient_days")]
    pub delivery_time: Option<u32>,
    /// Set when Frenet could not price this service.
    #[serde(default)]
    pub error: Option<bool>,
    /// Message accompanying an error.
    #[serde(default)]
    pub msg: Option<String>,
}

impl FrenetShippingService {
    fn usable_price(&self) -> Option<Decimal> {
        if self.error == Some(true) {
            return None;
        }
        self.shipping_price.filter(|price| *price >= Decimal::ZERO)
    }
}

/// One shipping option of a Frenet reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrenetShippingOption {
    /// Services offered under this option.
    #[serde(default)]
    pub shipping_services: Vec<FrenetShippingService>,
}

/// Frenet reply: an array of shipping options.
pub type FrenetQuoteResponse = Vec<FrenetShippingOption>;

fn lenient_days<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|d| u32::try_from(d).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Returns the cheapest usable service, keeping the first on ties.
fn select_cheapest(options: &[FrenetShippingOption]) -> Option<(&FrenetShippingService, Decimal)> {
    options
        .iter()
        .flat_map(|option| option.shipping_services.iter())
        .filter_map(|service| service.usable_price().map(|price| (service, price)))
        .fold(None, |best, (service, price)| match best {
            Some((_, best_price)) if best_price <= price => best,
            _ => Some((service, price)),
        })
}

/// Frenet carrier adapter.
#[derive(Debug, Clone)]
pub struct FrenetAdapter {
    config: FrenetConfig,
    http: HttpClient,
}

impl FrenetAdapter {
    /// Creates an adapter.
    ///
    /// `timeout_ms` caps every request made by the underlying client.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError::Internal` if the HTTP client cannot be built.
    pub fn new(config: FrenetConfig, timeout_ms: u64) -> CarrierResult<Self> {
        Ok(Self {
            config,
            http: HttpClient::new(timeout_ms)?,
        })
    }

    /// Adapter settings.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FrenetConfig {
        &self.config
    }

    fn quote_url(&self) -> String {
        format!("{}{QUOTE_PATH}", self.config.base_url.trim_end_matches('/'))
    }

    fn headers(&self) -> CarrierResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(self.config.credential())
            .map_err(|_| CarrierError::authentication("token is not a valid header value"))?;
        headers.insert("token", token);
        Ok(headers)
    }
}

#[async_trait]
impl CarrierAdapter for FrenetAdapter {
    fn carrier(&self) -> Carrier {
        Carrier::Frenet
    }

    fn normalize_request(&self, request: &ShipmentRequest) -> CarrierRequest {
        CarrierRequest::Frenet(FrenetQuoteRequest::from_shipment(request))
    }

    async fn call_carrier(
        &self,
        request: &CarrierRequest,
        deadline: Instant,
    ) -> CarrierResult<CarrierResponse> {
        let CarrierRequest::Frenet(body) = request;

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(CarrierError::timeout("deadline passed before request was sent"));
        }

        debug!(
            url = %self.quote_url(),
            remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
            "calling Frenet"
        );

        let options: FrenetQuoteResponse = self
            .http
            .post_with_headers(&self.quote_url(), body, self.headers()?, Some(remaining))
            .await?;

        Ok(CarrierResponse::Frenet(options))
    }

    fn normalize_response(
        &self,
        response: CarrierResponse,
        _request: &ShipmentRequest,
    ) -> CarrierResult<NormalizedCarrierResponse> {
        let CarrierResponse::Frenet(options) = response;

        let (service, price) = select_cheapest(&options).ok_or_else(|| {
            CarrierError::no_service_available("no shipping services available from Frenet")
        })?;

        let raw = serde_json::to_value(service)
            .map_err(|e| CarrierError::protocol(format!("failed to retain service: {e}")))?;
        let code = service.service_code.clone().unwrap_or_default();

        let mut normalized = NormalizedCarrierResponse::new(price, code, raw)
            .map_err(|e| CarrierError::protocol(e.to_string()))?;
        if let Some(name) = service.service_name.as_deref().filter(|n| !n.is_empty()) {
            normalized = normalized.with_service_name(name);
        }
        if let Some(days) = service.delivery_time {
            normalized =
                normalized.with_estimated_delivery(Timestamp::now().add_days(i64::from(days)));
        }
        Ok(normalized)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::entities::Dimensions;
    use serde_json::json;
    use std::str::FromStr;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn shipment() -> ShipmentRequest {
        ShipmentRequest::builder(
            "01310-100",
            "04547-000",
            Decimal::from_str("2.5").unwrap(),
            Dimensions::new(Decimal::from(30), Decimal::from(20), Decimal::from(10)),
        )
        .service_option("tracking")
        .declared_value(Decimal::from(150))
        .build()
        .unwrap()
    }

    fn adapter(base_url: &str) -> FrenetAdapter {
        FrenetAdapter::new(FrenetConfig::new(base_url).with_token("tok-123"), 5_000).unwrap()
    }

    fn service(code: &str, price: serde_json::Value) -> serde_json::Value {
        json!({
            "serviceCode": code,
            "serviceName": format!("Service {code}"),
            "shippingPrice": price,
            "deliveryTime": 3
        })
    }

    fn parse(value: serde_json::Value) -> CarrierResponse {
        CarrierResponse::Frenet(serde_json::from_value(value).unwrap())
    }

    mod config {
        use super::*;

        #[test]
        fn token_preferred_over_api_key() {
            let config = FrenetConfig::default().with_api_key("key").with_token("tok");
            assert_eq!(config.credential(), "tok");
            assert_eq!(FrenetConfig::default().with_api_key("key").credential(), "key");
            assert_eq!(FrenetConfig::default().credential(), "");
        }

        #[test]
        fn debug_redacts_credentials() {
            let config = FrenetConfig::default().with_token("secret");
            assert!(!format!("{config:?}").contains("secret"));
        }
    }

    mod normalize_request {
        use super::*;

        #[test]
        fn maps_shipment_fields() {
            let request = FrenetQuoteRequest::from_shipment(&shipment());
            assert_eq!(request.zip_code_origin, "01310100");
            assert_eq!(request.zip_code_destination, "04547000");
            assert_eq!(request.products.len(), 1);
            assert_eq!(request.products[0].quantity, 1);
            assert_eq!(request.services, vec!["tracking".to_string()]);

            let body = serde_json::to_value(&request).unwrap();
            assert_eq!(body["products"][0]["weight"], json!(2.5));
            assert_eq!(body["declaredValue"], json!(150.0));
        }

        #[test]
        fn missing_declared_value_is_zero() {
            let shipment = ShipmentRequest::builder(
                "01310100",
                "04547000",
                Decimal::ONE,
                Dimensions::new(Decimal::ONE, Decimal::ONE, Decimal::ONE),
            )
            .build()
            .unwrap();
            let request = FrenetQuoteRequest::from_shipment(&shipment);
            assert_eq!(request.declared_value, Decimal::ZERO);
            assert!(request.services.is_empty());
        }
    }

    mod normalize_response {
        use super::*;

        #[test]
        fn selects_cheapest_service() {
            let adapter = adapter(DEFAULT_BASE_URL);
            let response = parse(json!([{
                "shippingServices": [
                    service("04014", json!(32.5)),
                    service("04510", json!("21.90")),
                    service("03220", json!(45.0)),
                ]
            }]));

            let normalized = adapter.normalize_response(response, &shipment()).unwrap();
            assert_eq!(normalized.negotiated_cost(), Decimal::from_str("21.90").unwrap());
            assert_eq!(normalized.carrier_service_id(), "04510");
            assert_eq!(normalized.service_name(), Some("Service 04510"));
            assert!(normalized.estimated_delivery().is_some());
            assert_eq!(normalized.raw()["serviceCode"], "04510");
        }

        #[test]
        fn first_wins_on_tie() {
            let adapter = adapter(DEFAULT_BASE_URL);
            let response = parse(json!([{
                "shippingServices": [service("A", json!(10)), service("B", json!(10))]
            }]));
            let normalized = adapter.normalize_response(response, &shipment()).unwrap();
            assert_eq!(normalized.carrier_service_id(), "A");
        }

        #[test]
        fn skips_services_with_errors() {
            let adapter = adapter(DEFAULT_BASE_URL);
            let response = parse(json!([{
                "shippingServices": [
                    {"serviceCode": "X", "error": true, "msg": "CEP invalido", "shippingPrice": 1},
                    {"serviceCode": "Y"},
                    service("Z", json!(12)),
                ]
            }]));
            let normalized = adapter.normalize_response(response, &shipment()).unwrap();
            assert_eq!(normalized.carrier_service_id(), "Z");
        }

        #[test]
        fn empty_reply_is_no_service_available() {
            let adapter = adapter(DEFAULT_BASE_URL);
            let err = adapter
                .normalize_response(parse(json!([])), &shipment())
                .unwrap_err();
            assert!(err.is_no_service_available());

            let err = adapter
                .normalize_response(parse(json!([{"shippingServices": []}])), &shipment())
                .unwrap_err();
            assert!(err.is_no_service_available());
        }

        #[test]
        fn delivery_time_accepts_strings() {
            let parsed: FrenetShippingService =
                serde_json::from_value(json!({"deliveryTime": "5"})).unwrap();
            assert_eq!(parsed.delivery_time, Some(5));
            let parsed: FrenetShippingService =
                serde_json::from_value(json!({"deliveryTime": "soon"})).unwrap();
            assert_eq!(parsed.delivery_time, None);
        }
    }

    mod call_carrier {
        use super::*;

        #[tokio::test]
        async fn posts_body_with_token_header() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/shipping/quote"))
                .and(header("token", "tok-123"))
                .and(body_partial_json(json!({
                    "zipCodeOrigin": "01310100",
                    "zipCodeDestination": "04547000"
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                    "shippingServices": [service("04014", json!(19.9))]
                }])))
                .expect(1)
                .mount(&server)
                .await;

            let adapter = adapter(&server.uri());
            let request = adapter.normalize_request(&shipment());
            let deadline = Instant::now() + Duration::from_secs(5);
            let response = adapter.call_carrier(&request, deadline).await.unwrap();

            let normalized = adapter.normalize_response(response, &shipment()).unwrap();
            assert_eq!(normalized.negotiated_cost(), Decimal::from_str("19.9").unwrap());
        }

        #[tokio::test]
        async fn maps_server_error_to_connection() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(503))
                .mount(&server)
                .await;

            let adapter = adapter(&server.uri());
            let request = adapter.normalize_request(&shipment());
            let err = adapter
                .call_carrier(&request, Instant::now() + Duration::from_secs(5))
                .await
                .unwrap_err();
            assert!(matches!(err, CarrierError::Connection { .. }));
        }

        #[tokio::test]
        async fn maps_unauthorized_to_authentication() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
                .mount(&server)
                .await;

            let adapter = adapter(&server.uri());
            let request = adapter.normalize_request(&shipment());
            let err = adapter
                .call_carrier(&request, Instant::now() + Duration::from_secs(5))
                .await
                .unwrap_err();
            assert!(err.is_client_error());
        }

        #[tokio::test]
        async fn slow_reply_times_out_at_deadline() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([]))
                        .set_delay(Duration::from_secs(2)),
                )
                .mount(&server)
                .await;

            let adapter = adapter(&server.uri());
            let request = adapter.normalize_request(&shipment());
            let err = adapter
                .call_carrier(&request, Instant::now() + Duration::from_millis(100))
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn expired_deadline_fails_without_request() {
            let adapter = adapter("http://127.0.0.1:9");
            let request = adapter.normalize_request(&shipment());
            let err = adapter
                .call_carrier(&request, Instant::now())
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn malformed_reply_is_protocol_error() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": 1})))
                .mount(&server)
                .await;

            let adapter = adapter(&server.uri());
            let request = adapter.normalize_request(&shipment());
            let err = adapter
                .call_carrier(&request, Instant::now() + Duration::from_secs(5))
                .await
                .unwrap_err();
            assert!(matches!(err, CarrierError::Protocol { .. }));
        }
    }
}
