//! # REST Handlers
//!
//! Request and response types and the handler functions behind each route.

use crate::api::rest::error::ApiError;
use crate::api::rest::middleware::{RequestContext, RequestCorrelation};
use crate::application::error::QuoteError;
use crate::application::services::{BreakerSnapshot, LabelService, QuoteLifecycleManager};
use crate::domain::entities::{Dimensions, ErrorPayload, LabelInfo, Quote, ShipmentRequest};
use crate::domain::value_objects::{
    Carrier, CorrelationId, QuoteId, QuoteStatus, Timestamp,
};
use crate::infrastructure::persistence::{DEFAULT_PAGE_SIZE, QuoteFilter, QuotePage};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Header carrying the generated label id.
pub const LABEL_ID_HEADER: &str = "x-label-id";

/// Header carrying the generated label URL.
pub const LABEL_URL_HEADER: &str = "x-label-url";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Quote lifecycle.
    pub lifecycle: QuoteLifecycleManager,
    /// Label generation.
    pub labels: LabelService,
    /// Serves the carrier probe endpoint.
    pub enable_carrier_probe: bool,
}

/// Body of `POST /api/v1/quotes`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuoteRequest {
    /// Carrier name; defaults to `frenet`.
    #[serde(default)]
    pub carrier: Option<String>,
    /// Origin postal code.
    pub origin_postal: String,
    /// Destination postal code.
    pub destination_postal: String,
    /// Weight in kg.
    pub weight: Decimal,
    /// Length in cm.
    pub length: Decimal,
    /// Width in cm.
    pub width: Decimal,
    /// Height in cm.
    pub height: Decimal,
    /// Requested service options.
    #[serde(default)]
    pub service_options: Vec<String>,
    /// Declared value.
    #[serde(default)]
    pub declared_value: Option<Decimal>,
}

impl CreateQuoteRequest {
    fn carrier(&self) -> Result<Carrier, QuoteError> {
        match self.carrier.as_deref() {
            None => Ok(Carrier::Frenet),
            Some(name) => Ok(name.parse::<Carrier>()?),
        }
    }

    fn shipment(&self) -> Result<ShipmentRequest, QuoteError> {
        Ok(ShipmentRequest::builder(
            self.origin_postal.clone(),
            self.destination_postal.clone(),
            self.weight,
            Dimensions::new(self.length, self.width, self.height),
        )
        .service_options(self.service_options.iter().cloned())
        .maybe_declared_value(self.declared_value)
        .build()?)
    }
}

/// A quote as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    /// Quote id.
    pub quote_id: QuoteId,
    /// Carrier.
    pub carrier: Carrier,
    /// Service name.
    pub service: String,
    /// Carrier service code.
    pub carrier_service_id: Option<String>,
    /// Carrier cost.
    pub negotiated_cost: Decimal,
    /// Sale price.
    pub final_price: Decimal,
    /// Lifecycle state.
    pub status: QuoteStatus,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Option<Timestamp>,
    /// Correlation id of the creating request.
    pub correlation_id: CorrelationId,
    /// Estimated delivery.
    pub estimated_delivery: Option<Timestamp>,
    /// Origin postal code.
    pub origin_postal: String,
    /// Destination postal code.
    pub destination_postal: String,
    /// Weight in kg.
    pub weight: Decimal,
    /// Dimensions in cm.
    pub dimensions: Dimensions,
    /// Requested service options.
    pub service_options: BTreeSet<String>,
    /// Declared value.
    pub declared_value: Option<Decimal>,
    /// Failure details.
    pub error: Option<ErrorPayload>,
    /// Label metadata.
    pub label: Option<LabelInfo>,
}

impl From<&Quote> for QuoteResponse {
    fn from(quote: &Quote) -> Self {
        let shipment = quote.shipment();
        Self {
            quote_id: quote.id(),
            carrier: quote.carrier(),
            service: quote.service().to_string(),
            carrier_service_id: quote.carrier_service_id().map(ToString::to_string),
            negotiated_cost: quote.negotiated_cost(),
            final_price: quote.final_price(),
            status: quote.status(),
            created_at: quote.created_at(),
            updated_at: quote.updated_at(),
            correlation_id: quote.correlation_id().clone(),
            estimated_delivery: quote.estimated_delivery(),
            origin_postal: shipment.origin_postal().to_string(),
            destination_postal: shipment.destination_postal().to_string(),
            weight: shipment.weight(),
            dimensions: shipment.dimensions(),
            service_options: shipment.service_options().clone(),
            declared_value: shipment.declared_value(),
            error: quote.error().cloned(),
            label: quote.label().cloned(),
        }
    }
}

/// Query parameters of `GET /api/v1/quotes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuotesQuery {
    /// Status filter.
    pub status: Option<String>,
    /// Carrier filter.
    pub carrier: Option<String>,
    /// Inclusive lower bound on creation time, RFC 3339.
    pub start_date: Option<String>,
    /// Inclusive upper bound on creation time, RFC 3339.
    pub end_date: Option<String>,
    /// Id of the last quote of the previous page.
    pub cursor: Option<String>,
    /// Page size.
    pub limit: Option<usize>,
}

impl ListQuotesQuery {
    /// Parses the parameters into a repository filter.
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::InvalidArgument` for malformed values and
    /// `QuoteError::UnsupportedCarrier` for an unknown carrier.
    pub fn to_filter(&self) -> Result<QuoteFilter, QuoteError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<QuoteStatus>)
            .transpose()
            .map_err(|e| QuoteError::invalid_argument(e.to_string()))?;
        let carrier = self
            .carrier
            .as_deref()
            .map(str::parse::<Carrier>)
            .transpose()?;
        let cursor = self
            .cursor
            .as_deref()
            .map(str::parse::<QuoteId>)
            .transpose()
            .map_err(|e| QuoteError::invalid_argument(format!("invalid cursor: {e}")))?;

        Ok(QuoteFilter {
            status,
            carrier,
            start_date: parse_date("start_date", self.start_date.as_deref())?,
            end_date: parse_date("end_date", self.end_date.as_deref())?,
            cursor,
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<Timestamp>, QuoteError> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| Timestamp::from(dt.to_utc()))
                .map_err(|e| QuoteError::invalid_argument(format!("invalid {field}: {e}")))
        })
        .transpose()
}

/// Body of `GET /api/v1/quotes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteListResponse {
    /// Quotes, newest first.
    pub quotes: Vec<QuoteResponse>,
    /// Cursor of the next page.
    pub next_cursor: Option<QuoteId>,
}

impl From<QuotePage> for QuoteListResponse {
    fn from(page: QuotePage) -> Self {
        Self {
            quotes: page.quotes.iter().map(QuoteResponse::from).collect(),
            next_cursor: page.next_cursor,
        }
    }
}

/// One carrier in `GET /api/v1/carriers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarrierStatus {
    /// Carrier.
    pub carrier: Carrier,
    /// Breaker state, absent if the carrier never failed.
    pub breaker: Option<BreakerSnapshot>,
}

/// Body of `GET /api/v1/carriers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarriersResponse {
    /// Registered carriers.
    pub carriers: Vec<CarrierStatus>,
}

/// Body of `GET /api/v1/carriers/{name}/test`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResponse {
    /// Carrier name as requested.
    pub carrier: String,
    /// `ok`, `error` or `disabled`.
    pub status: String,
    /// Outcome description.
    pub message: String,
    /// Error code on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /api/v1/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Response time.
    pub timestamp: Timestamp,
}

/// `POST /api/v1/quotes`
pub async fn create_quote(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    body: Result<Json<CreateQuoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<QuoteResponse>), ApiError> {
    let Json(request) = body
        .map_err(|e| ApiError::invalid_argument(e.body_text(), ctx.correlation_id.clone()))?;
    let (carrier, shipment) = request
        .carrier()
        .and_then(|carrier| request.shipment().map(|shipment| (carrier, shipment)))
        .map_err(|e| ApiError::from_quote_error(&e, ctx.correlation_id.clone()))?;

    let quote = state
        .lifecycle
        .create_quote(ctx.client_id, carrier, shipment, ctx.correlation_id)
        .await?;
    Ok((StatusCode::CREATED, Json(QuoteResponse::from(&quote))))
}

/// `GET /api/v1/quotes`
pub async fn list_quotes(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    query: Result<Query<ListQuotesQuery>, QueryRejection>,
) -> Result<Json<QuoteListResponse>, ApiError> {
    let Query(query) = query
        .map_err(|e| ApiError::invalid_argument(e.body_text(), ctx.correlation_id.clone()))?;
    let fail = |e: QuoteError| ApiError::from_quote_error(&e, ctx.correlation_id.clone());

    let filter = query.to_filter().map_err(fail)?;
    let page = state
        .lifecycle
        .list_quotes(&ctx.client_id, &filter)
        .await
        .map_err(fail)?;
    Ok(Json(page.into()))
}

/// `GET /api/v1/quotes/{id}`
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let fail = |e: QuoteError| ApiError::from_quote_error(&e, ctx.correlation_id.clone());
    let quote_id = parse_quote_id(&id).map_err(fail)?;
    let quote = state
        .lifecycle
        .get_quote(&ctx.client_id, &quote_id)
        .await
        .map_err(fail)?;
    Ok(Json(QuoteResponse::from(&quote)))
}

/// `POST /api/v1/quotes/{id}/label`
pub async fn generate_label(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let fail = |e: QuoteError| ApiError::from_quote_error(&e, ctx.correlation_id.clone());
    let quote_id = parse_quote_id(&id).map_err(fail)?;
    let label = state
        .labels
        .generate_label(&ctx.client_id, &quote_id, &ctx.correlation_id)
        .await
        .map_err(fail)?;

    let mut response = label.pdf.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    for (name, value) in [
        (LABEL_ID_HEADER, label.label_id.as_str()),
        (LABEL_URL_HEADER, label.label_url.as_str()),
    ] {
        let value = HeaderValue::from_str(value)
            .map_err(|e| fail(QuoteError::internal(e.to_string())))?;
        headers.insert(name, value);
    }
    Ok(response)
}

/// `GET /api/v1/carriers`
pub async fn list_carriers(State(state): State<Arc<AppState>>) -> Json<CarriersResponse> {
    let orchestrator = state.lifecycle.orchestrator();
    let carriers = orchestrator
        .available_carriers()
        .into_iter()
        .map(|carrier| CarrierStatus {
            carrier,
            breaker: orchestrator.breaker().state(carrier),
        })
        .collect();
    Json(CarriersResponse { carriers })
}

/// `GET /api/v1/carriers/{name}/test`
pub async fn probe_carrier(
    State(state): State<Arc<AppState>>,
    RequestCorrelation(correlation_id): RequestCorrelation,
    Path(name): Path<String>,
) -> Json<ProbeResponse> {
    if !state.enable_carrier_probe {
        return Json(ProbeResponse {
            carrier: name,
            status: "disabled".to_string(),
            message: "carrier probe endpoint is disabled".to_string(),
            error: None,
        });
    }

    let outcome = match name.parse::<Carrier>() {
        Ok(carrier) => state
            .lifecycle
            .orchestrator()
            .probe(carrier, &correlation_id)
            .await
            .map(|_| ()),
        Err(e) => Err(QuoteError::from(e)),
    };

    info!(
        correlation_id = %correlation_id,
        carrier = %name,
        ok = outcome.is_ok(),
        "carrier probe finished"
    );

    Json(match outcome {
        Ok(()) => ProbeResponse {
            carrier: name,
            status: "ok".to_string(),
            message: "carrier connection test successful".to_string(),
            error: None,
        },
        Err(e) => ProbeResponse {
            carrier: name,
            status: "error".to_string(),
            message: e.to_string(),
            error: Some(e.code().to_string()),
        },
    })
}

/// `GET /api/v1/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Timestamp::now(),
    })
}

fn parse_quote_id(raw: &str) -> Result<QuoteId, QuoteError> {
    raw.parse::<QuoteId>()
        .map_err(|_| QuoteError::quote_not_found(raw))
}
