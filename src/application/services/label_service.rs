//! # Label Service
//!
//! Generates shipping labels for successful quotes.

use crate::application::error::{QuoteError, QuoteResult};
use crate::domain::entities::{LabelInfo, Quote};
use crate::domain::value_objects::{ClientId, CorrelationId, QuoteId, Timestamp};
use crate::infrastructure::labels::{LabelContent, LabelRenderer};
use crate::infrastructure::persistence::QuoteRepository;
use std::sync::Arc;
use tracing::info;

/// A rendered label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLabel {
    /// Label identifier.
    pub label_id: String,
    /// Where the frontend serves the label.
    pub label_url: String,
    /// Rendered document.
    pub pdf: Vec<u8>,
}

/// Renders labels and records them on their quote.
#[derive(Debug, Clone)]
pub struct LabelService {
    repository: Arc<dyn QuoteRepository>,
    renderer: Arc<dyn LabelRenderer>,
    frontend_url: String,
}

impl LabelService {
    /// Creates a label service. Label URLs are rooted at `frontend_url`.
    #[must_use]
    pub fn new(
        repository: Arc<dyn QuoteRepository>,
        renderer: Arc<dyn LabelRenderer>,
        frontend_url: impl Into<String>,
    ) -> Self {
        let frontend_url: String = frontend_url.into();
        Self {
            repository,
            renderer,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Generates a label for a successful quote owned by `client_id`.
    ///
    /// # Errors
    ///
    /// - `QuoteError::NotFound` - Quote absent or owned by another client
    /// - `QuoteError::InvalidState` - Quote did not succeed
    /// - `QuoteError::Internal` - Rendering failed
    /// - `QuoteError::Repository` - Label metadata could not be saved
    pub async fn generate_label(
        &self,
        client_id: &ClientId,
        quote_id: &QuoteId,
        correlation_id: &CorrelationId,
    ) -> QuoteResult<GeneratedLabel> {
        let mut quote = self
            .repository
            .get(client_id, quote_id)
            .await?
            .ok_or_else(|| QuoteError::quote_not_found(quote_id))?;

        let generated_at = Timestamp::now();
        let label_id = label_id(quote_id, generated_at);
        quote.attach_label(LabelInfo {
            label_id: label_id.clone(),
            generated_at,
        })?;

        let pdf = self
            .renderer
            .render(&label_content(&quote, &label_id))
            .map_err(|e| QuoteError::internal(e.to_string()))?;
        self.repository.save(&quote).await?;

        info!(
            correlation_id = %correlation_id,
            quote_id = %quote_id,
            label_id = %label_id,
            bytes = pdf.len(),
            "label generated"
        );

        Ok(GeneratedLabel {
            label_url: format!("{}/labels/{label_id}", self.frontend_url),
            label_id,
            pdf,
        })
    }
}

fn label_id(quote_id: &QuoteId, at: Timestamp) -> String {
    let prefix: String = quote_id
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase();
    format!("LABEL-{prefix}-{}", at.timestamp_millis())
}

fn label_content(quote: &Quote, label_id: &str) -> LabelContent {
    let shipment = quote.shipment();
    LabelContent {
        label_id: label_id.to_string(),
        quote_id: quote.id().to_string(),
        carrier: quote.carrier().to_string(),
        service: quote.service().to_string(),
        origin_postal: shipment.origin_postal().to_string(),
        destination_postal: shipment.destination_postal().to_string(),
        weight_kg: shipment.weight().to_string(),
    }
}
