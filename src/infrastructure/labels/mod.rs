//! # Label Rendering
//!
//! Turns a successful quote into a printable shipping label.

pub mod pdf;

pub use pdf::PdfLabelRenderer;

use std::fmt;
use thiserror::Error;

/// Error raised when a label cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("label rendering failed: {0}")]
pub struct LabelRenderError(pub String);

/// Fields printed on a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelContent {
    /// Label identifier.
    pub label_id: String,
    /// Quote the label was generated for.
    pub quote_id: String,
    /// Carrier name.
    pub carrier: String,
    /// Service name.
    pub service: String,
    /// Origin postal code.
    pub origin_postal: String,
    /// Destination postal code.
    pub destination_postal: String,
    /// Package weight in kg.
    pub weight_kg: String,
}

impl LabelContent {
    /// Body lines in print order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Label: {}", self.label_id),
            format!("Quote: {}", self.quote_id),
            format!("Carrier: {} ({})", self.carrier, self.service),
            format!("From: {}", self.origin_postal),
            format!("To: {}", self.destination_postal),
            format!("Weight: {} kg", self.weight_kg),
        ]
    }
}

/// Renders label documents.
pub trait LabelRenderer: Send + Sync + fmt::Debug {
    /// Renders `content` into a document.
    ///
    /// # Errors
    ///
    /// Returns `LabelRenderError` if the document cannot be produced.
    fn render(&self, content: &LabelContent) -> Result<Vec<u8>, LabelRenderError>;
}
