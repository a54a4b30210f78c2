//! # PDF Label Renderer
//!
//! Renders a one-page shipping label with `printpdf`.

use crate::infrastructure::labels::{LabelContent, LabelRenderError, LabelRenderer};
use printpdf::{BuiltinFont, Mm, PdfDocument};

const PAGE_WIDTH_MM: f32 = 100.0;
const PAGE_HEIGHT_MM: f32 = 150.0;
const MARGIN_MM: f32 = 8.0;
const LINE_HEIGHT_MM: f32 = 9.0;

/// Renders labels as 100x150 mm PDF pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLabelRenderer;

impl PdfLabelRenderer {
    /// Creates a renderer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LabelRenderer for PdfLabelRenderer {
    fn render(&self, content: &LabelContent) -> Result<Vec<u8>, LabelRenderError> {
        let (doc, page, layer) = PdfDocument::new(
            content.label_id.as_str(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "label",
        );
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| LabelRenderError(e.to_string()))?;
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| LabelRenderError(e.to_string()))?;

        let layer = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM - LINE_HEIGHT_MM;

        layer.use_text("SHIPPING LABEL", 16.0, Mm(MARGIN_MM), Mm(y), &bold);
        y -= LINE_HEIGHT_MM * 1.5;

        for line in content.lines() {
            layer.use_text(line, 10.0, Mm(MARGIN_MM), Mm(y), &regular);
            y -= LINE_HEIGHT_MM;
        }

        doc.save_to_bytes()
            .map_err(|e| LabelRenderError(e.to_string()))
    }
}
