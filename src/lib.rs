//! # Formslate
//!
//! Renders a single-page certificate form: a centered title block with a
//! hyperlink, a caption and introductory paragraph, then bordered sections of
//! labeled field cells.
//!
//! Layout and drawing are separate. Layout is a pure function from the
//! document to an ordered list of draw commands, each carrying its full style;
//! an executor then replays those commands onto a stateful drawing surface.
//!
//! ## Architecture
//!
//! ```text
//! FieldValues (JSON/API)
//!       ↓
//!   [model]      Document: title block, paragraph, sections of rows
//!       ↓
//!   [layout]     cursor, column resolution, PagePlan of DrawCommands
//!       ↓
//!   [surface]    executor: style-then-draw onto a DrawingSurface
//!       ↓
//!   [pdf]        PdfSurface: content stream, fonts, link annotations
//! ```
//!
//! [`generator`] ties these together behind the backend readiness check.

pub mod error;
pub mod font;
pub mod generator;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod surface;
pub mod text;

pub use error::{FormslateError, LayoutError};
pub use generator::{Bootstrap, Generator};
pub use model::{FieldValues, FormConfig};

use font::FontContext;
use model::Document;
use pdf::PdfSurface;
use surface::DrawingSurface;
use std::path::Path;

/// Render the certificate to PDF bytes without persisting it.
pub fn render(fields: &FieldValues, config: &FormConfig) -> Result<Vec<u8>, FormslateError> {
    let document = Document::certificate(fields, &config.layout);
    let mut pdf = PdfSurface::new(
        config.page,
        config.metadata.clone(),
        FontContext::new(),
        Path::new("."),
    );
    let page = model::Page {
        width: pdf.page_width(),
        ..config.page
    };
    let plan = layout::layout(&document, page, &config.layout, &pdf)?;
    surface::apply_commands(&plan.commands, &mut pdf)?;
    Ok(pdf.into_bytes())
}

/// Render the certificate for field values given as JSON, with the default
/// configuration.
pub fn render_json(json: &str) -> Result<Vec<u8>, FormslateError> {
    let fields: FieldValues = serde_json::from_str(json)?;
    render(&fields, &FormConfig::default())
}
