//! # Text Blocks
//!
//! Turns text runs into positioned draw commands. Vertical placement is always
//! `cursor + offset` with the offset passed explicitly by the caller, and every
//! emitted command carries the run's own style.

use super::cursor::LayoutCursor;
use super::{DrawCommand, TextMeasure};
use crate::model::{Page, TextRun};
use crate::style::{StyleSpec, TextAlign};

pub struct TextBlockRenderer<'a> {
    page: Page,
    measure: &'a dyn TextMeasure,
}

impl<'a> TextBlockRenderer<'a> {
    pub fn new(page: Page, measure: &'a dyn TextMeasure) -> Self {
        Self { page, measure }
    }

    /// Rendered width of `text` in page units.
    pub fn measure(&self, text: &str, style: &StyleSpec) -> f64 {
        self.measure.text_width(text, style)
    }

    /// A run centered on the page, whatever its own alignment says.
    pub fn centered(&self, run: &TextRun, cursor: &LayoutCursor, offset: f64) -> DrawCommand {
        DrawCommand::Text {
            content: run.text.clone(),
            x: self.page.center_x(),
            y: cursor.position() + offset,
            style: run.style.clone(),
            align: TextAlign::Center,
            max_width: run.max_width,
        }
    }

    /// A run anchored at `x` using the run's own alignment and wrap width.
    pub fn aligned(&self, run: &TextRun, x: f64, cursor: &LayoutCursor, offset: f64) -> DrawCommand {
        DrawCommand::Text {
            content: run.text.clone(),
            x,
            y: cursor.position() + offset,
            style: run.style.clone(),
            align: run.align,
            max_width: run.max_width,
        }
    }

    /// Plain single-line text at an absolute position relative to the cursor.
    pub fn label(
        &self,
        text: &str,
        style: &StyleSpec,
        x: f64,
        cursor: &LayoutCursor,
        offset: f64,
    ) -> DrawCommand {
        DrawCommand::Text {
            content: text.to_string(),
            x,
            y: cursor.position() + offset,
            style: style.clone(),
            align: TextAlign::Left,
            max_width: None,
        }
    }

    /// A centered clickable run followed by its underline.
    ///
    /// The underline spans the measured width of the run and is symmetric about
    /// the page center, `underline_offset` below the baseline.
    pub fn hyperlink(
        &self,
        run: &TextRun,
        url: &str,
        cursor: &LayoutCursor,
        offset: f64,
        underline_offset: f64,
    ) -> [DrawCommand; 2] {
        let center_x = self.page.center_x();
        let baseline = cursor.position() + offset;
        let width = self.measure(&run.text, &run.style);
        let underline_y = baseline + underline_offset;

        [
            DrawCommand::Link {
                content: run.text.clone(),
                x: center_x,
                y: baseline,
                url: url.to_string(),
                style: run.style.clone(),
                align: TextAlign::Center,
            },
            DrawCommand::Line {
                x1: center_x - width / 2.0,
                y1: underline_y,
                x2: center_x + width / 2.0,
                y2: underline_y,
                style: run.style.clone(),
            },
        ]
    }
}
