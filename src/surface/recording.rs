//! A surface that records calls instead of drawing.
//!
//! Useful for hosts that want to inspect or replay a render, and for testing
//! the layout and executor without producing PDF bytes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{DrawingSurface, RectMode, SurfaceFactory, TextMeasure, TextOptions};
use crate::error::FormslateError;
use crate::model::{Metadata, Page};
use crate::style::{Color, FontWeight, StyleSpec, TextAlign};

/// Advance of one character per point of font size, in page units.
const CHAR_ADVANCE: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    SetFont { family: String, weight: FontWeight },
    SetFontSize(f64),
    SetTextColor(Color),
    SetDrawColor(Color),
    SetFillColor(Color),
    Text {
        content: String,
        x: f64,
        y: f64,
        options: TextOptions,
    },
    TextWithLink {
        content: String,
        x: f64,
        y: f64,
        url: String,
        align: TextAlign,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: RectMode,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Save(String),
}

impl SurfaceCall {
    /// True for calls that put marks on the page.
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            SurfaceCall::Text { .. }
                | SurfaceCall::TextWithLink { .. }
                | SurfaceCall::Rect { .. }
                | SurfaceCall::Line { .. }
        )
    }
}

/// The calls of one saved surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub filename: String,
    pub calls: Vec<SurfaceCall>,
}

pub struct RecordingSurface {
    page: Page,
    calls: Vec<SurfaceCall>,
    draws: usize,
    fail_on_draw: Option<usize>,
    saved: bool,
    sink: Option<Rc<RefCell<Vec<Recording>>>>,
}

impl RecordingSurface {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            calls: Vec::new(),
            draws: 0,
            fail_on_draw: None,
            saved: false,
            sink: None,
        }
    }

    /// Make the drawing call with this zero-based index fail.
    pub fn fail_on_draw(mut self, index: usize) -> Self {
        self.fail_on_draw = Some(index);
        self
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    fn record(&mut self, call: SurfaceCall) -> Result<(), FormslateError> {
        if self.saved {
            return Err(FormslateError::Render(
                "surface already saved".to_string(),
            ));
        }
        if call.is_drawing() {
            if self.fail_on_draw == Some(self.draws) {
                return Err(FormslateError::Render(format!(
                    "injected failure on drawing call {}",
                    self.draws
                )));
            }
            self.draws += 1;
        }
        self.calls.push(call);
        Ok(())
    }
}

impl TextMeasure for RecordingSurface {
    fn text_width(&self, content: &str, style: &StyleSpec) -> f64 {
        content.chars().count() as f64 * style.font_size * CHAR_ADVANCE
    }
}

impl DrawingSurface for RecordingSurface {
    fn page_width(&self) -> f64 {
        self.page.width
    }

    fn set_font(&mut self, family: &str, weight: FontWeight) -> Result<(), FormslateError> {
        self.record(SurfaceCall::SetFont {
            family: family.to_string(),
            weight,
        })
    }

    fn set_font_size(&mut self, points: f64) -> Result<(), FormslateError> {
        self.record(SurfaceCall::SetFontSize(points))
    }

    fn set_text_color(&mut self, color: Color) -> Result<(), FormslateError> {
        self.record(SurfaceCall::SetTextColor(color))
    }

    fn set_draw_color(&mut self, color: Color) -> Result<(), FormslateError> {
        self.record(SurfaceCall::SetDrawColor(color))
    }

    fn set_fill_color(&mut self, color: Color) -> Result<(), FormslateError> {
        self.record(SurfaceCall::SetFillColor(color))
    }

    fn text(
        &mut self,
        content: &str,
        x: f64,
        y: f64,
        options: TextOptions,
    ) -> Result<(), FormslateError> {
        self.record(SurfaceCall::Text {
            content: content.to_string(),
            x,
            y,
            options,
        })
    }

    fn text_with_link(
        &mut self,
        content: &str,
        x: f64,
        y: f64,
        url: &str,
        align: TextAlign,
    ) -> Result<(), FormslateError> {
        self.record(SurfaceCall::TextWithLink {
            content: content.to_string(),
            x,
            y,
            url: url.to_string(),
            align,
        })
    }

    fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: RectMode,
    ) -> Result<(), FormslateError> {
        self.record(SurfaceCall::Rect {
            x,
            y,
            width,
            height,
            mode,
        })
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), FormslateError> {
        self.record(SurfaceCall::Line { x1, y1, x2, y2 })
    }

    fn save(&mut self, filename: &str) -> Result<(), FormslateError> {
        self.record(SurfaceCall::Save(filename.to_string()))?;
        self.saved = true;
        if let Some(sink) = &self.sink {
            sink.borrow_mut().push(Recording {
                filename: filename.to_string(),
                calls: self.calls.clone(),
            });
        }
        Ok(())
    }
}

/// Hands out recording surfaces and collects what each one saved.
#[derive(Default)]
pub struct RecordingBackend {
    saved: Rc<RefCell<Vec<Recording>>>,
    created: Cell<usize>,
    fail_on_draw: Option<usize>,
    page_width: Option<f64>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every surface created from now on fails on this drawing call.
    pub fn fail_on_draw(mut self, index: usize) -> Self {
        self.fail_on_draw = Some(index);
        self
    }

    /// Every surface created from now on reports this page width, whatever
    /// page it was asked for.
    pub fn with_page_width(mut self, width: f64) -> Self {
        self.page_width = Some(width);
        self
    }

    /// Shared handle to the saved recordings.
    pub fn saved(&self) -> Rc<RefCell<Vec<Recording>>> {
        Rc::clone(&self.saved)
    }

    /// Number of surfaces created so far.
    pub fn created(&self) -> usize {
        self.created.get()
    }
}

impl SurfaceFactory for RecordingBackend {
    type Surface = RecordingSurface;

    fn create(&self, page: &Page, _metadata: &Metadata) -> Result<RecordingSurface, FormslateError> {
        self.created.set(self.created.get() + 1);
        let mut page = *page;
        if let Some(width) = self.page_width {
            page.width = width;
        }
        let mut surface = RecordingSurface::new(page);
        surface.fail_on_draw = self.fail_on_draw;
        surface.sink = Some(Rc::clone(&self.saved));
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_drawing_after_save() {
        let mut surface = RecordingSurface::new(Page::a4());
        surface.save("a.pdf").unwrap();
        assert!(surface.line(0.0, 0.0, 1.0, 1.0).is_err());
        assert!(surface.save("a.pdf").is_err());
        assert_eq!(surface.calls().len(), 1);
    }

    #[test]
    fn test_backend_collects_saved_surfaces() {
        let backend = RecordingBackend::new();
        let saved = backend.saved();
        let mut surface = backend.create(&Page::a4(), &Metadata::default()).unwrap();
        surface.rect(10.0, 10.0, 5.0, 5.0, RectMode::Stroke).unwrap();
        surface.save("x.pdf").unwrap();

        assert_eq!(backend.created(), 1);
        let saved = saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].filename, "x.pdf");
        assert_eq!(saved[0].calls.len(), 2);
    }

    #[test]
    fn test_measure_scales_with_font_size() {
        let surface = RecordingSurface::new(Page::a4());
        assert_eq!(surface.text_width("abcd", &StyleSpec::sized(10.0)), 8.0);
        assert_eq!(surface.text_width("abcd", &StyleSpec::sized(20.0)), 16.0);
    }
}
