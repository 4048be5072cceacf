//! # Page Layout Engine
//!
//! Layout is a pure function of the document, the page, and the text metrics:
//! it produces an ordered list of [`DrawCommand`]s and never touches a drawing
//! backend. Applying those commands to a surface is the executor's job (see
//! [`crate::surface`]), which is what lets everything here be tested without
//! any backend at all.
//!
//! The page is built in four forward-only steps:
//!
//! ```text
//! Uninitialized → TitleBlockDrawn → ParagraphDrawn → SectionsDrawn → (finalize)
//! ```
//!
//! A single [`LayoutCursor`] tracks the vertical position through every step.
//! It is owned by the engine and lent to each helper explicitly.

pub mod columns;
pub mod config;
pub mod cursor;
pub mod section;
pub mod text_block;

pub use config::LayoutConfig;
pub use cursor::LayoutCursor;

use crate::error::LayoutError;
use crate::model::{Document, Page, OUTPUT_FILENAME};
use crate::style::{StyleSpec, TextAlign};
use section::SectionRenderer;
use text_block::TextBlockRenderer;

/// Text measurement, in page units, as provided by the drawing backend.
pub trait TextMeasure {
    fn text_width(&self, content: &str, style: &StyleSpec) -> f64;
}

/// How a rectangle is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectMode {
    Stroke,
    Fill,
    FillStroke,
}

/// One primitive drawing operation with its complete style.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        content: String,
        x: f64,
        /// Baseline.
        y: f64,
        style: StyleSpec,
        align: TextAlign,
        max_width: Option<f64>,
    },
    /// Text that is also a clickable region bound to `url`.
    Link {
        content: String,
        x: f64,
        y: f64,
        url: String,
        style: StyleSpec,
        align: TextAlign,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: StyleSpec,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: RectMode,
        style: StyleSpec,
    },
}

impl DrawCommand {
    pub fn style(&self) -> &StyleSpec {
        match self {
            DrawCommand::Text { style, .. }
            | DrawCommand::Link { style, .. }
            | DrawCommand::Line { style, .. }
            | DrawCommand::Rect { style, .. } => style,
        }
    }
}

/// The finished layout of one page, ready for an executor.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub page: Page,
    pub commands: Vec<DrawCommand>,
    /// Name the executor persists the page under; always [`OUTPUT_FILENAME`].
    pub output_name: String,
    /// Cursor position after the last section.
    pub end_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    TitleBlockDrawn,
    ParagraphDrawn,
    SectionsDrawn,
    /// A step failed; nothing further may run.
    Failed,
}

impl EngineState {
    fn name(self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::TitleBlockDrawn => "title block drawn",
            EngineState::ParagraphDrawn => "paragraph drawn",
            EngineState::SectionsDrawn => "sections drawn",
            EngineState::Failed => "failed",
        }
    }
}

/// Lays out one page. Single use: `finalize` consumes the engine.
pub struct PageLayoutEngine<'a> {
    page: Page,
    config: &'a LayoutConfig,
    text: TextBlockRenderer<'a>,
    cursor: LayoutCursor,
    state: EngineState,
    commands: Vec<DrawCommand>,
}

impl<'a> PageLayoutEngine<'a> {
    pub fn new(
        page: Page,
        config: &'a LayoutConfig,
        measure: &'a dyn TextMeasure,
    ) -> Result<Self, LayoutError> {
        let content_width = page.content_width(config.margin);
        if content_width.is_nan() || content_width <= 0.0 {
            return Err(LayoutError::NonPositiveContentWidth(content_width));
        }
        Ok(Self {
            page,
            config,
            text: TextBlockRenderer::new(page, measure),
            cursor: LayoutCursor::new(config.title_top),
            state: EngineState::Uninitialized,
            commands: Vec::new(),
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn cursor(&self) -> &LayoutCursor {
        &self.cursor
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Title lines, then the hyperlinked line with its underline.
    pub fn draw_title_block(&mut self, document: &Document) -> Result<(), LayoutError> {
        self.step(
            EngineState::Uninitialized,
            EngineState::TitleBlockDrawn,
            |engine| {
                let line_height = engine.config.line_height;
                for (i, run) in document.title_lines.iter().enumerate() {
                    if i > 0 {
                        engine.cursor.advance(line_height)?;
                    }
                    let command = engine.text.centered(run, &engine.cursor, 0.0);
                    engine.commands.push(command);
                }
                if !document.title_lines.is_empty() {
                    engine.cursor.advance(line_height)?;
                }

                let link = &document.link;
                match &link.url {
                    Some(url) => {
                        let commands = engine.text.hyperlink(
                            link,
                            url,
                            &engine.cursor,
                            0.0,
                            engine.config.underline_offset,
                        );
                        engine.commands.extend(commands);
                    }
                    None => {
                        let command = engine.text.centered(link, &engine.cursor, 0.0);
                        engine.commands.push(command);
                    }
                }
                Ok(())
            },
        )
    }

    /// Bold caption, then the wrapped introductory paragraph.
    pub fn draw_paragraph(&mut self, document: &Document) -> Result<(), LayoutError> {
        self.step(
            EngineState::TitleBlockDrawn,
            EngineState::ParagraphDrawn,
            |engine| {
                let config = engine.config;
                engine.cursor.advance(config.caption_gap)?;
                let caption = engine.text.centered(&document.caption, &engine.cursor, 0.0);
                engine.commands.push(caption);

                engine.cursor.advance(config.paragraph_gap)?;
                let intro =
                    engine
                        .text
                        .aligned(&document.intro, config.paragraph_x, &engine.cursor, 0.0);
                engine.commands.push(intro);

                engine.cursor.advance(config.section_gap)
            },
        )
    }

    /// Every section, in document order.
    pub fn draw_sections(&mut self, document: &Document) -> Result<(), LayoutError> {
        self.step(
            EngineState::ParagraphDrawn,
            EngineState::SectionsDrawn,
            |engine| {
                let content_width = engine.page.content_width(engine.config.margin);
                let renderer = SectionRenderer::new(engine.config, &engine.text, content_width);
                for section in &document.sections {
                    renderer.render(section, &mut engine.cursor, &mut engine.commands)?;
                }
                Ok(())
            },
        )
    }

    /// Hand the finished page over for execution.
    pub fn finalize(self) -> Result<PagePlan, LayoutError> {
        if self.state != EngineState::SectionsDrawn {
            return Err(LayoutError::OutOfOrder {
                expected: EngineState::SectionsDrawn.name(),
                found: self.state.name(),
            });
        }
        log::debug!(
            "layout finalized: {} commands, cursor at {:.2}",
            self.commands.len(),
            self.cursor.position()
        );
        Ok(PagePlan {
            page: self.page,
            end_y: self.cursor.position(),
            commands: self.commands,
            output_name: OUTPUT_FILENAME.to_string(),
        })
    }

    fn step<F>(&mut self, expected: EngineState, next: EngineState, run: F) -> Result<(), LayoutError>
    where
        F: FnOnce(&mut Self) -> Result<(), LayoutError>,
    {
        if self.state != expected {
            return Err(LayoutError::OutOfOrder {
                expected: expected.name(),
                found: self.state.name(),
            });
        }
        match run(self) {
            Ok(()) => {
                log::debug!("{} (cursor at {:.2})", next.name(), self.cursor.position());
                self.state = next;
                Ok(())
            }
            Err(e) => {
                self.state = EngineState::Failed;
                Err(e)
            }
        }
    }
}

/// Lay out a document on `page`.
pub fn layout(
    document: &Document,
    page: Page,
    config: &LayoutConfig,
    measure: &dyn TextMeasure,
) -> Result<PagePlan, LayoutError> {
    let mut engine = PageLayoutEngine::new(page, config, measure)?;
    engine.draw_title_block(document)?;
    engine.draw_paragraph(document)?;
    engine.draw_sections(document)?;
    engine.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnWidth, FieldValues};

    struct FixedAdvance;

    impl TextMeasure for FixedAdvance {
        fn text_width(&self, content: &str, style: &StyleSpec) -> f64 {
            content.chars().count() as f64 * style.font_size * 0.05
        }
    }

    fn certificate() -> Document {
        Document::certificate(&FieldValues::new("Ann", "Lee", "B"), &LayoutConfig::default())
    }

    fn baselines(plan: &PagePlan) -> Vec<(String, f64)> {
        plan.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { content, y, .. } | DrawCommand::Link { content, y, .. } => {
                    Some((content.clone(), *y))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_vertical_rhythm() {
        let plan = layout(&certificate(), Page::a4(), &LayoutConfig::default(), &FixedAdvance).unwrap();
        let ys: Vec<f64> = baselines(&plan).iter().map(|(_, y)| *y).take(7).collect();
        // three title lines, link, caption, paragraph, section title
        assert_eq!(ys, vec![15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 74.0]);
        // sections start at 70: band 6 + two rows of 9
        assert_eq!(plan.end_y, 70.0 + 6.0 + 9.0 + 9.0);
        assert_eq!(plan.output_name, "header-example.pdf");
    }

    #[test]
    fn test_every_centered_command_uses_page_center() {
        let plan = layout(&certificate(), Page::a4(), &LayoutConfig::default(), &FixedAdvance).unwrap();
        for command in &plan.commands {
            match command {
                DrawCommand::Text {
                    x,
                    align: TextAlign::Center,
                    ..
                }
                | DrawCommand::Link {
                    x,
                    align: TextAlign::Center,
                    ..
                } => assert_eq!(*x, 105.0),
                _ => {}
            }
        }
    }

    #[test]
    fn test_link_is_followed_by_its_underline() {
        let plan = layout(&certificate(), Page::a4(), &LayoutConfig::default(), &FixedAdvance).unwrap();
        let link_index = plan
            .commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Link { .. }))
            .unwrap();
        match &plan.commands[link_index + 1] {
            DrawCommand::Line { x1, x2, y1, y2, style } => {
                assert!(((x1 + x2) / 2.0 - 105.0).abs() < 1e-9);
                assert_eq!(*y1, 30.5);
                assert_eq!(*y2, 30.5);
                assert_eq!(style.draw_color, crate::style::Color::BLUE);
            }
            other => panic!("expected underline, got {:?}", other),
        }
    }

    #[test]
    fn test_steps_must_run_in_order() {
        let doc = certificate();
        let config = LayoutConfig::default();
        let mut engine =
            PageLayoutEngine::new(Page::a4(), &config, &FixedAdvance).unwrap();
        assert_eq!(
            engine.draw_sections(&doc),
            Err(LayoutError::OutOfOrder {
                expected: "paragraph drawn",
                found: "uninitialized"
            })
        );
        engine.draw_title_block(&doc).unwrap();
        assert!(engine.draw_title_block(&doc).is_err());
        assert_eq!(engine.state(), EngineState::TitleBlockDrawn);
        assert!(engine.finalize().is_err());
    }

    #[test]
    fn test_failed_step_poisons_engine() {
        let mut config = LayoutConfig::default();
        config.identity_columns = vec![
            ColumnWidth::Fixed(150.0),
            ColumnWidth::Fixed(100.0),
            ColumnWidth::Remainder,
        ];
        let mut doc = Document::certificate(&FieldValues::default(), &config);
        doc.sections[0].rows[1].fields.push(crate::model::Field::new("extra", ""));

        let mut engine =
            PageLayoutEngine::new(Page::a4(), &config, &FixedAdvance).unwrap();
        engine.draw_title_block(&doc).unwrap();
        engine.draw_paragraph(&doc).unwrap();
        assert!(matches!(
            engine.draw_sections(&doc),
            Err(LayoutError::ColumnOverflow { .. })
        ));
        assert_eq!(engine.state(), EngineState::Failed);
        assert!(engine.finalize().is_err());
    }

    #[test]
    fn test_cursor_never_decreases() {
        let plan = layout(&certificate(), Page::a4(), &LayoutConfig::default(), &FixedAdvance).unwrap();
        let rect_ys: Vec<f64> = plan
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { y, .. } => Some(*y),
                _ => None,
            })
            .collect();
        assert!(rect_ys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_narrow_page_is_rejected() {
        let config = LayoutConfig::default();
        let page = Page {
            width: 20.0,
            ..Page::a4()
        };
        assert!(matches!(
            PageLayoutEngine::new(page, &config, &FixedAdvance),
            Err(LayoutError::NonPositiveContentWidth(_))
        ));
    }
}
