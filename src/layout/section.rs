//! # Sections
//!
//! A section is a filled header band followed by rows of outlined field cells.
//! Each section is drawn completely, band first and then rows top to bottom,
//! before the caller moves on to the next one.

use super::columns::resolve_columns;
use super::cursor::LayoutCursor;
use super::text_block::TextBlockRenderer;
use super::{DrawCommand, LayoutConfig, RectMode};
use crate::error::LayoutError;
use crate::model::{Row, Section};
use crate::style::StyleSpec;

/// A field with its resolved column width.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCell<'d> {
    pub label: &'d str,
    pub value: &'d str,
    pub width: f64,
}

pub struct SectionRenderer<'a> {
    config: &'a LayoutConfig,
    text: &'a TextBlockRenderer<'a>,
    content_width: f64,
}

impl<'a> SectionRenderer<'a> {
    pub fn new(
        config: &'a LayoutConfig,
        text: &'a TextBlockRenderer<'a>,
        content_width: f64,
    ) -> Self {
        Self {
            config,
            text,
            content_width,
        }
    }

    /// Draw one section at the cursor and advance the cursor past it.
    pub fn render(
        &self,
        section: &Section,
        cursor: &mut LayoutCursor,
        out: &mut Vec<DrawCommand>,
    ) -> Result<(), LayoutError> {
        let config = self.config;
        log::debug!(
            "section '{}' at y={:.2} ({} rows)",
            section.title,
            cursor.position(),
            section.rows.len()
        );

        out.push(DrawCommand::Rect {
            x: config.margin,
            y: cursor.position(),
            width: self.content_width,
            height: config.band_height,
            mode: RectMode::FillStroke,
            style: self.outline_style().with_fill_color(config.band_fill),
        });
        out.push(self.text.label(
            &section.title,
            &config.section_title_style,
            config.margin + config.cell_inset,
            cursor,
            config.band_title_baseline,
        ));
        cursor.advance(config.band_height)?;

        for row in &section.rows {
            let cells = self.cells(row)?;
            self.render_row(&cells, row.height, cursor, out)?;
        }
        Ok(())
    }

    /// Pair each field with its column width.
    pub fn cells<'d>(&self, row: &'d Row) -> Result<Vec<FieldCell<'d>>, LayoutError> {
        if !row.height.is_finite() || row.height < 0.0 {
            return Err(LayoutError::NegativeAdvance(row.height));
        }
        let widths = resolve_columns(&row.columns, self.content_width)?;
        if widths.len() != row.fields.len() {
            return Err(LayoutError::ColumnCountMismatch {
                columns: widths.len(),
                cells: row.fields.len(),
            });
        }
        Ok(row
            .fields
            .iter()
            .zip(widths)
            .map(|(field, width)| FieldCell {
                label: &field.label,
                value: &field.value,
                width,
            })
            .collect())
    }

    fn render_row(
        &self,
        cells: &[FieldCell<'_>],
        height: f64,
        cursor: &mut LayoutCursor,
        out: &mut Vec<DrawCommand>,
    ) -> Result<(), LayoutError> {
        let config = self.config;
        let mut x = config.margin;

        for cell in cells {
            out.push(DrawCommand::Rect {
                x,
                y: cursor.position(),
                width: cell.width,
                height,
                mode: RectMode::Stroke,
                style: self.outline_style(),
            });

            let label_x = x + config.cell_inset;
            out.push(self.text.label(
                cell.label,
                &config.label_style,
                label_x,
                cursor,
                config.label_baseline,
            ));

            if !cell.value.is_empty() {
                let label_width = self.text.measure(cell.label, &config.label_style);
                out.push(self.text.label(
                    cell.value,
                    &config.value_style,
                    label_x + label_width + config.value_gap,
                    cursor,
                    config.value_baseline,
                ));
            }

            x += cell.width;
        }

        cursor.advance(height)
    }

    fn outline_style(&self) -> StyleSpec {
        StyleSpec::default().with_draw_color(self.config.outline_color)
    }
}
