//! Spacing, sizing, and typography constants for the certificate page.
//!
//! All distances are in page units. One layout algorithm reads these values;
//! variants of the form differ only by configuration.

use serde::{Deserialize, Serialize};

use crate::model::ColumnWidth;
use crate::style::{Color, StyleSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Left and right page margin.
    pub margin: f64,
    /// Cursor position of the first title line's baseline.
    pub title_top: f64,
    /// Advance between title block lines.
    pub line_height: f64,
    /// Distance of the link underline below the link baseline.
    pub underline_offset: f64,
    /// Advance from the link line to the caption.
    pub caption_gap: f64,
    /// Advance from the caption to the introductory paragraph.
    pub paragraph_gap: f64,
    /// Left edge of the introductory paragraph.
    pub paragraph_x: f64,
    pub paragraph_max_width: f64,
    /// Advance from the paragraph to the first section.
    pub section_gap: f64,

    pub band_height: f64,
    pub band_fill: Color,
    /// Baseline of the section title within its band.
    pub band_title_baseline: f64,
    /// Horizontal inset of band titles and cell labels.
    pub cell_inset: f64,
    pub row_height: f64,
    /// Baseline of a cell label within its row.
    pub label_baseline: f64,
    /// Baseline of a cell value within its row.
    pub value_baseline: f64,
    /// Gap between the end of a label and the start of its value.
    pub value_gap: f64,
    pub name_columns: Vec<ColumnWidth>,
    pub identity_columns: Vec<ColumnWidth>,

    pub title_style: StyleSpec,
    pub link_color: Color,
    pub caption_style: StyleSpec,
    pub paragraph_style: StyleSpec,
    pub section_title_style: StyleSpec,
    pub label_style: StyleSpec,
    pub value_style: StyleSpec,
    /// Stroke used for band and cell outlines.
    pub outline_color: Color,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 10.0,
            title_top: 15.0,
            line_height: 5.0,
            underline_offset: 0.5,
            caption_gap: 10.0,
            paragraph_gap: 10.0,
            paragraph_x: 8.0,
            paragraph_max_width: 200.0,
            section_gap: 20.0,
            band_height: 6.0,
            band_fill: Color::rgb8(200, 220, 255),
            band_title_baseline: 4.0,
            cell_inset: 2.0,
            row_height: 9.0,
            label_baseline: 3.0,
            value_baseline: 6.0,
            value_gap: 2.0,
            name_columns: vec![
                ColumnWidth::Fraction(0.4),
                ColumnWidth::Fraction(0.4),
                ColumnWidth::Fraction(0.2),
            ],
            identity_columns: vec![ColumnWidth::Fixed(100.0), ColumnWidth::Remainder],
            title_style: StyleSpec::sized(10.0),
            link_color: Color::BLUE,
            caption_style: StyleSpec::sized(12.0).bold(),
            paragraph_style: StyleSpec::sized(10.0),
            section_title_style: StyleSpec::sized(11.0).bold(),
            label_style: StyleSpec::sized(9.0),
            value_style: StyleSpec::sized(14.0),
            outline_color: Color::BLACK,
        }
    }
}
