//! # Drawing Surfaces
//!
//! The contract between the layout and a concrete drawing backend, and the
//! executor that applies a [`PagePlan`] to it.
//!
//! Backends are stateful in the "set, then draw" style. The executor therefore
//! sets the complete style of every command immediately before issuing it and
//! restores the baseline style once the plan has been applied, so no command
//! ever depends on state left behind by another.

pub mod recording;

use crate::error::FormslateError;
use crate::layout::{DrawCommand, PagePlan};
use crate::model::{Metadata, Page};
use crate::style::{Color, FontWeight, StyleSpec, TextAlign};

pub use crate::layout::{RectMode, TextMeasure};

/// Placement options for [`DrawingSurface::text`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextOptions {
    pub align: TextAlign,
    /// Wrap onto further lines past this width, in page units.
    pub max_width: Option<f64>,
}

/// A sink of primitive drawing operations at absolute page coordinates.
///
/// Coordinates use a top-left origin in page units; `y` of text is its
/// baseline. Font sizes are in points.
pub trait DrawingSurface: TextMeasure {
    fn page_width(&self) -> f64;

    fn set_font(&mut self, family: &str, weight: FontWeight) -> Result<(), FormslateError>;
    fn set_font_size(&mut self, points: f64) -> Result<(), FormslateError>;
    fn set_text_color(&mut self, color: Color) -> Result<(), FormslateError>;
    fn set_draw_color(&mut self, color: Color) -> Result<(), FormslateError>;
    fn set_fill_color(&mut self, color: Color) -> Result<(), FormslateError>;

    fn text(&mut self, content: &str, x: f64, y: f64, options: TextOptions)
        -> Result<(), FormslateError>;
    fn text_with_link(
        &mut self,
        content: &str,
        x: f64,
        y: f64,
        url: &str,
        align: TextAlign,
    ) -> Result<(), FormslateError>;
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, mode: RectMode)
        -> Result<(), FormslateError>;
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), FormslateError>;

    /// Finish the document and persist it under `filename`. No drawing may
    /// follow.
    fn save(&mut self, filename: &str) -> Result<(), FormslateError>;
}

/// Creates one fresh surface per render.
pub trait SurfaceFactory {
    type Surface: DrawingSurface;

    fn create(&self, page: &Page, metadata: &Metadata) -> Result<Self::Surface, FormslateError>;
}

/// Set every style property a command depends on.
pub fn apply_style<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    style: &StyleSpec,
) -> Result<(), FormslateError> {
    surface.set_font(&style.font_family, style.font_weight)?;
    surface.set_font_size(style.font_size)?;
    surface.set_text_color(style.text_color)?;
    surface.set_draw_color(style.draw_color)?;
    surface.set_fill_color(style.fill_color)
}

/// Issue every command in order, then reset the surface to the baseline style.
pub fn apply_commands<S: DrawingSurface + ?Sized>(
    commands: &[DrawCommand],
    surface: &mut S,
) -> Result<(), FormslateError> {
    for command in commands {
        apply_style(surface, command.style())?;
        match command {
            DrawCommand::Text {
                content,
                x,
                y,
                align,
                max_width,
                ..
            } => surface.text(
                content,
                *x,
                *y,
                TextOptions {
                    align: *align,
                    max_width: *max_width,
                },
            )?,
            DrawCommand::Link {
                content,
                x,
                y,
                url,
                align,
                ..
            } => surface.text_with_link(content, *x, *y, url, *align)?,
            DrawCommand::Line { x1, y1, x2, y2, .. } => surface.line(*x1, *y1, *x2, *y2)?,
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                mode,
                ..
            } => surface.rect(*x, *y, *width, *height, *mode)?,
        }
    }
    apply_style(surface, &StyleSpec::default())
}

/// Apply a plan and persist it. `save` only runs when every command succeeded.
pub fn execute<S: DrawingSurface + ?Sized>(
    plan: &PagePlan,
    surface: &mut S,
) -> Result<(), FormslateError> {
    apply_commands(&plan.commands, surface)?;
    surface.save(&plan.output_name)
}
