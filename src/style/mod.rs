//! # Style System
//!
//! Every drawing operation carries a complete [`StyleSpec`]. Nothing in the
//! layout relies on font or color state left behind by an earlier call, so a
//! style is a plain value type with no shared mutable state.

use serde::{Deserialize, Serialize};

/// An RGB color with alpha. Components are in the 0.0 - 1.0 range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const BLUE: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build a color from 0-255 channel values.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Horizontal anchoring of a text run relative to its x coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// The full visual state needed by one drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleSpec {
    pub font_family: String,
    pub font_weight: FontWeight,
    /// Font size in points.
    pub font_size: f64,
    pub text_color: Color,
    /// Stroke color for lines and outlines.
    pub draw_color: Color,
    pub fill_color: Color,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_weight: FontWeight::Normal,
            font_size: 10.0,
            text_color: Color::BLACK,
            draw_color: Color::BLACK,
            fill_color: Color::WHITE,
        }
    }
}

impl StyleSpec {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_size,
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.font_weight = FontWeight::Bold;
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    pub fn with_draw_color(mut self, color: Color) -> Self {
        self.draw_color = color;
        self
    }

    pub fn with_fill_color(mut self, color: Color) -> Self {
        self.fill_color = color;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb8_scales_channels() {
        let c = Color::rgb8(200, 220, 255);
        assert!((c.r - 200.0 / 255.0).abs() < 1e-9);
        assert!((c.b - 1.0).abs() < 1e-9);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_style_builders_do_not_touch_other_fields() {
        let base = StyleSpec::sized(12.0);
        let bold = base.clone().bold();
        assert_eq!(bold.font_weight, FontWeight::Bold);
        assert_eq!(bold.font_size, 12.0);
        assert_eq!(base.font_weight, FontWeight::Normal);
    }

    #[test]
    fn test_style_deserializes_with_defaults() {
        let style: StyleSpec = serde_json::from_str(r#"{ "fontSize": 14, "fontWeight": "Bold" }"#).unwrap();
        assert_eq!(style.font_size, 14.0);
        assert_eq!(style.font_weight, FontWeight::Bold);
        assert_eq!(style.font_family, "Helvetica");
        assert_eq!(style.text_color, Color::BLACK);
    }
}
