//! # Font Management
//!
//! The standard PDF fonts (Helvetica and Courier, regular and bold). They need
//! no embedding, so a font here is just a name and a width table.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use std::collections::HashMap;

use crate::style::FontWeight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
            Self::Courier | Self::CourierBold => &metrics::COURIER,
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FontKey {
    family: String,
    weight: FontWeight,
}

/// Maps a family + weight to a standard font.
#[derive(Debug, Clone)]
pub struct FontRegistry {
    fonts: HashMap<FontKey, StandardFont>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let standard_mappings = [
            ("helvetica", FontWeight::Normal, StandardFont::Helvetica),
            ("helvetica", FontWeight::Bold, StandardFont::HelveticaBold),
            ("arial", FontWeight::Normal, StandardFont::Helvetica),
            ("arial", FontWeight::Bold, StandardFont::HelveticaBold),
            ("courier", FontWeight::Normal, StandardFont::Courier),
            ("courier", FontWeight::Bold, StandardFont::CourierBold),
        ];

        let fonts = standard_mappings
            .into_iter()
            .map(|(family, weight, font)| {
                (
                    FontKey {
                        family: family.to_string(),
                        weight,
                    },
                    font,
                )
            })
            .collect();

        Self { fonts }
    }

    /// Look up a font, falling back to Helvetica if the family is unknown.
    /// Family names match case-insensitively.
    pub fn resolve(&self, family: &str, weight: FontWeight) -> StandardFont {
        let key = FontKey {
            family: family.to_ascii_lowercase(),
            weight,
        };
        if let Some(font) = self.fonts.get(&key) {
            return *font;
        }
        log::warn!("unknown font family '{}', using Helvetica", family);
        match weight {
            FontWeight::Normal => StandardFont::Helvetica,
            FontWeight::Bold => StandardFont::HelveticaBold,
        }
    }
}

/// Shared font context used by text measurement and PDF serialization.
#[derive(Debug, Clone, Default)]
pub struct FontContext {
    registry: FontRegistry,
}

impl FontContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, family: &str, weight: FontWeight) -> StandardFont {
        self.registry.resolve(family, weight)
    }

    /// Measure the width of a string in points.
    pub fn measure_string(
        &self,
        text: &str,
        family: &str,
        weight: FontWeight,
        font_size: f64,
    ) -> f64 {
        self.resolve(family, weight)
            .metrics()
            .measure_string(text, font_size, 0.0)
    }
}
