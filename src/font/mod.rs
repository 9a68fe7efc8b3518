//! # Font Management
//!
//! Invoices are set in the standard PDF Helvetica family, which PDF viewers
//! ship with. No embedding is needed, and layout measures text with the
//! same AFM widths the viewer will use to draw it.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use serde::{Deserialize, Serialize};

/// Weight of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

impl FontWeight {
    pub fn standard_font(self) -> StandardFont {
        match self {
            FontWeight::Regular => StandardFont::Helvetica,
            FontWeight::Bold => StandardFont::HelveticaBold,
        }
    }
}

/// The standard PDF fonts used for invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
        }
    }
}

/// Text measurement shared by layout and PDF serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, weight: FontWeight, font_size: f64) -> f64 {
        weight.standard_font().metrics().char_width(ch, font_size)
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, weight: FontWeight, font_size: f64) -> f64 {
        weight
            .standard_font()
            .metrics()
            .measure_string(text, font_size)
    }

    /// Baseline offset from the top of a line box of `line_height`.
    ///
    /// The glyph box is centred vertically in the line box.
    pub fn baseline_offset(&self, weight: FontWeight, font_size: f64, line_height: f64) -> f64 {
        let metrics = weight.standard_font().metrics();
        let glyph_height =
            (metrics.ascender - metrics.descender) as f64 / 1000.0 * font_size;
        (line_height - glyph_height) / 2.0 + metrics.ascent(font_size)
    }
}
