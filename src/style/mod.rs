//! # Style
//!
//! Colors and the invoice palette. All colors are RGB with components in
//! `0.0..=1.0`, the way PDF content streams consume them.

use serde::{Deserialize, Deserializer, Serialize};

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb`. Malformed input yields black.
    pub fn hex(hex: &str) -> Self {
        Self::try_hex(hex).unwrap_or(Color::BLACK)
    }

    fn try_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                (r, g, b)
            }
            _ => return None,
        };
        Some(Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        })
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Colors may be written as `"#1f3a5f"` or `{ r = 0.12, g = 0.23, b = 0.37 }`.
impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Rgb { r: f64, g: f64, b: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Color::try_hex(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{}`", s))),
            Repr::Rgb { r, g, b } => Ok(Color { r, g, b }),
        }
    }
}

/// The colors an invoice is drawn with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Palette {
    pub header_background: Color,
    pub header_text: Color,
    pub body_text: Color,
    pub muted_text: Color,
    pub table_header_background: Color,
    pub table_header_text: Color,
    pub row_stripe: Color,
    pub rule: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            header_background: Color::rgb(0.118, 0.227, 0.373),
            header_text: Color::WHITE,
            body_text: Color::rgb(0.1, 0.1, 0.15),
            muted_text: Color::rgb(0.4, 0.4, 0.4),
            table_header_background: Color::rgb(0.88, 0.9, 0.93),
            table_header_text: Color::rgb(0.1, 0.1, 0.15),
            row_stripe: Color::rgb(0.96, 0.97, 0.98),
            rule: Color::rgb(0.6, 0.6, 0.6),
        }
    }
}
