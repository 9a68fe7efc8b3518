//! Structured error types for the invoice layout engine.
//!
//! Each variant maps to one real error source, from JSON input through
//! configuration files and page geometry to PDF serialization.

use std::path::PathBuf;

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// JSON input failed to parse as a valid invoice document.
    #[error("Failed to parse invoice: {source}{}", hint_suffix(.hint))]
    ParseError {
        source: serde_json::Error,
        hint: String,
    },
    /// A layout configuration file could not be parsed.
    #[error("Invalid layout configuration: {0}")]
    ConfigError(#[from] toml::de::Error),
    /// A layout configuration file could not be read.
    #[error("Cannot read layout configuration {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The page geometry cannot hold an invoice. Raised before any layout work.
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),
    /// PDF generation failed.
    #[error("Render error: {0}")]
    RenderError(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for InvoiceError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the invoice schema. Check field names (camelCase), dates (YYYY-MM-DD) and amounts.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        InvoiceError::ParseError { source: e, hint }
    }
}
