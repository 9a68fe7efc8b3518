//! Configuration for invoice layout.
//!
//! Every constant the engine uses lives here so a TOML file can override any
//! subset of them. Missing keys keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::sections::HEADER_LINES;
use crate::error::InvoiceError;
use crate::model::{PageGeometry, PageSize};
use crate::style::Palette;

/// Configuration options for layout computation. All lengths are in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_size: PageSize,
    /// Uniform page margin
    pub margin: f64,

    /// Prefix for every amount, e.g. "Rs. " or "$"
    pub currency_prefix: String,
    /// chrono format string for issue and due dates
    pub date_format: String,
    /// Document title in the header band
    pub title: String,
    /// Caption printed at the bottom of the last page
    pub footer_text: String,

    pub header_height: f64,
    pub title_font_size: f64,
    pub meta_font_size: f64,
    pub meta_line_height: f64,

    /// Vertical space between sections
    pub section_gap: f64,
    pub label_font_size: f64,
    pub body_font_size: f64,
    pub body_line_height: f64,
    /// Space between a party column and the page centre line
    pub column_gutter: f64,

    pub table_header_height: f64,
    pub min_row_height: f64,
    pub row_line_height: f64,
    pub cell_padding: f64,
    pub amount_column_width: f64,

    pub totals_width: f64,
    pub totals_line_height: f64,
    pub total_font_size: f64,
    pub total_line_height: f64,
    /// Slot reserved for the rule above the total line
    pub rule_height: f64,

    /// Band above the bottom margin kept free of flowed content
    pub footer_height: f64,
    pub footer_font_size: f64,

    pub palette: Palette,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin: 40.0,
            currency_prefix: "Rs. ".to_string(),
            date_format: "%d %b %Y".to_string(),
            title: "INVOICE".to_string(),
            footer_text: "Thank you for your business!".to_string(),
            header_height: 90.0,
            title_font_size: 24.0,
            meta_font_size: 10.0,
            meta_line_height: 14.0,
            section_gap: 18.0,
            label_font_size: 9.0,
            body_font_size: 10.0,
            body_line_height: 14.0,
            column_gutter: 10.0,
            table_header_height: 22.0,
            min_row_height: 20.0,
            row_line_height: 14.0,
            cell_padding: 6.0,
            amount_column_width: 100.0,
            totals_width: 220.0,
            totals_line_height: 18.0,
            total_font_size: 12.0,
            total_line_height: 22.0,
            rule_height: 8.0,
            footer_height: 24.0,
            footer_font_size: 9.0,
            palette: Palette::default(),
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML configuration
    pub fn from_toml_str(source: &str) -> Result<Self, InvoiceError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InvoiceError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| InvoiceError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Set the page size
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    /// Set the uniform page margin
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Set the currency prefix
    pub fn with_currency_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.currency_prefix = prefix.into();
        self
    }

    /// Set the date format
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Set the footer caption
    pub fn with_footer_text(mut self, text: impl Into<String>) -> Self {
        self.footer_text = text.into();
        self
    }

    /// Set the palette
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::new(self.page_size, self.margin)
    }

    /// Vertical space a page needs inside its margins: the header band on
    /// the first page, the table header, the tallest unsplittable block, and
    /// the footer band.
    pub fn min_content_height(&self) -> f64 {
        let tallest_block = [
            self.min_row_height,
            self.row_line_height,
            self.totals_line_height,
            self.total_line_height,
            self.rule_height,
            2.0 * self.body_line_height,
        ]
        .into_iter()
        .fold(0.0, f64::max);
        self.header_height + self.table_header_height + tallest_block + self.footer_height
    }

    /// Reject configurations the engine cannot lay out. Checked before any
    /// instruction is produced.
    pub fn validate(&self) -> Result<(), InvoiceError> {
        let lengths = [
            ("header_height", self.header_height),
            ("meta_line_height", self.meta_line_height),
            ("section_gap", self.section_gap),
            ("body_line_height", self.body_line_height),
            ("column_gutter", self.column_gutter),
            ("table_header_height", self.table_header_height),
            ("min_row_height", self.min_row_height),
            ("row_line_height", self.row_line_height),
            ("cell_padding", self.cell_padding),
            ("amount_column_width", self.amount_column_width),
            ("totals_width", self.totals_width),
            ("totals_line_height", self.totals_line_height),
            ("total_line_height", self.total_line_height),
            ("rule_height", self.rule_height),
            ("footer_height", self.footer_height),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(InvoiceError::InvalidGeometry(format!(
                    "{} must be a non-negative length, got {}",
                    name, value
                )));
            }
        }

        let font_sizes = [
            ("title_font_size", self.title_font_size),
            ("meta_font_size", self.meta_font_size),
            ("label_font_size", self.label_font_size),
            ("body_font_size", self.body_font_size),
            ("total_font_size", self.total_font_size),
            ("footer_font_size", self.footer_font_size),
        ];
        for (name, value) in font_sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(InvoiceError::InvalidGeometry(format!(
                    "{} must be a positive size, got {}",
                    name, value
                )));
            }
        }

        if self.row_line_height <= 0.0 || self.body_line_height <= 0.0 {
            return Err(InvoiceError::InvalidGeometry(
                "line heights must be positive".to_string(),
            ));
        }

        let meta_block = HEADER_LINES.len() as f64 * self.meta_line_height;
        if meta_block > self.header_height {
            return Err(InvoiceError::InvalidGeometry(format!(
                "header_height {} cannot hold {} header lines of {}",
                self.header_height,
                HEADER_LINES.len(),
                self.meta_line_height
            )));
        }

        let geometry = self.geometry();
        geometry.validate(self.min_content_height())?;

        let column_width = geometry.content_width() / 2.0 - self.column_gutter;
        if column_width <= 0.0 {
            return Err(InvoiceError::InvalidGeometry(format!(
                "column_gutter {} leaves no room for the party columns",
                self.column_gutter
            )));
        }
        if geometry.content_width() <= self.amount_column_width + 2.0 * self.cell_padding {
            return Err(InvoiceError::InvalidGeometry(format!(
                "content width {} leaves no room for the description column",
                geometry.content_width()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.page_size, PageSize::A4);
        assert_eq!(config.margin, 40.0);
        assert_eq!(config.currency_prefix, "Rs. ");
        assert_eq!(config.min_row_height, 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new()
            .with_page_size(PageSize::Letter)
            .with_margin(36.0)
            .with_currency_prefix("$");

        assert_eq!(config.page_size, PageSize::Letter);
        assert_eq!(config.margin, 36.0);
        assert_eq!(config.currency_prefix, "$");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LayoutConfig::from_toml_str(
            r##"
            page_size = "Letter"
            margin = 50.0
            footer_text = "Drive safe!"

            [palette]
            header_background = "#0a6640"
            "##,
        )
        .unwrap();
        assert_eq!(config.page_size, PageSize::Letter);
        assert_eq!(config.margin, 50.0);
        assert_eq!(config.footer_text, "Drive safe!");
        assert_eq!(config.palette.header_background, Color::hex("#0a6640"));
        assert_eq!(config.palette.header_text, Color::WHITE);
        assert_eq!(config.currency_prefix, "Rs. ");
    }

    #[test]
    fn test_custom_page_size_toml() {
        let config = LayoutConfig::from_toml_str(
            r#"
            [page_size.Custom]
            width = 400.0
            height = 600.0
            "#,
        )
        .unwrap();
        assert_eq!(config.geometry().width, 400.0);
        assert_eq!(config.geometry().height, 600.0);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = LayoutConfig::from_toml_str("margin = \"wide\"").unwrap_err();
        assert!(matches!(err, InvoiceError::ConfigError(_)));
    }

    #[test]
    fn test_validate_rejects_negative_margin() {
        let config = LayoutConfig::new().with_margin(-5.0);
        assert!(matches!(
            config.validate(),
            Err(InvoiceError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_validate_rejects_tiny_page() {
        let config = LayoutConfig::new().with_page_size(PageSize::Custom {
            width: 595.0,
            height: 200.0,
        });
        assert!(config.validate().is_err());
    }

    fn assert_rejected(config: LayoutConfig) {
        assert!(
            matches!(config.validate(), Err(InvoiceError::InvalidGeometry(_))),
            "{:?} accepted",
            config
        );
    }

    #[test]
    fn test_validate_rejects_nan_meta_line_height() {
        let config = LayoutConfig::from_toml_str("meta_line_height = nan").unwrap();
        assert_rejected(config);
    }

    #[test]
    fn test_validate_rejects_bad_font_sizes() {
        for toml in [
            "title_font_size = 0.0",
            "meta_font_size = -3.0",
            "label_font_size = nan",
            "body_font_size = 0.0",
            "total_font_size = inf",
            "footer_font_size = -1.0",
        ] {
            assert_rejected(LayoutConfig::from_toml_str(toml).unwrap());
        }
    }

    #[test]
    fn test_validate_rejects_negative_spacing() {
        for toml in [
            "cell_padding = -1.0",
            "column_gutter = -4.0",
            "totals_width = nan",
            "amount_column_width = -10.0",
        ] {
            assert_rejected(LayoutConfig::from_toml_str(toml).unwrap());
        }
    }

    #[test]
    fn test_validate_rejects_gutter_wider_than_column() {
        assert_rejected(LayoutConfig::from_toml_str("column_gutter = 300.0").unwrap());
    }

    #[test]
    fn test_validate_rejects_header_too_short_for_meta_lines() {
        let config = LayoutConfig::from_toml_str(
            r#"
            header_height = 40.0
            meta_line_height = 14.0
            "#,
        )
        .unwrap();
        assert_rejected(config);
    }

    #[test]
    fn test_missing_config_file_is_read_error() {
        let path = std::env::temp_dir().join("garage-invoice-no-such-layout.toml");
        let err = LayoutConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, InvoiceError::ConfigRead { .. }));
        assert!(err.to_string().starts_with("Cannot read layout configuration"));
    }
}
