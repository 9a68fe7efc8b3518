//! # Invoice Model
//!
//! The input representation for the layout engine. An invoice arrives from
//! the application layer (usually as JSON with camelCase keys) fully
//! populated; the engine never re-validates business rules such as
//! `total == subtotal + tax - discount`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvoiceError;

/// A complete invoice ready for layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    /// Identifier displayed verbatim in the header.
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub customer: Customer,
    /// Free-text vehicle descriptor, e.g. "2019 Honda Civic, KA-01-AB-1234".
    #[serde(default)]
    pub vehicle_info: String,
    /// Billable lines in display order.
    #[serde(default)]
    pub work_items: Vec<WorkItem>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax: Option<Decimal>,
    #[serde(default)]
    pub discount: Option<Decimal>,
    pub total: Decimal,
    /// The issuing service center.
    #[serde(default)]
    pub service: ServiceInfo,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, rename = "isGST")]
    pub is_gst: bool,
    #[serde(default)]
    pub gst_number: Option<String>,
}

/// The bill-to party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// The issuing service center.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// A single billable line (labor or part).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub title: String,
    pub price: Decimal,
}

impl WorkItem {
    pub fn new(title: impl Into<String>, price: Decimal) -> Self {
        Self {
            title: title.into(),
            price,
        }
    }
}

impl InvoiceDocument {
    /// Tax amount when it should be printed: present and non-zero.
    pub fn printable_tax(&self) -> Option<Decimal> {
        self.tax.filter(|t| !t.is_zero())
    }

    /// Discount amount when it should be printed: present and non-zero.
    pub fn printable_discount(&self) -> Option<Decimal> {
        self.discount.filter(|d| !d.is_zero())
    }

    /// Notes text when it has visible content.
    pub fn printable_notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// GST registration number when the invoice is a GST invoice.
    pub fn printable_gst_number(&self) -> Option<&str> {
        if !self.is_gst {
            return None;
        }
        self.gst_number.as_deref().filter(|n| !n.trim().is_empty())
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }

    /// Parse a size name such as `a4` or `letter`, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Some(PageSize::A4),
            "a5" => Some(PageSize::A5),
            "letter" => Some(PageSize::Letter),
            "legal" => Some(PageSize::Legal),
            _ => None,
        }
    }
}

/// Page size plus a uniform margin, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    pub fn new(size: PageSize, margin: f64) -> Self {
        let (width, height) = size.dimensions();
        Self {
            width,
            height,
            margin,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Largest y any instruction may reach.
    pub fn bottom_limit(&self) -> f64 {
        self.height - self.margin
    }

    /// Reject geometry that cannot hold a page of content.
    ///
    /// `min_content_height` is the vertical space the caller needs inside the
    /// margins beyond the fixed bands.
    pub fn validate(&self, min_content_height: f64) -> Result<(), InvoiceError> {
        if !(self.width.is_finite() && self.height.is_finite() && self.margin.is_finite()) {
            return Err(InvoiceError::InvalidGeometry(
                "page size and margin must be finite".to_string(),
            ));
        }
        if self.margin < 0.0 {
            return Err(InvoiceError::InvalidGeometry(format!(
                "margin must be non-negative, got {}",
                self.margin
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(InvoiceError::InvalidGeometry(format!(
                "page size must be positive, got {} x {}",
                self.width, self.height
            )));
        }
        if self.content_width() <= 0.0 {
            return Err(InvoiceError::InvalidGeometry(format!(
                "margin {} leaves no horizontal space on a {} pt wide page",
                self.margin, self.width
            )));
        }
        let content_height = self.height - 2.0 * self.margin;
        if content_height < min_content_height {
            return Err(InvoiceError::InvalidGeometry(format!(
                "page height {} with margin {} leaves {} pt, need at least {} pt",
                self.height, self.margin, content_height, min_content_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_JSON: &str = r#"{
        "invoiceNumber": "INV-0001",
        "issueDate": "2026-03-01",
        "customer": { "name": "Asha Rao" },
        "subtotal": 1500,
        "total": "1500.00"
    }"#;

    #[test]
    fn deserialize_minimal_invoice() {
        let invoice: InvoiceDocument = serde_json::from_str(MINIMAL_JSON).unwrap();
        assert_eq!(invoice.invoice_number, "INV-0001");
        assert_eq!(invoice.issue_date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert!(invoice.work_items.is_empty());
        assert_eq!(invoice.total, Decimal::new(150000, 2));
        assert_eq!(invoice.service, ServiceInfo::default());
        assert!(!invoice.is_gst);
    }

    #[test]
    fn deserialize_gst_fields() {
        let json = r#"{
            "invoiceNumber": "G-7",
            "issueDate": "2026-03-01",
            "customer": { "name": "Asha Rao", "phone": "98450 00000" },
            "workItems": [{ "title": "Coolant flush", "price": 899.5 }],
            "subtotal": 899.5,
            "tax": 161.91,
            "total": 1061.41,
            "isGST": true,
            "gstNumber": "29ABCDE1234F1Z5"
        }"#;
        let invoice: InvoiceDocument = serde_json::from_str(json).unwrap();
        assert!(invoice.is_gst);
        assert_eq!(invoice.printable_gst_number(), Some("29ABCDE1234F1Z5"));
        assert_eq!(invoice.work_items[0].title, "Coolant flush");
        assert_eq!(invoice.customer.phone.as_deref(), Some("98450 00000"));
    }

    #[test]
    fn zero_tax_and_discount_are_not_printable() {
        let mut invoice: InvoiceDocument = serde_json::from_str(MINIMAL_JSON).unwrap();
        invoice.tax = Some(Decimal::ZERO);
        invoice.discount = Some(Decimal::new(0, 2));
        assert_eq!(invoice.printable_tax(), None);
        assert_eq!(invoice.printable_discount(), None);
        invoice.tax = Some(Decimal::new(1850, 2));
        assert_eq!(invoice.printable_tax(), Some(Decimal::new(1850, 2)));
    }

    #[test]
    fn blank_notes_are_not_printable() {
        let mut invoice: InvoiceDocument = serde_json::from_str(MINIMAL_JSON).unwrap();
        invoice.notes = Some("  \n ".to_string());
        assert_eq!(invoice.printable_notes(), None);
    }

    #[test]
    fn gst_number_requires_flag() {
        let mut invoice: InvoiceDocument = serde_json::from_str(MINIMAL_JSON).unwrap();
        invoice.gst_number = Some("29ABCDE1234F1Z5".to_string());
        assert_eq!(invoice.printable_gst_number(), None);
    }

    #[test]
    fn page_size_names() {
        assert_eq!(PageSize::from_name("Letter"), Some(PageSize::Letter));
        assert_eq!(PageSize::from_name("tabloid"), None);
        assert_eq!(PageSize::A4.dimensions(), (595.28, 841.89));
    }

    #[test]
    fn geometry_validation() {
        assert!(PageGeometry::new(PageSize::A4, 40.0).validate(200.0).is_ok());
        assert!(PageGeometry::new(PageSize::A4, -1.0).validate(200.0).is_err());
        assert!(PageGeometry::new(PageSize::A4, 300.0).validate(200.0).is_err());
        assert!(PageGeometry::new(PageSize::A4, f64::NAN).validate(200.0).is_err());
        let tiny = PageSize::Custom {
            width: 300.0,
            height: 150.0,
        };
        assert!(PageGeometry::new(tiny, 10.0).validate(200.0).is_err());
        let negative = PageSize::Custom {
            width: -300.0,
            height: 400.0,
        };
        assert!(PageGeometry::new(negative, 0.0).validate(10.0).is_err());
    }
}
