//! # Garage Invoice
//!
//! A page-aware invoice layout engine for garage and service-center billing.
//!
//! An invoice record goes in; an ordered list of positioned drawing
//! instructions comes out, each tagged with the page it belongs to. The
//! engine decides page breaks while it lays content out: a table row that
//! does not fit the rest of the page moves to the next one whole, and the
//! footer is always anchored to the bottom of the last page.
//!
//! Layout is a pure function of the invoice and the configuration. The same
//! input always produces the same instructions, and nothing is shared
//! between calls.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Invoice record, page sizes and geometry
//!       ↓
//!   [layout]   — Section-by-section, page-aware layout
//!       ↓          (uses [text] for wrapping and [font] for metrics)
//!   DrawInstruction[]
//!       ↓
//!   [pdf]      — Serialize to PDF bytes
//! ```

pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod text;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub use error::InvoiceError;
pub use layout::{DrawInstruction, DrawKind, LayoutConfig, LayoutEngine, LayoutState, Role};
pub use model::{Customer, InvoiceDocument, PageGeometry, PageSize, ServiceInfo, WorkItem};

use pdf::{Metadata, PdfWriter};

/// Lay out an invoice on pages of the given size and margin.
///
/// Every other setting uses [`LayoutConfig::default`].
pub fn layout(
    invoice: &InvoiceDocument,
    page_size: PageSize,
    margin: f64,
) -> Result<Vec<DrawInstruction>, InvoiceError> {
    let config = LayoutConfig::default()
        .with_page_size(page_size)
        .with_margin(margin);
    LayoutEngine::new(config).layout(invoice)
}

/// Lay out an invoice given as JSON with the default configuration.
pub fn layout_json(json: &str) -> Result<Vec<DrawInstruction>, InvoiceError> {
    let invoice: InvoiceDocument = serde_json::from_str(json)?;
    LayoutEngine::default().layout(&invoice)
}

/// Render an invoice to PDF bytes.
pub fn render(invoice: &InvoiceDocument, config: &LayoutConfig) -> Result<Vec<u8>, InvoiceError> {
    let instructions = LayoutEngine::new(config.clone()).layout(invoice)?;
    let pages = layout::paginate(&instructions, &config.geometry());
    PdfWriter::new().write(&pages, &metadata_for(invoice))
}

/// Render an invoice to a `data:application/pdf;base64,` URL.
pub fn render_data_url(invoice: &InvoiceDocument, config: &LayoutConfig) -> Result<String, InvoiceError> {
    let bytes = render(invoice, config)?;
    Ok(format!("data:application/pdf;base64,{}", STANDARD.encode(bytes)))
}

/// Render an invoice given as JSON to PDF bytes with the default configuration.
pub fn render_json(json: &str) -> Result<Vec<u8>, InvoiceError> {
    let invoice: InvoiceDocument = serde_json::from_str(json)?;
    render(&invoice, &LayoutConfig::default())
}

fn metadata_for(invoice: &InvoiceDocument) -> Metadata {
    Metadata {
        title: Some(format!("Invoice {}", invoice.invoice_number)),
        author: invoice.service.name.clone(),
        subject: Some(format!("Invoice for {}", invoice.customer.name)),
    }
}
