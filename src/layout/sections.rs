//! Renderable sections of an invoice.
//!
//! The document is a fixed, ordered list of sections. Optional content
//! (due date, tax, discount, notes) is a variant with its own applicability
//! predicate instead of a branch buried in the layout code, so the list can
//! be checked against an invoice on its own.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::InvoiceDocument;

/// Top-level blocks in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    HeaderBand,
    Parties,
    Vehicle,
    ItemTable,
    Totals,
    Notes,
    Footer,
}

pub const DOCUMENT_SECTIONS: [Section; 7] = [
    Section::HeaderBand,
    Section::Parties,
    Section::Vehicle,
    Section::ItemTable,
    Section::Totals,
    Section::Notes,
    Section::Footer,
];

impl Section {
    pub fn applies(&self, invoice: &InvoiceDocument) -> bool {
        match self {
            Section::Vehicle => !invoice.vehicle_info.trim().is_empty(),
            Section::Notes => invoice.printable_notes().is_some(),
            Section::HeaderBand
            | Section::Parties
            | Section::ItemTable
            | Section::Totals
            | Section::Footer => true,
        }
    }
}

/// Right-aligned lines in the header band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLine {
    InvoiceNumber,
    IssueDate,
    DueDate,
}

pub const HEADER_LINES: [HeaderLine; 3] = [
    HeaderLine::InvoiceNumber,
    HeaderLine::IssueDate,
    HeaderLine::DueDate,
];

impl HeaderLine {
    pub fn applies(&self, invoice: &InvoiceDocument) -> bool {
        match self {
            HeaderLine::DueDate => invoice.due_date.is_some(),
            HeaderLine::InvoiceNumber | HeaderLine::IssueDate => true,
        }
    }

    /// The text of this line, or `None` when it does not apply.
    pub fn text(&self, invoice: &InvoiceDocument, date_format: &str) -> Option<String> {
        match self {
            HeaderLine::InvoiceNumber => Some(format!("Invoice #: {}", invoice.invoice_number)),
            HeaderLine::IssueDate => Some(format!(
                "Date: {}",
                format_date(invoice.issue_date, date_format)
            )),
            HeaderLine::DueDate => invoice
                .due_date
                .map(|d| format!("Due: {}", format_date(d, date_format))),
        }
    }
}

/// Lines of the totals block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsLine {
    Subtotal,
    Tax,
    Discount,
    Rule,
    Total,
}

pub const TOTALS_LINES: [TotalsLine; 5] = [
    TotalsLine::Subtotal,
    TotalsLine::Tax,
    TotalsLine::Discount,
    TotalsLine::Rule,
    TotalsLine::Total,
];

impl TotalsLine {
    pub fn applies(&self, invoice: &InvoiceDocument) -> bool {
        match self {
            TotalsLine::Tax => invoice.printable_tax().is_some(),
            TotalsLine::Discount => invoice.printable_discount().is_some(),
            TotalsLine::Subtotal | TotalsLine::Rule | TotalsLine::Total => true,
        }
    }

    /// Label text. The rule has none.
    pub fn label(&self, invoice: &InvoiceDocument) -> Option<&'static str> {
        match self {
            TotalsLine::Subtotal => Some("Subtotal"),
            TotalsLine::Tax if invoice.is_gst => Some("GST"),
            TotalsLine::Tax => Some("Tax"),
            TotalsLine::Discount => Some("Discount"),
            TotalsLine::Rule => None,
            TotalsLine::Total => Some("Total"),
        }
    }

    /// Signed amount shown on this line. Discounts print negative.
    pub fn amount(&self, invoice: &InvoiceDocument) -> Option<Decimal> {
        match self {
            TotalsLine::Subtotal => Some(invoice.subtotal),
            TotalsLine::Tax => invoice.printable_tax(),
            TotalsLine::Discount => invoice.printable_discount().map(|d| -d.abs()),
            TotalsLine::Rule => None,
            TotalsLine::Total => Some(invoice.total),
        }
    }
}

/// Format an amount with two decimals and a fixed prefix: `Rs. 1250.00`,
/// `-Rs. 50.00`. No grouping separators, no locale.
pub fn format_currency(amount: Decimal, prefix: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}{:.2}", sign, prefix, rounded.abs())
}

pub fn format_date(date: NaiveDate, format: &str) -> String {
    date.format(format).to_string()
}
