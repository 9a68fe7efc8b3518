//! # Page-Aware Invoice Layout
//!
//! The engine turns an [`InvoiceDocument`] into a flat, ordered list of
//! [`DrawInstruction`]s, each tagged with the page it belongs to. It never
//! lays content out on an infinite canvas and slices it afterwards. Before
//! any block is drawn it asks "does this fit?" against the bottom of the
//! current page:
//!
//! 1. If it fits: draw it, advance the cursor
//! 2. If it doesn't fit: start a new page, reset the cursor to the top
//!    margin, draw it there
//! 3. If it can't fit even on an empty page: split it line by line
//!
//! The cursor is not shared mutable state. Each section step receives a
//! [`LayoutState`] by value and hands back a [`Step`]: the state it leaves
//! behind plus the instructions it emitted. Steps can therefore be run and
//! tested in isolation.

pub mod config;
pub mod page_break;
pub mod sections;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::InvoiceError;
use crate::font::FontWeight;
use crate::model::{InvoiceDocument, PageGeometry, WorkItem};
use crate::style::Color;
use crate::text::{TextLayout, TextStyle, WrappedLine};

pub use config::LayoutConfig;
use page_break::{decide_break, BreakDecision, EPSILON};
use sections::{format_currency, HeaderLine, Section, TotalsLine, DOCUMENT_SECTIONS, HEADER_LINES, TOTALS_LINES};

/// The logical part of the invoice an instruction draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    HeaderBand,
    Title,
    InvoiceNumber,
    IssueDate,
    DueDate,
    Issuer,
    BillTo,
    Vehicle,
    TableHeader,
    ItemRow { index: usize },
    Subtotal,
    Tax,
    Discount,
    TotalRule,
    Total,
    NotesLabel,
    NotesBody,
    Footer,
}

/// What to draw. Coordinates are in points from the top-left page corner,
/// y growing downwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DrawKind {
    /// A single line of text. `(x, y)` is the top-left of its line box.
    Text {
        content: String,
        x: f64,
        y: f64,
        /// Measured advance width.
        width: f64,
        font_size: f64,
        line_height: f64,
        weight: FontWeight,
        color: Color,
    },
    /// A filled rectangle.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
    /// A stroked line segment.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: f64,
    },
}

/// A positioned drawing directive on a zero-based page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawInstruction {
    pub page: usize,
    pub role: Role,
    #[serde(flatten)]
    pub kind: DrawKind,
}

impl DrawInstruction {
    /// Highest point of the instruction's vertical extent.
    pub fn top(&self) -> f64 {
        match &self.kind {
            DrawKind::Text { y, .. } | DrawKind::Rect { y, .. } => *y,
            DrawKind::Line { y1, y2, width, .. } => y1.min(*y2) - width / 2.0,
        }
    }

    /// Lowest point of the instruction's vertical extent.
    pub fn bottom(&self) -> f64 {
        match &self.kind {
            DrawKind::Text { y, line_height, .. } => y + line_height,
            DrawKind::Rect { y, height, .. } => y + height,
            DrawKind::Line { y1, y2, width, .. } => y1.max(*y2) + width / 2.0,
        }
    }

    /// Text content, for text runs.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            DrawKind::Text { content, .. } => Some(content),
            _ => None,
        }
    }
}

/// One page worth of instructions, ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPage {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub instructions: Vec<DrawInstruction>,
}

/// Number of pages an instruction list spans.
pub fn page_count(instructions: &[DrawInstruction]) -> usize {
    instructions.iter().map(|i| i.page + 1).max().unwrap_or(1)
}

/// Group instructions by page, preserving draw order within each page.
pub fn paginate(instructions: &[DrawInstruction], geometry: &PageGeometry) -> Vec<LayoutPage> {
    let mut pages: Vec<LayoutPage> = (0..page_count(instructions))
        .map(|index| LayoutPage {
            index,
            width: geometry.width,
            height: geometry.height,
            instructions: Vec::new(),
        })
        .collect();
    for instruction in instructions {
        pages[instruction.page].instructions.push(instruction.clone());
    }
    pages
}

/// Where the layout cursor is: a page and a vertical offset on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutState {
    pub page: usize,
    pub cursor: f64,
}

impl LayoutState {
    /// Top edge of the first page, before the header band.
    pub fn start() -> Self {
        Self {
            page: 0,
            cursor: 0.0,
        }
    }

    /// The later of two states in reading order.
    pub fn furthest(self, other: LayoutState) -> LayoutState {
        if other.page > self.page || (other.page == self.page && other.cursor > self.cursor) {
            other
        } else {
            self
        }
    }
}

/// Result of one layout step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: LayoutState,
    pub instructions: Vec<DrawInstruction>,
}

/// Read-only geometry and settings shared by every step of one layout pass.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub config: &'a LayoutConfig,
    pub geometry: PageGeometry,
    text: TextLayout,
}

impl<'a> Frame<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self {
            config,
            geometry: config.geometry(),
            text: TextLayout::new(),
        }
    }

    fn top(&self) -> f64 {
        self.geometry.margin
    }

    fn left(&self) -> f64 {
        self.geometry.margin
    }

    fn right(&self) -> f64 {
        self.geometry.width - self.geometry.margin
    }

    fn content_width(&self) -> f64 {
        self.geometry.content_width()
    }

    /// Lowest y flowed content may reach; the footer band sits below it.
    fn content_bottom(&self) -> f64 {
        self.geometry.bottom_limit() - self.config.footer_height
    }

    /// Vertical space on an empty continuation page.
    fn page_capacity(&self) -> f64 {
        self.content_bottom() - self.top()
    }

    fn body(&self) -> TextStyle {
        TextStyle::new(FontWeight::Regular, self.config.body_font_size)
    }

    fn body_bold(&self) -> TextStyle {
        TextStyle::new(FontWeight::Bold, self.config.body_font_size)
    }

    fn label(&self) -> TextStyle {
        TextStyle::new(FontWeight::Bold, self.config.label_font_size)
    }

    fn money(&self, amount: rust_decimal::Decimal) -> String {
        format_currency(amount, &self.config.currency_prefix)
    }
}

/// Builds the output of one step: a running state plus emitted instructions.
struct Flow<'f, 'a> {
    frame: &'f Frame<'a>,
    state: LayoutState,
    out: Vec<DrawInstruction>,
}

impl<'f, 'a> Flow<'f, 'a> {
    fn new(frame: &'f Frame<'a>, state: LayoutState) -> Self {
        Self {
            frame,
            state,
            out: Vec::new(),
        }
    }

    fn y(&self) -> f64 {
        self.state.cursor
    }

    fn remaining(&self) -> f64 {
        self.frame.content_bottom() - self.state.cursor
    }

    fn advance(&mut self, dy: f64) {
        self.state.cursor += dy.max(0.0);
    }

    fn break_page(&mut self) {
        self.state.page += 1;
        self.state.cursor = self.frame.top();
        debug!(page = self.state.page, "page break");
    }

    /// Make room for a block that must not be split.
    fn ensure(&mut self, height: f64) {
        match decide_break(self.remaining(), self.frame.page_capacity(), height, height) {
            BreakDecision::Place => {}
            _ => self.break_page(),
        }
    }

    fn push(&mut self, role: Role, kind: DrawKind) {
        self.out.push(DrawInstruction {
            page: self.state.page,
            role,
            kind,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        role: Role,
        content: impl Into<String>,
        x: f64,
        y: f64,
        style: TextStyle,
        line_height: f64,
        color: Color,
    ) {
        let content = content.into();
        let width = self.frame.text.measure_width(&content, style);
        self.push(
            role,
            DrawKind::Text {
                content,
                x,
                y,
                width,
                font_size: style.font_size,
                line_height,
                weight: style.weight,
                color,
            },
        );
    }

    /// Text whose right edge sits at `right`.
    #[allow(clippy::too_many_arguments)]
    fn text_right(
        &mut self,
        role: Role,
        content: impl Into<String>,
        right: f64,
        y: f64,
        style: TextStyle,
        line_height: f64,
        color: Color,
    ) {
        let content = content.into();
        let width = self.frame.text.measure_width(&content, style);
        self.text(role, content, right - width, y, style, line_height, color);
    }

    fn rect(&mut self, role: Role, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.push(
            role,
            DrawKind::Rect {
                x,
                y,
                width,
                height,
                color,
            },
        );
    }

    fn finish(self) -> Step {
        Step {
            state: self.state,
            instructions: self.out,
        }
    }
}

/// The main layout engine.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Main entry point: lay out an invoice into positioned instructions.
    ///
    /// Geometry is validated first; an invalid configuration returns an
    /// error without producing any output.
    pub fn layout(&self, invoice: &InvoiceDocument) -> Result<Vec<DrawInstruction>, InvoiceError> {
        self.config.validate()?;
        let frame = Frame::new(&self.config);

        let mut state = LayoutState::start();
        let mut instructions = Vec::new();

        for section in DOCUMENT_SECTIONS.iter().filter(|s| s.applies(invoice)) {
            let step = match section {
                Section::HeaderBand => header_band(&frame, state, invoice),
                Section::Parties => parties(&frame, state, invoice),
                Section::Vehicle => vehicle(&frame, state, invoice),
                Section::ItemTable => item_table(&frame, state, &invoice.work_items),
                Section::Totals => totals(&frame, state, invoice),
                Section::Notes => notes(&frame, state, invoice),
                Section::Footer => footer(&frame, state),
            };
            trace!(?section, page = step.state.page, cursor = step.state.cursor, "section placed");
            state = step.state;
            instructions.extend(step.instructions);
        }

        debug!(
            invoice = %invoice.invoice_number,
            pages = state.page + 1,
            instructions = instructions.len(),
            "layout complete"
        );
        Ok(instructions)
    }
}

/// Coloured band across the top of the first page with the title on the
/// left and the invoice number and dates on the right.
pub fn header_band(frame: &Frame, state: LayoutState, invoice: &InvoiceDocument) -> Step {
    let config = frame.config;
    let palette = &config.palette;
    let mut flow = Flow::new(frame, state);
    let band_top = flow.y();

    flow.rect(
        Role::HeaderBand,
        0.0,
        band_top,
        frame.geometry.width,
        config.header_height,
        palette.header_background,
    );

    let title_style = TextStyle::new(FontWeight::Bold, config.title_font_size);
    let title_line_height = config.title_font_size * 1.2;
    flow.text(
        Role::Title,
        config.title.clone(),
        frame.left(),
        band_top + ((config.header_height - title_line_height) / 2.0).max(0.0),
        title_style,
        title_line_height,
        palette.header_text,
    );

    let meta_style = TextStyle::new(FontWeight::Regular, config.meta_font_size);
    let lines: Vec<(Role, String)> = HEADER_LINES
        .iter()
        .filter(|line| line.applies(invoice))
        .filter_map(|line| {
            let role = match line {
                HeaderLine::InvoiceNumber => Role::InvoiceNumber,
                HeaderLine::IssueDate => Role::IssueDate,
                HeaderLine::DueDate => Role::DueDate,
            };
            line.text(invoice, &config.date_format).map(|t| (role, t))
        })
        .collect();
    let block = lines.len() as f64 * config.meta_line_height;
    let mut y = band_top + ((config.header_height - block) / 2.0).max(0.0);
    // Lines stay in the right half; long ones shrink rather than lose text.
    let available = frame.content_width() / 2.0 - config.column_gutter;
    for (role, content) in lines {
        let natural = frame.text.measure_width(&content, meta_style);
        let style = if natural > available {
            TextStyle::new(meta_style.weight, meta_style.font_size * available / natural)
        } else {
            meta_style
        };
        flow.text_right(
            role,
            content,
            frame.right(),
            y,
            style,
            config.meta_line_height,
            palette.header_text,
        );
        y += config.meta_line_height;
    }

    flow.state.cursor = (band_top + config.header_height + config.section_gap).max(frame.top());
    flow.finish()
}

/// One line of a party column before wrapping.
struct ColumnEntry {
    text: String,
    style: TextStyle,
    color: Color,
}

/// Issuer on the left, bill-to on the right. Both columns start at the same
/// offset; the section ends at whichever column ends later.
pub fn parties(frame: &Frame, state: LayoutState, invoice: &InvoiceDocument) -> Step {
    let config = frame.config;
    let palette = &config.palette;
    let half = frame.content_width() / 2.0;
    let column_width = half - config.column_gutter;

    let entry = |text: String, style: TextStyle, color: Color| ColumnEntry { text, style, color };

    let service = &invoice.service;
    let mut issuer = vec![entry("FROM".to_string(), frame.label(), palette.muted_text)];
    if let Some(name) = &service.name {
        issuer.push(entry(name.clone(), frame.body_bold(), palette.body_text));
    }
    if let Some(phone) = &service.phone {
        issuer.push(entry(format!("Phone: {}", phone), frame.body(), palette.body_text));
    }
    if let Some(address) = &service.address {
        issuer.push(entry(address.clone(), frame.body(), palette.body_text));
    }
    if let Some(gst) = invoice.printable_gst_number() {
        issuer.push(entry(format!("GSTIN: {}", gst), frame.body(), palette.body_text));
    }

    let customer = &invoice.customer;
    let mut bill_to = vec![
        entry("BILL TO".to_string(), frame.label(), palette.muted_text),
        entry(customer.name.clone(), frame.body_bold(), palette.body_text),
    ];
    if let Some(email) = &customer.email {
        bill_to.push(entry(email.clone(), frame.body(), palette.body_text));
    }
    if let Some(phone) = &customer.phone {
        bill_to.push(entry(format!("Phone: {}", phone), frame.body(), palette.body_text));
    }
    if let Some(address) = &customer.address {
        bill_to.push(entry(address.clone(), frame.body(), palette.body_text));
    }

    let left = flow_column(frame, state, Role::Issuer, frame.left(), column_width, &issuer);
    let right = flow_column(
        frame,
        state,
        Role::BillTo,
        frame.left() + half + config.column_gutter,
        column_width,
        &bill_to,
    );

    let mut end = left.state.furthest(right.state);
    end.cursor += config.section_gap;

    let mut instructions = left.instructions;
    instructions.extend(right.instructions);
    Step {
        state: end,
        instructions,
    }
}

/// Flow wrapped column lines downward from `state`, breaking pages per line.
fn flow_column(
    frame: &Frame,
    state: LayoutState,
    role: Role,
    x: f64,
    width: f64,
    entries: &[ColumnEntry],
) -> Step {
    let line_height = frame.config.body_line_height;
    let mut flow = Flow::new(frame, state);
    for entry in entries {
        for line in frame.text.wrap(&entry.text, width, entry.style) {
            flow.ensure(line_height);
            let y = flow.y();
            flow.text(role, line.text, x, y, entry.style, line_height, entry.color);
            flow.advance(line_height);
        }
    }
    flow.finish()
}

/// Single-line vehicle descriptor, truncated to the content width.
pub fn vehicle(frame: &Frame, state: LayoutState, invoice: &InvoiceDocument) -> Step {
    let config = frame.config;
    let palette = &config.palette;
    let line_height = config.body_line_height;
    let mut flow = Flow::new(frame, state);
    flow.ensure(line_height);

    let label = "Vehicle:";
    let label_style = frame.body_bold();
    let label_width = frame.text.measure_width(label, label_style) + frame.text.measure_width(" ", frame.body());
    let descriptor = frame.text.truncate(
        invoice.vehicle_info.trim(),
        frame.content_width() - label_width,
        frame.body(),
    );

    let y = flow.y();
    flow.text(Role::Vehicle, label, frame.left(), y, label_style, line_height, palette.body_text);
    flow.text(
        Role::Vehicle,
        descriptor,
        frame.left() + label_width,
        y,
        frame.body(),
        line_height,
        palette.body_text,
    );
    flow.advance(line_height + config.section_gap);
    flow.finish()
}

/// Shaded column header followed by one row per work item.
///
/// Rows move whole to the next page when they do not fit; the header is not
/// repeated. Stripes follow the item index, so they continue across pages.
pub fn item_table(frame: &Frame, state: LayoutState, items: &[WorkItem]) -> Step {
    let config = frame.config;
    let palette = &config.palette;
    let mut flow = Flow::new(frame, state);

    let header_height = config.table_header_height;
    flow.ensure(header_height);
    let y = flow.y();
    flow.rect(
        Role::TableHeader,
        frame.left(),
        y,
        frame.content_width(),
        header_height,
        palette.table_header_background,
    );
    let text_y = y + ((header_height - config.body_line_height) / 2.0).max(0.0);
    flow.text(
        Role::TableHeader,
        "Description",
        frame.left() + config.cell_padding,
        text_y,
        frame.body_bold(),
        config.body_line_height,
        palette.table_header_text,
    );
    flow.text_right(
        Role::TableHeader,
        "Amount",
        frame.right() - config.cell_padding,
        text_y,
        frame.body_bold(),
        config.body_line_height,
        palette.table_header_text,
    );
    flow.advance(header_height);

    let description_width =
        frame.content_width() - config.amount_column_width - 2.0 * config.cell_padding;
    for (index, item) in items.iter().enumerate() {
        let lines = frame.text.wrap(&item.title, description_width, frame.body());
        let amount = frame.money(item.price);
        item_row(&mut flow, index, &lines, &amount);
    }

    flow.advance(config.section_gap);
    flow.finish()
}

fn row_height(config: &LayoutConfig, line_count: usize) -> f64 {
    config.min_row_height.max(line_count as f64 * config.row_line_height)
}

fn item_row(flow: &mut Flow, index: usize, lines: &[WrappedLine], amount: &str) {
    let frame = flow.frame;
    let config = frame.config;
    let height = row_height(config, lines.len());

    match decide_break(flow.remaining(), frame.page_capacity(), height, config.row_line_height) {
        BreakDecision::Place => {}
        BreakDecision::MoveToNextPage if height <= frame.page_capacity() + EPSILON => {
            flow.break_page();
        }
        _ => {
            split_item_row(flow, index, lines, amount);
            return;
        }
    }

    trace!(index, page = flow.state.page, y = flow.y(), height, "row placed");
    draw_row_fragment(flow, index, lines, Some(amount), height);
}

/// Split a row taller than a whole page across as many pages as it needs.
fn split_item_row(flow: &mut Flow, index: usize, lines: &[WrappedLine], amount: &str) {
    let frame = flow.frame;
    let line_height = frame.config.row_line_height;
    let mut rest = lines;
    let mut amount = Some(amount);

    while !rest.is_empty() {
        let height = rest.len() as f64 * line_height;
        let take = match decide_break(flow.remaining(), frame.page_capacity(), height, line_height) {
            BreakDecision::Place => rest.len(),
            BreakDecision::MoveToNextPage => {
                flow.break_page();
                continue;
            }
            BreakDecision::Split {
                lines_on_current_page,
            } => lines_on_current_page.min(rest.len()),
        };
        let (here, next) = rest.split_at(take);
        debug!(index, page = flow.state.page, lines = here.len(), "row split");
        draw_row_fragment(flow, index, here, amount.take(), here.len() as f64 * line_height);
        rest = next;
        if !rest.is_empty() {
            flow.break_page();
        }
    }
}

fn draw_row_fragment(
    flow: &mut Flow,
    index: usize,
    lines: &[WrappedLine],
    amount: Option<&str>,
    height: f64,
) {
    let frame = flow.frame;
    let config = frame.config;
    let palette = &config.palette;
    let role = Role::ItemRow { index };
    let top = flow.y();

    if index % 2 == 1 {
        flow.rect(role, frame.left(), top, frame.content_width(), height, palette.row_stripe);
    }

    let line_height = config.row_line_height;
    let text_height = lines.len().max(1) as f64 * line_height;
    let first_y = top + ((height - text_height) / 2.0).max(0.0);
    for (i, line) in lines.iter().enumerate() {
        flow.text(
            role,
            line.text.clone(),
            frame.left() + config.cell_padding,
            first_y + i as f64 * line_height,
            frame.body(),
            line_height,
            palette.body_text,
        );
    }
    if let Some(amount) = amount {
        flow.text_right(
            role,
            amount,
            frame.right() - config.cell_padding,
            first_y,
            frame.body(),
            line_height,
            palette.body_text,
        );
    }

    flow.advance(height);
}

/// Subtotal, optional tax and discount, a rule, and the bold total.
pub fn totals(frame: &Frame, state: LayoutState, invoice: &InvoiceDocument) -> Step {
    let config = frame.config;
    let palette = &config.palette;
    let mut flow = Flow::new(frame, state);
    let label_x = (frame.right() - config.totals_width).max(frame.left());

    for line in TOTALS_LINES.iter().filter(|l| l.applies(invoice)) {
        let (role, style, line_height) = match line {
            TotalsLine::Subtotal => (Role::Subtotal, frame.body(), config.totals_line_height),
            TotalsLine::Tax => (Role::Tax, frame.body(), config.totals_line_height),
            TotalsLine::Discount => (Role::Discount, frame.body(), config.totals_line_height),
            TotalsLine::Rule => (Role::TotalRule, frame.body(), config.rule_height),
            TotalsLine::Total => (
                Role::Total,
                TextStyle::new(FontWeight::Bold, config.total_font_size),
                config.total_line_height,
            ),
        };

        flow.ensure(line_height);
        let y = flow.y();

        if *line == TotalsLine::Rule {
            let rule_y = y + line_height / 2.0;
            flow.push(
                role,
                DrawKind::Line {
                    x1: label_x,
                    y1: rule_y,
                    x2: frame.right(),
                    y2: rule_y,
                    color: palette.rule,
                    width: 1.0,
                },
            );
        } else {
            if let Some(label) = line.label(invoice) {
                flow.text(role, label, label_x, y, style, line_height, palette.body_text);
            }
            if let Some(amount) = line.amount(invoice) {
                let amount = frame.money(amount);
                flow.text_right(role, amount, frame.right(), y, style, line_height, palette.body_text);
            }
        }
        flow.advance(line_height);
    }

    flow.finish()
}

/// Label plus word-wrapped notes. The label never sits alone at the bottom
/// of a page: it needs room for the first body line too.
pub fn notes(frame: &Frame, state: LayoutState, invoice: &InvoiceDocument) -> Step {
    let config = frame.config;
    let palette = &config.palette;
    let line_height = config.body_line_height;
    let mut flow = Flow::new(frame, state);
    let Some(text) = invoice.printable_notes() else {
        return flow.finish();
    };

    flow.advance(config.section_gap);
    let lines = frame.text.wrap(text, frame.content_width(), frame.body());
    let opening = if lines.is_empty() { line_height } else { 2.0 * line_height };
    flow.ensure(opening);

    let y = flow.y();
    flow.text(Role::NotesLabel, "Notes", frame.left(), y, frame.label(), line_height, palette.muted_text);
    flow.advance(line_height);

    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            flow.ensure(line_height);
        }
        let y = flow.y();
        flow.text(Role::NotesBody, line.text, frame.left(), y, frame.body(), line_height, palette.body_text);
        flow.advance(line_height);
    }

    flow.finish()
}

/// Caption on the last page, anchored to the bottom margin.
pub fn footer(frame: &Frame, state: LayoutState) -> Step {
    let config = frame.config;
    let palette = &config.palette;
    let mut flow = Flow::new(frame, state);
    let bottom = frame.geometry.bottom_limit();

    let rule_y = bottom - config.footer_height + 2.0;
    flow.push(
        Role::Footer,
        DrawKind::Line {
            x1: frame.left(),
            y1: rule_y,
            x2: frame.right(),
            y2: rule_y,
            color: palette.rule,
            width: 0.5,
        },
    );

    if !config.footer_text.is_empty() {
        let style = TextStyle::new(FontWeight::Regular, config.footer_font_size);
        let line_height = (config.footer_font_size * 1.4).min(config.footer_height - 4.0).max(0.0);
        let width = frame.text.measure_width(&config.footer_text, style);
        let x = frame.left() + ((frame.content_width() - width) / 2.0).max(0.0);
        flow.text(
            Role::Footer,
            config.footer_text.clone(),
            x,
            bottom - line_height,
            style,
            line_height,
            palette.muted_text,
        );
    }

    // Page-relative: the cursor does not move.
    flow.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Customer, PageSize, ServiceInfo};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn invoice(items: usize) -> InvoiceDocument {
        InvoiceDocument {
            invoice_number: "INV-7".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            due_date: None,
            customer: Customer {
                name: "Asha Rao".to_string(),
                email: Some("asha@example.com".to_string()),
                phone: None,
                address: Some("14 Residency Road, Bengaluru".to_string()),
            },
            vehicle_info: "2019 Honda Civic".to_string(),
            work_items: (0..items)
                .map(|i| WorkItem::new(format!("Item {}", i), Decimal::new(10000, 2)))
                .collect(),
            subtotal: Decimal::new(10000 * items as i64, 2),
            tax: None,
            discount: None,
            total: Decimal::new(10000 * items as i64, 2),
            service: ServiceInfo {
                name: Some("Torque Motors".to_string()),
                phone: Some("080 4000 1234".to_string()),
                address: None,
            },
            notes: None,
            is_gst: false,
            gst_number: None,
        }
    }

    #[test]
    fn furthest_prefers_later_page() {
        let a = LayoutState { page: 0, cursor: 700.0 };
        let b = LayoutState { page: 1, cursor: 60.0 };
        assert_eq!(a.furthest(b), b);
        assert_eq!(b.furthest(a), b);
        let c = LayoutState { page: 1, cursor: 80.0 };
        assert_eq!(b.furthest(c), c);
    }

    #[test]
    fn header_band_sets_cursor_below_band() {
        let config = LayoutConfig::default();
        let frame = Frame::new(&config);
        let step = header_band(&frame, LayoutState::start(), &invoice(0));
        assert_eq!(step.state.page, 0);
        assert_eq!(step.state.cursor, config.header_height + config.section_gap);
        assert_eq!(step.instructions[0].role, Role::HeaderBand);
        let number = step
            .instructions
            .iter()
            .find(|i| i.role == Role::InvoiceNumber)
            .unwrap();
        assert_eq!(number.text(), Some("Invoice #: INV-7"));
        // Right-aligned to the right margin
        if let DrawKind::Text { x, width, .. } = number.kind {
            assert!((x + width - (frame.geometry.width - config.margin)).abs() < 1e-9);
        }
    }

    #[test]
    fn parties_end_at_taller_column() {
        let config = LayoutConfig::default();
        let frame = Frame::new(&config);
        let mut inv = invoice(0);
        inv.customer.phone = Some("98450 00000".to_string());
        inv.customer.address = Some("Flat 4B, 221 Very Long Residency Road Extension, Near The Old Water Tank, Koramangala, Bengaluru 560034".to_string());
        let start = LayoutState { page: 0, cursor: 108.0 };
        let step = parties(&frame, start, &inv);

        let lowest = |role: Role| {
            step.instructions
                .iter()
                .filter(|i| i.role == role)
                .map(|i| i.bottom())
                .fold(0.0, f64::max)
        };
        let issuer_end = lowest(Role::Issuer);
        let bill_to_end = lowest(Role::BillTo);
        assert!(bill_to_end > issuer_end);
        assert_eq!(step.state.cursor, bill_to_end + config.section_gap);

        let first = |role: Role| step.instructions.iter().find(|i| i.role == role).unwrap().top();
        assert_eq!(first(Role::Issuer), first(Role::BillTo));
    }

    #[test]
    fn row_that_does_not_fit_moves_whole() {
        let config = LayoutConfig::default();
        let frame = Frame::new(&config);
        let bottom = frame.content_bottom();
        // Room for exactly 5 row lines
        let start = LayoutState {
            page: 0,
            cursor: bottom - 5.0 * config.row_line_height,
        };
        let mut flow = Flow::new(&frame, start);
        let lines: Vec<WrappedLine> = (0..40)
            .map(|i| WrappedLine {
                text: format!("line {}", i),
                width: 20.0,
            })
            .collect();
        item_row(&mut flow, 0, &lines, "Rs. 1.00");
        let step = flow.finish();
        assert!(step.instructions.iter().all(|i| i.page == 1));
        assert_eq!(step.state.page, 1);
        assert_eq!(
            step.state.cursor,
            config.margin + 40.0 * config.row_line_height
        );
    }

    #[test]
    fn row_taller_than_a_page_is_split() {
        let config = LayoutConfig::default().with_page_size(PageSize::A5);
        let frame = Frame::new(&config);
        let capacity_lines = (frame.page_capacity() / config.row_line_height).floor() as usize;
        let lines: Vec<WrappedLine> = (0..capacity_lines + 10)
            .map(|i| WrappedLine {
                text: format!("line {}", i),
                width: 20.0,
            })
            .collect();
        let mut flow = Flow::new(&frame, LayoutState { page: 0, cursor: 300.0 });
        item_row(&mut flow, 3, &lines, "Rs. 9.00");
        let step = flow.finish();

        let texts: Vec<&str> = step
            .instructions
            .iter()
            .filter_map(|i| i.text())
            .filter(|t| t.starts_with("line "))
            .collect();
        assert_eq!(texts.len(), lines.len());
        assert_eq!(texts[0], "line 0");
        for i in &step.instructions {
            assert!(i.bottom() <= frame.content_bottom() + 1e-6);
        }
        let amounts = step
            .instructions
            .iter()
            .filter(|i| i.text() == Some("Rs. 9.00"))
            .count();
        assert_eq!(amounts, 1);
        assert!(step.state.page >= 1);
    }

    #[test]
    fn split_row_first_fragment_fills_remaining_lines() {
        let config = LayoutConfig::default().with_page_size(PageSize::A5);
        let frame = Frame::new(&config);
        let start = LayoutState { page: 0, cursor: 300.0 };
        let lines: Vec<WrappedLine> = (0..60)
            .map(|i| WrappedLine {
                text: format!("line {}", i),
                width: 20.0,
            })
            .collect();
        let height = 60.0 * config.row_line_height;
        let remaining = frame.content_bottom() - start.cursor;
        let BreakDecision::Split {
            lines_on_current_page,
        } = decide_break(remaining, frame.page_capacity(), height, config.row_line_height)
        else {
            panic!("60 lines should not fit an A5 page");
        };

        let mut flow = Flow::new(&frame, start);
        item_row(&mut flow, 0, &lines, "Rs. 1.00");
        let step = flow.finish();
        let first_page = step
            .instructions
            .iter()
            .filter(|i| i.page == 0)
            .filter_map(|i| i.text())
            .filter(|t| t.starts_with("line "))
            .count();
        assert_eq!(first_page, lines_on_current_page);
        assert_eq!(lines_on_current_page, 16);
    }

    #[test]
    fn long_invoice_number_stays_in_right_half() {
        let config = LayoutConfig::default();
        let frame = Frame::new(&config);
        let mut inv = invoice(0);
        inv.invoice_number = "INV-".repeat(30);
        let step = header_band(&frame, LayoutState::start(), &inv);
        let number = step
            .instructions
            .iter()
            .find(|i| i.role == Role::InvoiceNumber)
            .unwrap();

        assert_eq!(number.text(), Some(format!("Invoice #: {}", inv.invoice_number).as_str()));
        let DrawKind::Text { x, width, font_size, .. } = number.kind else {
            panic!("invoice number is not text");
        };
        let half_start = config.margin + frame.content_width() / 2.0 + config.column_gutter;
        assert!(x >= half_start - 1e-6, "x {} left of {}", x, half_start);
        assert!((x + width - frame.right()).abs() < 1e-6);
        assert!(font_size < config.meta_font_size);

        let date = step.instructions.iter().find(|i| i.role == Role::IssueDate).unwrap();
        if let DrawKind::Text { font_size, .. } = date.kind {
            assert_eq!(font_size, config.meta_font_size);
        }
    }

    #[test]
    fn footer_is_page_relative() {
        let config = LayoutConfig::default();
        let frame = Frame::new(&config);
        let a = footer(&frame, LayoutState { page: 2, cursor: 100.0 });
        let b = footer(&frame, LayoutState { page: 2, cursor: 600.0 });
        assert_eq!(a.instructions, b.instructions);
        assert!(a.instructions.iter().all(|i| i.page == 2));
        assert_eq!(a.state.cursor, 100.0);
        let caption = a.instructions.iter().find(|i| i.text().is_some()).unwrap();
        assert!((caption.bottom() - frame.geometry.bottom_limit()).abs() < 1e-9);
    }

    #[test]
    fn notes_label_keeps_first_line() {
        let config = LayoutConfig::default();
        let frame = Frame::new(&config);
        let mut inv = invoice(0);
        inv.notes = Some("Rotate tyres at next visit.".to_string());
        // Room for the gap and one line only
        let start = LayoutState {
            page: 0,
            cursor: frame.content_bottom() - config.section_gap - config.body_line_height,
        };
        let step = notes(&frame, start, &inv);
        let label = step.instructions.iter().find(|i| i.role == Role::NotesLabel).unwrap();
        let body = step.instructions.iter().find(|i| i.role == Role::NotesBody).unwrap();
        assert_eq!(label.page, 1);
        assert_eq!(body.page, 1);
        assert_eq!(label.top(), config.margin);
    }

    #[test]
    fn paginate_groups_by_page() {
        let config = LayoutConfig::default();
        let engine = LayoutEngine::new(config.clone());
        let instructions = engine.layout(&invoice(80)).unwrap();
        let pages = paginate(&instructions, &config.geometry());
        assert_eq!(pages.len(), page_count(&instructions));
        assert!(pages.len() > 1);
        let total: usize = pages.iter().map(|p| p.instructions.len()).sum();
        assert_eq!(total, instructions.len());
        for page in &pages {
            assert!(page.instructions.iter().all(|i| i.page == page.index));
        }
    }

    #[test]
    fn instruction_json_shape() {
        let instruction = DrawInstruction {
            page: 0,
            role: Role::ItemRow { index: 2 },
            kind: DrawKind::Rect {
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
                color: Color::BLACK,
            },
        };
        let json = serde_json::to_value(&instruction).unwrap();
        assert_eq!(json["type"], "rect");
        assert_eq!(json["role"]["itemRow"]["index"], 2);
        assert_eq!(json["height"], 4.0);
    }
}
