//! # PDF Serializer
//!
//! Takes the paginated draw instructions from the layout engine and writes a
//! valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. Invoices only need filled
//! rectangles, stroked lines and text in the two built-in Helvetica faces,
//! so the writer stays small and has no font embedding.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, pages, fonts, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Layout coordinates grow downward from the page top. PDF user space grows
//! upward from the bottom, so every y is flipped against the page height.

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;
use tracing::debug;

use crate::error::InvoiceError;
use crate::font::{FontContext, FontWeight};
use crate::layout::{DrawKind, LayoutPage};
use crate::style::Color;

/// Document information written to the PDF Info dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

pub struct PdfWriter {
    fonts: FontContext,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }
}

// Fixed object ids: 0 is the free-list head, the rest are reserved up front.
const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const REGULAR_FONT_ID: usize = 3;
const BOLD_FONT_ID: usize = 4;

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            fonts: FontContext::new(),
        }
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], metadata: &Metadata) -> Result<Vec<u8>, InvoiceError> {
        if pages.is_empty() {
            return Err(InvoiceError::RenderError(
                "cannot write a PDF without pages".to_string(),
            ));
        }

        let mut builder = PdfBuilder {
            objects: (0..=BOLD_FONT_ID).map(|_| PdfObject { data: vec![] }).collect(),
        };
        builder.objects[REGULAR_FONT_ID].data = Self::font_dict(FontWeight::Regular).into_bytes();
        builder.objects[BOLD_FONT_ID].data = Self::font_dict(FontWeight::Bold).into_bytes();

        let mut page_obj_ids: Vec<usize> = Vec::new();

        for page in pages {
            let content = self.build_content_stream(page);
            let compressed = compress_to_vec_zlib(&content, 6);

            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            let content_obj_id = builder.push(content_data);

            let page_dict = format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << /F1 {} 0 R /F2 {} 0 R >> >> >>",
                PAGES_ID,
                page.width,
                page.height,
                content_obj_id,
                REGULAR_FONT_ID,
                BOLD_FONT_ID
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[CATALOG_ID].data =
            format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID).into_bytes();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[PAGES_ID].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::encode_text(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", Self::encode_text(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::encode_text(subject));
        }
        info.push_str("/Producer (garage-invoice) >>");
        let info_obj_id = builder.push(info.into_bytes());

        debug!(pages = pages.len(), objects = builder.objects.len(), "pdf written");
        Ok(self.serialize(&builder, info_obj_id))
    }

    fn font_dict(weight: FontWeight) -> String {
        format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
            weight.standard_font().pdf_name()
        )
    }

    fn font_resource(weight: FontWeight) -> &'static str {
        match weight {
            FontWeight::Regular => "F1",
            FontWeight::Bold => "F2",
        }
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &LayoutPage) -> Vec<u8> {
        let mut stream = String::new();
        for instruction in &page.instructions {
            self.write_instruction(&mut stream, &instruction.kind, page.height);
        }
        stream.into_bytes()
    }

    /// Write a single draw instruction as PDF operators.
    fn write_instruction(&self, stream: &mut String, kind: &DrawKind, page_height: f64) {
        match kind {
            DrawKind::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                let pdf_y = page_height - y - height;
                let _ = write!(stream, "q\n{} rg\n", Self::color_ops(color));
                let _ = writeln!(stream, "{:.2} {:.2} {:.2} {:.2} re", x, pdf_y, width, height);
                stream.push_str("f\nQ\n");
            }

            DrawKind::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => {
                let _ = write!(
                    stream,
                    "q\n{} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    Self::color_ops(color),
                    width,
                    x1,
                    page_height - y1,
                    x2,
                    page_height - y2
                );
            }

            DrawKind::Text {
                content,
                x,
                y,
                font_size,
                line_height,
                weight,
                color,
                ..
            } => {
                if content.is_empty() {
                    return;
                }
                let baseline = y + self.fonts.baseline_offset(*weight, *font_size, *line_height);
                let _ = write!(
                    stream,
                    "BT\n{} rg\n/{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                    Self::color_ops(color),
                    Self::font_resource(*weight),
                    font_size,
                    x,
                    page_height - baseline,
                    Self::encode_text(content)
                );
            }
        }
    }

    fn color_ops(color: &Color) -> String {
        format!("{:.3} {:.3} {:.3}", color.r, color.g, color.b)
    }

    /// Encode text as a WinAnsi literal string body.
    ///
    /// Delimiters are escaped, bytes above 0x7F are written as octal escapes
    /// and characters outside WinAnsi become `?`.
    fn encode_text(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '(' => out.push_str("\\("),
                ')' => out.push_str("\\)"),
                _ => match Self::unicode_to_winansi(ch) {
                    Some(b) if b < 0x80 => out.push(b as char),
                    Some(b) => {
                        let _ = write!(out, "\\{:03o}", b);
                    }
                    None => out.push('?'),
                },
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// holds smart quotes, bullets, dashes and a few accented letters.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82),
            0x0192 => Some(0x83),
            0x201E => Some(0x84),
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86),
            0x2021 => Some(0x87),
            0x02C6 => Some(0x88),
            0x2030 => Some(0x89),
            0x0160 => Some(0x8A),
            0x2039 => Some(0x8B),
            0x0152 => Some(0x8C),
            0x017D => Some(0x8E),
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98),
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A),
            0x203A => Some(0x9B),
            0x0153 => Some(0x9C),
            0x017E => Some(0x9E),
            0x0178 => Some(0x9F),
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            CATALOG_ID,
            info_obj_id,
            xref_offset
        );

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{DrawInstruction, Role};

    fn blank_page(index: usize) -> LayoutPage {
        LayoutPage {
            index,
            width: 595.28,
            height: 841.89,
            instructions: vec![],
        }
    }

    fn contains(bytes: &[u8], needle: &[u8]) -> bool {
        bytes.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_encode_text_escapes_delimiters() {
        assert_eq!(PdfWriter::encode_text("Oil (5W-30)"), "Oil \\(5W-30\\)");
        assert_eq!(PdfWriter::encode_text("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_encode_text_winansi() {
        assert_eq!(PdfWriter::encode_text("\u{20AC}5"), "\\2005");
        assert_eq!(PdfWriter::encode_text("caf\u{e9}"), "caf\\351");
        assert_eq!(PdfWriter::encode_text("\u{20B9}100"), "?100");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let bytes = PdfWriter::new()
            .write(&[blank_page(0)], &Metadata::default())
            .unwrap();

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, b"%%EOF"));
        assert!(contains(&bytes, b"xref"));
        assert!(contains(&bytes, b"trailer"));
        assert!(contains(&bytes, b"/Count 1"));
    }

    #[test]
    fn test_no_pages_is_an_error() {
        let err = PdfWriter::new().write(&[], &Metadata::default()).unwrap_err();
        assert!(matches!(err, InvoiceError::RenderError(_)));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let metadata = Metadata {
            title: Some("Invoice INV-1".to_string()),
            author: Some("Torque Motors".to_string()),
            subject: None,
        };
        let bytes = PdfWriter::new().write(&[blank_page(0)], &metadata).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/Title (Invoice INV-1)"));
        assert!(text.contains("/Author (Torque Motors)"));
    }

    #[test]
    fn test_both_fonts_registered() {
        let bytes = PdfWriter::new()
            .write(&[blank_page(0)], &Metadata::default())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/BaseFont /Helvetica /Encoding /WinAnsiEncoding"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn test_text_operators_flip_y() {
        let writer = PdfWriter::new();
        let mut stream = String::new();
        let text = DrawInstruction {
            page: 0,
            role: Role::Total,
            kind: DrawKind::Text {
                content: "Total".to_string(),
                x: 40.0,
                y: 100.0,
                width: 30.0,
                font_size: 12.0,
                line_height: 22.0,
                weight: FontWeight::Bold,
                color: Color::BLACK,
            },
        };
        writer.write_instruction(&mut stream, &text.kind, 800.0);
        assert!(stream.contains("/F2 12.0 Tf"));
        assert!(stream.contains("(Total) Tj"));

        let baseline = 100.0 + FontContext::new().baseline_offset(FontWeight::Bold, 12.0, 22.0);
        assert!(stream.contains(&format!("40.00 {:.2} Td", 800.0 - baseline)));
    }

    #[test]
    fn test_rect_operators_flip_y() {
        let writer = PdfWriter::new();
        let mut stream = String::new();
        let rect = DrawKind::Rect {
            x: 0.0,
            y: 0.0,
            width: 595.28,
            height: 90.0,
            color: Color::WHITE,
        };
        writer.write_instruction(&mut stream, &rect, 841.89);
        assert!(stream.contains("1.000 1.000 1.000 rg"));
        assert!(stream.contains("0.00 751.89 595.28 90.00 re"));
    }

    #[test]
    fn test_one_page_object_per_page() {
        let pages = vec![blank_page(0), blank_page(1), blank_page(2)];
        let bytes = PdfWriter::new().write(&pages, &Metadata::default()).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 3"));
        assert_eq!(text.matches("/Type /Page ").count(), 3);
    }
}
