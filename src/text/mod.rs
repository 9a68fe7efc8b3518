//! # Text Layout
//!
//! Greedy line breaking and text measurement.
//!
//! Break opportunities follow UAX#14, so lines break after spaces and hyphens
//! and always at explicit newlines. A segment moves to the next line as soon
//! as it would cross the width limit. A single word wider than the limit
//! is broken between characters.

use crate::font::{FontContext, FontWeight};
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    /// The text on this line, without trailing whitespace.
    pub text: String,
    /// Measured width of `text` in points.
    pub width: f64,
}

/// Font settings used to measure text.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub weight: FontWeight,
    pub font_size: f64,
}

impl TextStyle {
    pub fn new(weight: FontWeight, font_size: f64) -> Self {
        Self { weight, font_size }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayout {
    fonts: FontContext,
}

/// Lines accumulated during a wrap pass.
struct LineBuilder {
    lines: Vec<WrappedLine>,
    current: String,
    /// Width of `current` including any trailing whitespace.
    current_width: f64,
}

impl LineBuilder {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: String::new(),
            current_width: 0.0,
        }
    }

    fn is_empty(&self) -> bool {
        self.current.trim_end().is_empty()
    }

    fn flush(&mut self, layout: &TextLayout, style: TextStyle) {
        let text = self.current.trim_end().to_string();
        let width = layout.measure_width(&text, style);
        self.lines.push(WrappedLine { text, width });
        self.current.clear();
        self.current_width = 0.0;
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self {
            fonts: FontContext::new(),
        }
    }

    /// Measure a single run of text in points.
    pub fn measure_width(&self, text: &str, style: TextStyle) -> f64 {
        self.fonts
            .measure_string(text, style.weight, style.font_size)
    }

    /// Break `text` into lines no wider than `max_width`.
    ///
    /// Empty or whitespace-only text yields no lines.
    pub fn wrap(&self, text: &str, max_width: f64, style: TextStyle) -> Vec<WrappedLine> {
        let mut builder = LineBuilder::new();
        let mut start = 0;

        for (end, opportunity) in linebreaks(text) {
            let segment = text[start..end].trim_end_matches(['\n', '\r']);
            start = end;
            self.place_segment(&mut builder, segment, max_width, style);

            if opportunity == BreakOpportunity::Mandatory && !builder.is_empty() {
                builder.flush(self, style);
            } else if opportunity == BreakOpportunity::Mandatory {
                // Blank line between paragraphs
                if end < text.len() {
                    builder.flush(self, style);
                } else {
                    builder.current.clear();
                }
            }
        }

        builder.lines
    }

    fn place_segment(
        &self,
        builder: &mut LineBuilder,
        segment: &str,
        max_width: f64,
        style: TextStyle,
    ) {
        if segment.is_empty() {
            return;
        }

        let visible = segment.trim_end();
        let visible_width = self.measure_width(visible, style);
        let full_width = self.measure_width(segment, style);

        if builder.current_width + visible_width <= max_width {
            builder.current.push_str(segment);
            builder.current_width += full_width;
            return;
        }

        if !builder.is_empty() {
            builder.flush(self, style);
        }

        if visible_width <= max_width {
            // Leading whitespace never starts a line.
            if !visible.is_empty() {
                builder.current.push_str(segment);
                builder.current_width = full_width;
            }
            return;
        }

        self.place_overlong_word(builder, segment, max_width, style);
    }

    /// Break a word wider than the line between characters.
    fn place_overlong_word(
        &self,
        builder: &mut LineBuilder,
        segment: &str,
        max_width: f64,
        style: TextStyle,
    ) {
        for ch in segment.chars() {
            let w = self.fonts.char_width(ch, style.weight, style.font_size);
            if builder.current_width + w > max_width && !builder.is_empty() {
                if ch.is_whitespace() {
                    builder.current.push(ch);
                    builder.current_width += w;
                    continue;
                }
                builder.flush(self, style);
            }
            if builder.current.is_empty() && ch.is_whitespace() {
                continue;
            }
            builder.current.push(ch);
            builder.current_width += w;
        }
    }

    /// Shorten `text` with a trailing ellipsis so it fits `max_width`.
    pub fn truncate(&self, text: &str, max_width: f64, style: TextStyle) -> String {
        if self.measure_width(text, style) <= max_width {
            return text.to_string();
        }
        const ELLIPSIS: &str = "...";
        let budget = max_width - self.measure_width(ELLIPSIS, style);
        let mut out = String::new();
        let mut width = 0.0;
        for ch in text.chars() {
            let w = self.fonts.char_width(ch, style.weight, style.font_size);
            if width + w > budget {
                break;
            }
            out.push(ch);
            width += w;
        }
        let mut out = out.trim_end().to_string();
        out.push_str(ELLIPSIS);
        out
    }
}
