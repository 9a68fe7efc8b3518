//! # Page Break Decisions
//!
//! Logic for deciding what happens when a block meets the bottom of the
//! page. Blocks are table rows, totals lines and note paragraphs. Rows are
//! atomic: they move whole to the next page. Only a block taller than an
//! entire empty page is split, line by line.

/// Decide what to do with a block at the current cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Place the entire block on the current page (it fits).
    Place,
    /// Move the entire block to the next page.
    MoveToNextPage,
    /// Split the block: place some lines here, continue on the next page.
    Split {
        /// How many lines fit on the current page.
        lines_on_current_page: usize,
    },
}

/// Slack for accumulated floating-point error when comparing extents.
pub const EPSILON: f64 = 1e-6;

/// Given the remaining space on the page, the space a fresh page offers,
/// and the block's height, decide how to break.
///
/// `line_height` is the granularity a block can be split at when it cannot
/// fit even on an empty page.
pub fn decide_break(
    remaining_height: f64,
    page_capacity: f64,
    block_height: f64,
    line_height: f64,
) -> BreakDecision {
    // Easy case: everything fits
    if block_height <= remaining_height + EPSILON {
        return BreakDecision::Place;
    }

    // Fits on an empty page: defer the whole block
    if block_height <= page_capacity + EPSILON {
        return BreakDecision::MoveToNextPage;
    }

    // Taller than a page: place what fits here
    let fit = if line_height > 0.0 {
        ((remaining_height + EPSILON) / line_height).floor().max(0.0) as usize
    } else {
        0
    };
    if fit == 0 {
        return BreakDecision::MoveToNextPage;
    }
    BreakDecision::Split {
        lines_on_current_page: fit,
    }
}
