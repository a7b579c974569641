//! CLI output formatting for operation results.
//!
//! # Output Format
//!
//! ## Crop
//!
//! ```text
//! Cropped photos/wide.jpg → photos/wide.jpg
//!     Source: 100x60
//!     Output: 60x60
//! ```
//!
//! ## No-op
//!
//! ```text
//! Already square photos/avatar.png → out/avatar.png
//!     Source: 80x80
//!     Copied unchanged
//! ```
//!
//! When source and destination are the same file the last line reads
//! `Left unchanged` instead.
//!
//! # Architecture
//!
//! Each result has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::imaging::{Operation, OperationResult, Outcome};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn dimensions(width: u32, height: u32) -> String {
    format!("{width}x{height}")
}

/// Header verb for a result.
fn outcome_label(result: &OperationResult) -> &'static str {
    match (result.outcome, result.operation) {
        (Outcome::AlreadySquare, _) => "Already square",
        (Outcome::WithinBounds, _) => "Within bounds",
        (Outcome::Success, Operation::Crop) => "Cropped",
        (Outcome::Success, Operation::Resize) => "Resized",
    }
}

/// Format a single operation result.
pub fn format_result(result: &OperationResult) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} → {}",
        outcome_label(result),
        result.source.display(),
        result.destination.display()
    )];
    lines.push(format!(
        "{}Source: {}",
        indent(1),
        dimensions(result.source_width, result.source_height)
    ));

    if result.outcome.is_no_op() {
        let verb = if result.in_place {
            "Left"
        } else {
            "Copied"
        };
        lines.push(format!("{}{verb} unchanged", indent(1)));
    } else {
        lines.push(format!(
            "{}Output: {}",
            indent(1),
            dimensions(result.output_width, result.output_height)
        ));
    }
    lines
}

pub fn print_result(result: &OperationResult) {
    for line in format_result(result) {
        println!("{line}");
    }
}
