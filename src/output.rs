//! CLI output formatting for intake, gallery listings and printing.
//!
//! # Information-First Display
//!
//! Every entry is shown by its identity first (positional index, `#id` and
//! file name) with its current transform as secondary context. The `#id` is
//! what shell commands such as `rotate` and `remove` take.
//!
//! # Output Format
//!
//! ## Intake
//!
//! ```text
//! Added 2 images
//!     #1 dawn.jpg
//!     #2 dusk.png
//! Rejected 1 file
//!     ! notes.txt: not an image
//! ```
//!
//! ## Gallery
//!
//! ```text
//! Selected images (2)
//! 001 #1 dawn.jpg
//!     200x200, rotated 0°
//! 002 #2 dusk.png
//!     240x240, rotated 90°
//! ```
//!
//! ## Plan
//!
//! ```text
//! Grid layout, 794x1123 pages, 2 sheets
//! Page 1: #1 #2 #3 #4
//! Page 2: #5
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability. Displays the CLI writes directly also get a `print_*` wrapper
//! that writes to stdout; the shell writes the formatted lines itself. Format functions
//! are pure: no I/O, no side effects.

use crate::gallery::{Gallery, ImageEntry};
use crate::intake::{DropState, IntakeReport};
use crate::layout::{LayoutPlan, PolicyKind, PrintLayout};
use crate::print::PrintReport;
use crate::resource::ResourceStore;

/// Shown when a drop offered nothing.
pub const DROP_PROMPT: &str = "Drag & drop some images here, or click to select images";

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 image`, `3 images`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn policy_title(policy: PolicyKind) -> &'static str {
    match policy {
        PolicyKind::Grid => "Grid",
        PolicyKind::Flow => "Flow",
    }
}

/// Entry header: positional index, `#id`, file name.
///
/// ```text
/// 001 #4 dawn.jpg
/// ```
fn entry_header(index: usize, entry: &ImageEntry) -> String {
    format!("{} #{} {}", format_index(index), entry.id, entry.name)
}

/// Current transform of an entry.
///
/// ```text
/// 200x200, rotated 450°
/// ```
fn entry_transform(entry: &ImageEntry) -> String {
    format!(
        "{}x{}, rotated {}°",
        entry.width, entry.height, entry.rotation_degrees
    )
}

// ============================================================================
// Intake
// ============================================================================

/// Format the result of a drop.
///
/// Rejected files get their own section with a `!` marker so a partially
/// filtered drop is never mistaken for a clean one.
pub fn format_intake_report<S: ResourceStore>(
    report: &IntakeReport,
    gallery: &Gallery<S>,
) -> Vec<String> {
    let mut lines = Vec::new();
    if report.state() == DropState::Idle {
        lines.push(DROP_PROMPT.to_string());
        return lines;
    }

    lines.push(format!("Added {}", plural(report.added.len(), "image")));
    for id in &report.added {
        if let Some(entry) = gallery.get(*id) {
            lines.push(format!("{}#{} {}", indent(1), entry.id, entry.name));
        }
    }

    if report.state() == DropState::Reject {
        lines.push(format!("Rejected {}", plural(report.rejected.len(), "file")));
        for rejected in &report.rejected {
            lines.push(format!(
                "{}! {}: {}",
                indent(1),
                rejected.name,
                rejected.reason
            ));
        }
    }

    lines
}

/// Print intake output to stdout.
pub fn print_intake_report<S: ResourceStore>(report: &IntakeReport, gallery: &Gallery<S>) {
    for line in format_intake_report(report, gallery) {
        println!("{}", line);
    }
}

// ============================================================================
// Gallery
// ============================================================================

/// Format the gallery listing with its count badge.
pub fn format_listing<S: ResourceStore>(gallery: &Gallery<S>) -> Vec<String> {
    if gallery.is_empty() {
        return vec!["No images selected".to_string(), DROP_PROMPT.to_string()];
    }

    let mut lines = vec![format!("Selected images ({})", gallery.len())];
    for (i, entry) in gallery.entries().iter().enumerate() {
        lines.push(entry_header(i + 1, entry));
        lines.push(format!("{}{}", indent(1), entry_transform(entry)));
    }
    lines
}

/// One-line state of a single entry, shown after it changes.
///
/// ```text
/// #2 dusk.png: 240x240, rotated 90°
/// ```
pub fn format_entry(entry: &ImageEntry) -> String {
    format!("#{} {}: {}", entry.id, entry.name, entry_transform(entry))
}

// ============================================================================
// Layout and printing
// ============================================================================

/// Format a layout plan as one line per page listing its entries.
pub fn format_plan_summary(plan: &LayoutPlan) -> Vec<String> {
    let header = format!(
        "{} layout, {}x{} pages, {}",
        policy_title(plan.policy),
        plan.page.width,
        plan.page.height,
        plural(plan.layout.sheet_count(), "sheet")
    );
    let mut lines = vec![header];
    match &plan.layout {
        PrintLayout::Empty => lines.push("There is nothing to print".to_string()),
        PrintLayout::Pages(pages) => {
            for page in pages {
                let ids: Vec<String> = page
                    .placements
                    .iter()
                    .map(|p| format!("#{}", p.entry))
                    .collect();
                lines.push(format!("Page {}: {}", page.index + 1, ids.join(" ")));
            }
        }
    }
    lines
}

/// Print a plan summary to stdout.
pub fn print_plan_summary(plan: &LayoutPlan) {
    for line in format_plan_summary(plan) {
        println!("{}", line);
    }
}

/// Format the outcome of a print request.
pub fn format_print_report(report: &PrintReport) -> Vec<String> {
    match report {
        PrintReport::Printed {
            policy,
            sheets,
            destination,
        } => vec![format!(
            "Printed {} ({}) → {}",
            plural(*sheets, "sheet"),
            policy,
            destination
        )],
        PrintReport::Denied { reason } => vec![
            format!("Print failed: {reason}"),
            format!("{}Nothing was changed.", indent(1)),
        ],
    }
}

/// Print the print outcome to stdout.
pub fn print_print_report(report: &PrintReport) {
    for line in format_print_report(report) {
        println!("{}", line);
    }
}

/// Format the outcome of a reset. `None` means the user cancelled.
pub fn format_reset(removed: Option<usize>) -> Vec<String> {
    match removed {
        Some(n) => vec![format!("Removed {}", plural(n, "image"))],
        None => vec!["Reset cancelled".to_string()],
    }
}

// ============================================================================
// Tests
// ============================================================================
