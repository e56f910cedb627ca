//! Print document rendering.
//!
//! Turns a [`LayoutPlan`] into a single self-contained HTML document. Images
//! are embedded through their resource `src`, so the document can be opened
//! from anywhere without the original files.
//!
//! ## Documents
//!
//! - **Grid**: a screen preview of the selection plus a print-only view of
//!   the pages, switched with `@media print`.
//! - **Flow**: a standalone print document holding only the pages, each sized
//!   inline.
//!
//! Every page, including the "nothing to print" placeholder, ends in a forced
//! page break. Tile and image boxes come straight from the layout plan; the
//! renderer never recomputes geometry.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating,
//! with automatic escaping of file names and other user text.

use crate::config::{PageConfig, generate_page_css};
use crate::gallery::{EntryId, Gallery, ImageEntry};
use crate::layout::{LayoutPlan, Page, Placement, PolicyKind, PrintLayout};
use crate::resource::ResourceStore;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::HashMap;

const CSS_STATIC: &str = include_str!("../static/print.css");
const AUTO_PRINT_JS: &str = "window.addEventListener('load', function () { window.print(); });";

/// A rendered document ready for a print sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDocument {
    pub title: String,
    pub policy: PolicyKind,
    /// Sheets the document prints on, counting the placeholder.
    pub sheets: usize,
    pub html: String,
}

/// Rendering switches that do not affect layout.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub title: &'a str,
    /// Open the print dialog as soon as the document loads.
    pub auto_print: bool,
}

/// Render a layout plan for the entries of a gallery.
///
/// Placements whose entry is missing from the gallery are skipped.
pub fn render_document<S: ResourceStore>(
    plan: &LayoutPlan,
    gallery: &Gallery<S>,
    options: RenderOptions<'_>,
) -> PrintDocument {
    let entries: HashMap<EntryId, &ImageEntry> =
        gallery.entries().iter().map(|e| (e.id, e)).collect();
    let css = format!("{}\n\n{}", generate_page_css(&plan.page), CSS_STATIC);
    let pages = render_print_view(&plan.layout, plan.page, &entries, gallery);

    let content = match plan.policy {
        PolicyKind::Grid => html! {
            (render_screen_view(gallery))
            (pages)
        },
        PolicyKind::Flow => pages,
    };
    let body_class = match plan.policy {
        PolicyKind::Grid => "grid-document",
        PolicyKind::Flow => "flow-document",
    };
    let markup = base_document(options.title, &css, body_class, options.auto_print, content);

    PrintDocument {
        title: options.title.to_string(),
        policy: plan.policy,
        sheets: plan.layout.sheet_count(),
        html: markup.into_string(),
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(
    title: &str,
    css: &str,
    body_class: &str,
    auto_print: bool,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=(body_class) {
                (content)
                @if auto_print {
                    script { (PreEscaped(AUTO_PRINT_JS)) }
                }
            }
        }
    }
}

/// Screen-only preview of the current selection
fn render_screen_view<S: ResourceStore>(gallery: &Gallery<S>) -> Markup {
    html! {
        div.screen-view {
            div.screen-title { "PRINTIFY" }
            @if gallery.is_empty() {
                p.empty-state { "No images selected" }
            } @else {
                div.selected-header {
                    div { "Selected images" span.badge { (gallery.len()) } }
                }
                div.preview-grid {
                    @for entry in gallery.entries() {
                        figure.preview data-entry=(entry.id.0) {
                            @if let Some(src) = gallery.source(entry) {
                                img src=(src) alt="Preview";
                            }
                            figcaption { "#" (entry.id.0) " " (entry.name) }
                        }
                    }
                }
                button.print-button type="button" onclick="window.print()" { "Print" }
            }
        }
    }
}

/// The pages themselves, or a single placeholder page
fn render_print_view<S: ResourceStore>(
    layout: &PrintLayout,
    page: PageConfig,
    entries: &HashMap<EntryId, &ImageEntry>,
    gallery: &Gallery<S>,
) -> Markup {
    html! {
        div.print-view {
            @match layout {
                PrintLayout::Empty => {
                    div.print-page.placeholder style=(page_style(page)) {
                        p { "There is nothing to print" }
                    }
                }
                PrintLayout::Pages(pages) => {
                    @for p in pages {
                        (render_page(p, page, entries, gallery))
                    }
                }
            }
        }
    }
}

fn render_page<S: ResourceStore>(
    p: &Page,
    page: PageConfig,
    entries: &HashMap<EntryId, &ImageEntry>,
    gallery: &Gallery<S>,
) -> Markup {
    html! {
        div.print-page data-page=(p.index + 1) style=(page_style(page)) {
            @for placement in &p.placements {
                @if let Some(entry) = entries.get(&placement.entry) {
                    (render_tile(placement, entry, gallery.source(entry).unwrap_or_default()))
                }
            }
        }
    }
}

fn render_tile(placement: &Placement, entry: &ImageEntry, src: &str) -> Markup {
    let tile = placement.tile;
    let image = placement.image;
    let tile_style = format!(
        "left: {}px; top: {}px; width: {}px; height: {}px;",
        tile.x, tile.y, tile.width, tile.height
    );
    let image_style = format!(
        "left: {}px; top: {}px; width: {}px; height: {}px; transform: rotate({}deg);",
        image.x, image.y, image.width, image.height, placement.rotation_degrees
    );
    html! {
        div.tile.clip[placement.clip] data-entry=(entry.id.0) style=(tile_style) {
            img src=(src) alt=(entry.name) width=(image.width) height=(image.height) style=(image_style);
        }
    }
}

fn page_style(page: PageConfig) -> String {
    format!("width: {}px; height: {}px;", page.width, page.height)
}

// ============================================================================
// Tests
// ============================================================================
