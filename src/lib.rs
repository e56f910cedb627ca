//! # Printify
//!
//! Tiles a set of images onto printable pages. Images are collected into a
//! gallery, each with its own size and rotation, and a pagination policy lays
//! them out on fixed-size sheets. The result is a single self-contained HTML
//! document that the browser prints.
//!
//! # Architecture: Intake, Gallery, Layout
//!
//! ```text
//! 1. Intake   files     →  accepted images   (content sniffing, dimensions)
//! 2. Gallery  images    →  ordered entries   (ids, resources, transforms)
//! 3. Layout   entries   →  pages             (grid or flow policy)
//!    Render   pages     →  print document    (HTML via Maud)
//! ```
//!
//! The gallery is the only mutable state. Layout reads a snapshot of it at
//! print time, so a print always reflects the transforms as they are when it
//! is requested and never changes the gallery.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`intake`] | Expands paths, reads files in parallel, filters out non-images |
//! | [`gallery`] | Ordered entries with stable ids, resize, rotate, remove, reset |
//! | [`resource`] | Resource handles that make image bytes displayable (data URLs) |
//! | [`layout`] | Pagination policies: fixed grid and height-packed flow |
//! | [`render`] | Renders a layout plan into an HTML print document using Maud |
//! | [`print`] | Print sinks and the print entry point |
//! | [`session`] | Interactive shell around one gallery |
//! | [`config`] | `printify.toml` loading, validation, merging, and page CSS |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Identity Is Not the Resource
//!
//! Entries are addressed by an [`gallery::EntryId`] from a per-gallery
//! counter. The resource handle that makes the image displayable is separate
//! and owned by the gallery's [`resource::ResourceStore`], which releases it
//! exactly once when the entry goes away.
//!
//! ## One Gallery, Pluggable Pagination
//!
//! Both print styles read the same gallery through
//! [`layout::PaginationPolicy`]. The grid policy ignores entry sizes and
//! crops to cells; the flow policy keeps entry sizes and breaks pages by
//! accumulated height.
//!
//! ## Printing Through a Sink
//!
//! The engine never opens windows itself. It hands a rendered document to a
//! [`print::PrintSink`]; a sink that cannot open its surface reports it and
//! nothing else happens.

pub mod config;
pub mod gallery;
pub mod intake;
pub mod layout;
pub mod output;
pub mod print;
pub mod render;
pub mod resource;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
