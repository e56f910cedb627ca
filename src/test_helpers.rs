//! Shared test utilities for the printify test suite.
//!
//! Provides image fixtures for intake tests and ready-made entries and
//! galleries for layout and rendering tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let path = write_png(tmp.path(), "a.png", 40, 30);
//!
//! let layout = policy.paginate(&entries_with_heights(&[300, 300, 300, 300]));
//! let gallery = gallery_of(5);
//! ```

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbImage};

use crate::config::TilesConfig;
use crate::gallery::{Dimensions, EntryId, Gallery, ImageEntry};
use crate::intake::AcceptedImage;
use crate::resource::ResourceHandle;
use crate::resource::tests::TrackingStore;

/// Natural size given to synthetic entries unless a test asks otherwise.
pub const NATURAL: Dimensions = Dimensions {
    width: 400,
    height: 300,
};

// =========================================================================
// Image fixtures
// =========================================================================

/// Encode a solid-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Write a PNG into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(width, height)).unwrap();
    path
}

/// Write a plain text file into `dir` and return its path.
pub fn write_text(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// An image that already passed the accept filter.
///
/// The bytes are a marker, not a decodable image; stores used with it never
/// look inside.
pub fn accepted(name: &str) -> AcceptedImage {
    AcceptedImage {
        name: name.to_string(),
        mime: "image/png",
        bytes: name.as_bytes().to_vec(),
        natural: NATURAL,
    }
}

// =========================================================================
// Entries and galleries
// =========================================================================

/// Entries with ids `1..`, the default tile width, and the given heights.
pub fn entries_with_heights(heights: &[u32]) -> Vec<ImageEntry> {
    heights
        .iter()
        .enumerate()
        .map(|(i, &height)| {
            let id = i as u64 + 1;
            ImageEntry {
                id: EntryId(id),
                handle: ResourceHandle(id),
                name: format!("{id}.png"),
                natural: NATURAL,
                width: TilesConfig::default().width,
                height,
                rotation_degrees: 0,
            }
        })
        .collect()
}

/// A single default-sized entry with a specific natural size.
pub fn entry_with_natural(id: u64, natural: Dimensions) -> ImageEntry {
    let tiles = TilesConfig::default();
    ImageEntry {
        id: EntryId(id),
        handle: ResourceHandle(id),
        name: format!("{id}.png"),
        natural,
        width: tiles.width,
        height: tiles.height,
        rotation_degrees: 0,
    }
}

/// A gallery holding `n` accepted images named `0.png`, `1.png`, ...
pub fn gallery_of(n: usize) -> Gallery<TrackingStore> {
    let mut gallery = Gallery::new(TrackingStore::new(), TilesConfig::default());
    gallery.add_batch((0..n).map(|i| accepted(&format!("{i}.png"))).collect());
    gallery
}
