//! Image intake: turning offered files into gallery entries.
//!
//! Files arrive as a batch (the paths given on the command line, or one `add`
//! in the shell). Directories are expanded recursively, sorted by file name.
//! Every candidate goes through the accept filter:
//!
//! 1. The media type is sniffed from the file content, never trusted from the
//!    extension. Anything that is not `image/*` is rejected. SVG documents are
//!    recognised from their root element.
//! 2. The natural dimensions are read from the header. A recognised type with
//!    no decoder in this build (AVIF, for one) is still accepted with
//!    [`FALLBACK_NATURAL`] as its size, since the browser renders it either
//!    way. A header that fails to decode is rejected as unreadable.
//!
//! Rejection is never an error. The [`IntakeReport`] carries the rejected
//! names and a [`DropState`] so the caller can show that part of the drop was
//! filtered instead of losing files silently.
//!
//! Files are read in parallel with rayon; acceptance order always matches the
//! order the paths were offered in.

use crate::gallery::{Dimensions, EntryId, Gallery};
use crate::resource::ResourceStore;
use image::{ImageError, ImageReader};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Natural size assumed when an image's own size cannot be read.
pub const FALLBACK_NATURAL: Dimensions = Dimensions {
    width: 200,
    height: 200,
};

const SVG_MIME: &str = "image/svg+xml";

/// How much of a file is searched for an `<svg` root element.
const SVG_SNIFF_LEN: usize = 4096;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A file offered for intake, before the accept filter.
#[derive(Debug, Clone)]
pub struct IntakeFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A file that passed the accept filter.
#[derive(Debug, Clone)]
pub struct AcceptedImage {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    pub natural: Dimensions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Content is not a recognised image type.
    NotAnImage,
    /// Recognised, or at least offered, but could not be read.
    Unreadable(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotAnImage => write!(f, "not an image"),
            RejectReason::Unreadable(why) => write!(f, "unreadable: {why}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub name: String,
    pub reason: RejectReason,
}

/// Visual state of a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropState {
    /// Nothing was offered.
    Idle,
    /// Every offered file was accepted.
    Accept,
    /// At least one offered file was filtered out.
    Reject,
}

/// Result of running the accept filter over a batch.
#[derive(Debug, Default)]
pub struct IntakeOutcome {
    pub accepted: Vec<AcceptedImage>,
    pub rejected: Vec<Rejected>,
}

impl IntakeOutcome {
    pub fn state(&self) -> DropState {
        drop_state(self.accepted.len(), self.rejected.len())
    }
}

/// What a drop did to the gallery.
#[derive(Debug)]
pub struct IntakeReport {
    pub added: Vec<EntryId>,
    pub rejected: Vec<Rejected>,
}

impl IntakeReport {
    pub fn state(&self) -> DropState {
        drop_state(self.added.len(), self.rejected.len())
    }
}

fn drop_state(accepted: usize, rejected: usize) -> DropState {
    match (accepted, rejected) {
        (0, 0) => DropState::Idle,
        (_, 0) => DropState::Accept,
        _ => DropState::Reject,
    }
}

/// Expand the offered paths into a flat, ordered list of files.
///
/// Plain files keep their position; directories are replaced by their files,
/// recursively, sorted by file name.
pub fn collect_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, IntakeError> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(IntakeError::NotFound(path.clone()));
        }
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Read every path into memory, in parallel, preserving order.
///
/// A file that cannot be read is returned as a rejection rather than failing
/// the whole batch.
pub fn read_files(paths: &[PathBuf]) -> Vec<Result<IntakeFile, Rejected>> {
    paths
        .par_iter()
        .map(|path| {
            let name = display_name(path);
            match fs::read(path) {
                Ok(bytes) => Ok(IntakeFile { name, bytes }),
                Err(e) => Err(Rejected {
                    name,
                    reason: RejectReason::Unreadable(e.to_string()),
                }),
            }
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run the accept filter on a single file.
pub fn classify(file: IntakeFile) -> Result<AcceptedImage, Rejected> {
    if let Some(root) = svg_root(&file.bytes) {
        let natural = svg_size(root);
        return Ok(AcceptedImage {
            name: file.name,
            mime: SVG_MIME,
            bytes: file.bytes,
            natural,
        });
    }
    let Ok(format) = image::guess_format(&file.bytes) else {
        return Err(Rejected {
            name: file.name,
            reason: RejectReason::NotAnImage,
        });
    };
    let mime = format.to_mime_type();
    if !mime.starts_with("image/") {
        return Err(Rejected {
            name: file.name,
            reason: RejectReason::NotAnImage,
        });
    }
    let dimensions = ImageReader::with_format(Cursor::new(&file.bytes), format).into_dimensions();
    match dimensions {
        Ok((width, height)) if width > 0 && height > 0 => Ok(AcceptedImage {
            name: file.name,
            mime,
            bytes: file.bytes,
            natural: Dimensions { width, height },
        }),
        Ok(_) => Err(Rejected {
            name: file.name,
            reason: RejectReason::Unreadable("zero-sized image".to_string()),
        }),
        Err(ImageError::Unsupported(e)) => {
            log::debug!(
                "{}: {e}, assuming {}x{}",
                file.name,
                FALLBACK_NATURAL.width,
                FALLBACK_NATURAL.height
            );
            Ok(AcceptedImage {
                name: file.name,
                mime,
                bytes: file.bytes,
                natural: FALLBACK_NATURAL,
            })
        }
        Err(e) => Err(Rejected {
            name: file.name,
            reason: RejectReason::Unreadable(e.to_string()),
        }),
    }
}

/// The attributes of the root `<svg ...>` tag, if the content is an SVG
/// document. A leading BOM, XML declaration, comments and doctype are skipped.
fn svg_root(bytes: &[u8]) -> Option<&str> {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_LEN)];
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(e) => std::str::from_utf8(&head[..e.valid_up_to()]).unwrap_or_default(),
    };
    let mut rest = text.trim_start_matches('\u{feff}').trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("<?") {
            rest = after.split_once("?>")?.1.trim_start();
        } else if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.split_once("-->")?.1.trim_start();
        } else if let Some(after) = rest.strip_prefix("<!") {
            rest = after.split_once('>')?.1.trim_start();
        } else {
            break;
        }
    }
    let tag = rest.strip_prefix("<svg")?;
    if !tag.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/') {
        return None;
    }
    tag.find('>').map(|end| &tag[..end])
}

/// Size from `width`/`height`, filled in from `viewBox` where one is missing.
fn svg_size(attrs: &str) -> Dimensions {
    let width = svg_attribute(attrs, "width").and_then(parse_length);
    let height = svg_attribute(attrs, "height").and_then(parse_length);
    let view_box = svg_attribute(attrs, "viewBox").and_then(parse_view_box);
    let size = match (width, height, view_box) {
        (Some(w), Some(h), _) => Some((w, h)),
        (Some(w), None, Some((vw, vh))) if vw > 0.0 => Some((w, w * vh / vw)),
        (None, Some(h), Some((vw, vh))) if vh > 0.0 => Some((h * vw / vh, h)),
        (None, None, Some(size)) => Some(size),
        _ => None,
    };
    size.and_then(|(w, h)| {
        let (w, h) = (w.round(), h.round());
        (w >= 1.0 && h >= 1.0).then(|| Dimensions {
            width: w as u32,
            height: h as u32,
        })
    })
    .unwrap_or(FALLBACK_NATURAL)
}

fn svg_attribute<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = attrs;
    while let Some(pos) = rest.find(name) {
        let preceded_by_space = rest[..pos].ends_with(char::is_whitespace);
        rest = &rest[pos + name.len()..];
        if !preceded_by_space {
            continue;
        }
        let Some(value) = rest.trim_start().strip_prefix('=') else {
            continue;
        };
        let value = value.trim_start();
        let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value = &value[1..];
        return value.find(quote).map(|end| &value[..end]);
    }
    None
}

/// A plain or `px` length. Relative units give `None`.
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim_end();
    number.parse().ok().filter(|n: &f64| n.is_finite())
}

fn parse_view_box(value: &str) -> Option<(f64, f64)> {
    let numbers: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match numbers[..] {
        [_, _, w, h] if w.is_finite() && h.is_finite() => Some((w, h)),
        _ => None,
    }
}

/// Run the accept filter over a batch, keeping order within each side.
pub fn filter(files: Vec<Result<IntakeFile, Rejected>>) -> IntakeOutcome {
    let mut outcome = IntakeOutcome::default();
    for file in files {
        match file.and_then(classify) {
            Ok(image) => outcome.accepted.push(image),
            Err(rejected) => {
                log::info!("rejected {}: {}", rejected.name, rejected.reason);
                outcome.rejected.push(rejected);
            }
        }
    }
    outcome
}

/// Collect, read and filter the offered paths.
pub fn intake_paths(paths: &[PathBuf]) -> Result<IntakeOutcome, IntakeError> {
    let files = collect_paths(paths)?;
    Ok(filter(read_files(&files)))
}

/// Append the accepted part of an outcome to the gallery.
pub fn accept_into<S: ResourceStore>(
    gallery: &mut Gallery<S>,
    outcome: IntakeOutcome,
) -> IntakeReport {
    let added = gallery.add_batch(outcome.accepted);
    IntakeReport {
        added,
        rejected: outcome.rejected,
    }
}

/// Offer paths to the gallery: the whole intake pipeline in one call.
pub fn drop_paths<S: ResourceStore>(
    gallery: &mut Gallery<S>,
    paths: &[PathBuf],
) -> Result<IntakeReport, IntakeError> {
    let outcome = intake_paths(paths)?;
    Ok(accept_into(gallery, outcome))
}
