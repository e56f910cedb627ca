//! Handing print documents to the platform.
//!
//! Printing goes through the [`PrintSink`] capability so the engine never
//! touches shared environment state directly:
//!
//! | Sink | Effect |
//! |---|---|
//! | [`FileSink`] | writes the document to a file |
//! | [`BrowserSink`] | writes the document, then opens it with the platform opener so the browser's print dialog takes over |
//!
//! A sink that cannot open its surface returns [`PrintError::SurfaceDenied`].
//! [`print_gallery`] turns that into [`PrintReport::Denied`]: the failure is
//! logged and reported, never raised, and the gallery is only ever borrowed
//! immutably so it cannot change.

use crate::gallery::Gallery;
use crate::layout::{PaginationPolicy, PolicyKind, plan};
use crate::render::{PrintDocument, RenderOptions, render_document};
use crate::resource::ResourceStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrintError {
    #[error("Print surface denied: {0}")]
    SurfaceDenied(String),
}

/// Destination for rendered print documents.
pub trait PrintSink {
    /// Hand the document over. What happens to the print job afterwards is
    /// outside this program's control.
    fn submit(&mut self, document: &PrintDocument) -> Result<(), PrintError>;

    /// Human-readable description of where documents go.
    fn destination(&self) -> String;
}

impl<T: PrintSink + ?Sized> PrintSink for Box<T> {
    fn submit(&mut self, document: &PrintDocument) -> Result<(), PrintError> {
        (**self).submit(document)
    }

    fn destination(&self) -> String {
        (**self).destination()
    }
}

/// Writes each document to a fixed path, replacing the previous one.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PrintSink for FileSink {
    fn submit(&mut self, document: &PrintDocument) -> Result<(), PrintError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                PrintError::SurfaceDenied(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        fs::write(&self.path, &document.html).map_err(|e| {
            PrintError::SurfaceDenied(format!("cannot write {}: {e}", self.path.display()))
        })
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes the document like [`FileSink`], then opens it in the default browser.
#[derive(Debug, Clone)]
pub struct BrowserSink {
    file: FileSink,
}

impl BrowserSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: FileSink::new(path),
        }
    }
}

impl PrintSink for BrowserSink {
    fn submit(&mut self, document: &PrintDocument) -> Result<(), PrintError> {
        self.file.submit(document)?;
        let status = opener_command(self.file.path())
            .status()
            .map_err(|e| PrintError::SurfaceDenied(format!("cannot launch browser: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(PrintError::SurfaceDenied(format!(
                "browser opener exited with {status}"
            )))
        }
    }

    fn destination(&self) -> String {
        format!("{} (browser)", self.file.destination())
    }
}

#[cfg(target_os = "macos")]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

/// Outcome of a print request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintReport {
    Printed {
        policy: PolicyKind,
        sheets: usize,
        destination: String,
    },
    /// The sink refused to open its surface. Nothing changed.
    Denied { reason: String },
}

/// Paginate the gallery, render it, and submit it to the sink.
pub fn print_gallery<S: ResourceStore>(
    gallery: &Gallery<S>,
    policy: &dyn PaginationPolicy,
    options: RenderOptions<'_>,
    sink: &mut dyn PrintSink,
) -> PrintReport {
    let snapshot = gallery.snapshot();
    let plan = plan(policy, &snapshot);
    let document = render_document(&plan, gallery, options);
    log::debug!(
        "rendered {} sheet(s) for {} entries with {} policy",
        document.sheets,
        snapshot.len(),
        document.policy
    );

    match sink.submit(&document) {
        Ok(()) => PrintReport::Printed {
            policy: document.policy,
            sheets: document.sheets,
            destination: sink.destination(),
        },
        Err(PrintError::SurfaceDenied(reason)) => {
            log::warn!("print surface denied: {reason}");
            PrintReport::Denied { reason }
        }
    }
}
