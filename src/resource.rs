//! Displayable resource handles.
//!
//! Every accepted image is turned into a resource the print document can
//! render without re-reading the original file. Handles are acquired once per
//! accepted file and released exactly once, when the owning entry is removed
//! or the gallery is reset.
//!
//! The [`ResourceStore`] trait is the seam; [`DataUrlStore`] is the production
//! store, holding each image as a base64 `data:` URL so the generated document
//! is self-contained.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Reference to a displayable resource held by a [`ResourceStore`].
///
/// Handles are never reused by a store, so a released handle cannot alias
/// a newer resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceHandle(pub u64);

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res-{}", self.0)
    }
}

/// Owner of the displayable resources behind every live entry.
pub trait ResourceStore {
    /// Allocate a resource for the given image bytes.
    fn acquire(&mut self, mime: &str, bytes: &[u8]) -> ResourceHandle;

    /// Release a resource. Returns `false` if the handle was not live.
    fn release(&mut self, handle: ResourceHandle) -> bool;

    /// The `src` string that renders the resource, if still live.
    fn resolve(&self, handle: ResourceHandle) -> Option<&str>;

    /// Number of live resources.
    fn live(&self) -> usize;
}

/// Store keeping each image as a base64 `data:` URL.
#[derive(Debug, Default)]
pub struct DataUrlStore {
    next: u64,
    urls: HashMap<ResourceHandle, String>,
}

impl DataUrlStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResourceStore for DataUrlStore {
    fn acquire(&mut self, mime: &str, bytes: &[u8]) -> ResourceHandle {
        self.next += 1;
        let handle = ResourceHandle(self.next);
        let url = format!("data:{};base64,{}", mime, STANDARD.encode(bytes));
        self.urls.insert(handle, url);
        log::debug!("acquired {handle} ({} bytes, {mime})", bytes.len());
        handle
    }

    fn release(&mut self, handle: ResourceHandle) -> bool {
        let released = self.urls.remove(&handle).is_some();
        if released {
            log::debug!("released {handle}");
        }
        released
    }

    fn resolve(&self, handle: ResourceHandle) -> Option<&str> {
        self.urls.get(&handle).map(String::as_str)
    }

    fn live(&self) -> usize {
        self.urls.len()
    }
}
