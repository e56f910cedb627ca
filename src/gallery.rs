//! Gallery state: the ordered working set of images.
//!
//! The gallery is the only mutable state in the system. Entries keep their
//! insertion order, which is the only ordering used for display and
//! pagination.
//!
//! ## Snapshot Semantics
//!
//! Every mutation builds a new entry list and swaps it in. Anything holding a
//! [`Gallery::snapshot`] keeps seeing the list as it was when the snapshot was
//! taken, and no partially applied mutation is ever observable.
//!
//! ## Resource Lifetime
//!
//! The gallery owns the [`ResourceStore`]. A handle is acquired when an entry
//! is created and released when the entry is removed, when the gallery is
//! reset, or when the gallery itself is dropped.
//!
//! ## Missing Entries
//!
//! `remove`, `resize` and `rotate` on an id that is no longer present are
//! silent no-ops that return `false`.

use crate::config::TilesConfig;
use crate::intake::AcceptedImage;
use crate::resource::{DataUrlStore, ResourceHandle, ResourceStore};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Stable identifier of an entry, unique for the life of a gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#').parse().map(EntryId)
    }
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// One user-supplied image plus its display transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    pub id: EntryId,
    pub handle: ResourceHandle,
    /// File name the image was added from.
    pub name: String,
    /// Size of the source image, used for cover-fit.
    pub natural: Dimensions,
    /// Rendered tile width.
    pub width: u32,
    /// Rendered tile height.
    pub height: u32,
    /// Clockwise rotation. Grows by 90 per rotate and is never normalized.
    pub rotation_degrees: i64,
}

impl ImageEntry {
    /// Rotation normalized into `0..360`.
    pub fn normalized_rotation(&self) -> i64 {
        self.rotation_degrees.rem_euclid(360)
    }

    /// Whether the image is turned on its side (90° or 270°).
    pub fn is_quarter_turned(&self) -> bool {
        self.normalized_rotation() % 180 == 90
    }
}

/// Text of a confirmation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: &'static str,
    pub description: &'static str,
}

/// Prompt shown before [`Gallery::reset_all_confirmed`] empties the gallery.
pub const RESET_PROMPT: ConfirmPrompt = ConfirmPrompt {
    title: "Are you sure?",
    description: "This will remove all uploaded images. This action cannot be undone.",
};

/// Gate in front of destructive actions. `false` cancels.
pub trait Confirm {
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&ConfirmPrompt) -> bool,
{
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool {
        self(prompt)
    }
}

/// Ordered collection of image entries.
#[derive(Debug)]
pub struct Gallery<S: ResourceStore = DataUrlStore> {
    entries: Arc<Vec<ImageEntry>>,
    store: S,
    next_id: u64,
    tiles: TilesConfig,
}

impl Gallery<DataUrlStore> {
    pub fn with_tiles(tiles: TilesConfig) -> Self {
        Self::new(DataUrlStore::new(), tiles)
    }
}

impl<S: ResourceStore> Gallery<S> {
    pub fn new(store: S, tiles: TilesConfig) -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            store,
            next_id: 0,
            tiles,
        }
    }

    /// Current entry list. Later mutations do not affect a taken snapshot.
    pub fn snapshot(&self) -> Arc<Vec<ImageEntry>> {
        Arc::clone(&self.entries)
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&ImageEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The `src` that renders an entry's image.
    pub fn source(&self, entry: &ImageEntry) -> Option<&str> {
        self.store.resolve(entry.handle)
    }

    /// Append a batch of accepted images in the order given.
    ///
    /// Each image gets a fresh id, a newly acquired resource handle, and the
    /// default tile size with no rotation.
    pub fn add_batch(&mut self, images: Vec<AcceptedImage>) -> Vec<EntryId> {
        if images.is_empty() {
            return Vec::new();
        }
        let mut next = Vec::with_capacity(self.entries.len() + images.len());
        next.extend(self.entries.iter().cloned());

        let mut ids = Vec::with_capacity(images.len());
        for image in images {
            self.next_id += 1;
            let id = EntryId(self.next_id);
            let handle = self.store.acquire(image.mime, &image.bytes);
            next.push(ImageEntry {
                id,
                handle,
                name: image.name,
                natural: image.natural,
                width: self.tiles.width,
                height: self.tiles.height,
                rotation_degrees: 0,
            });
            ids.push(id);
        }
        self.entries = Arc::new(next);
        log::debug!("added {} entries, gallery now {}", ids.len(), self.len());
        ids
    }

    /// Remove the entry with this id and release its resource.
    pub fn remove(&mut self, id: EntryId) -> bool {
        let Some(removed) = self.get(id).map(|e| e.handle) else {
            return false;
        };
        let next: Vec<ImageEntry> = self.entries.iter().filter(|e| e.id != id).cloned().collect();
        self.entries = Arc::new(next);
        self.store.release(removed);
        true
    }

    /// Add `delta` to both dimensions, never going below `tiles.min_size`.
    pub fn resize(&mut self, id: EntryId, delta: i64) -> bool {
        let floor = i64::from(self.tiles.min_size);
        self.update(id, |entry| {
            entry.width = clamp_dimension(entry.width, delta, floor);
            entry.height = clamp_dimension(entry.height, delta, floor);
        })
    }

    /// Resize up by one `tiles.resize_step`.
    pub fn grow(&mut self, id: EntryId) -> bool {
        self.resize(id, i64::from(self.tiles.resize_step))
    }

    /// Resize down by one `tiles.resize_step`.
    pub fn shrink(&mut self, id: EntryId) -> bool {
        self.resize(id, -i64::from(self.tiles.resize_step))
    }

    /// Turn the entry a further 90° clockwise.
    pub fn rotate(&mut self, id: EntryId) -> bool {
        self.update(id, |entry| entry.rotation_degrees += 90)
    }

    /// Empty the gallery and release every resource. Returns how many
    /// entries were removed.
    pub fn reset_all(&mut self) -> usize {
        let previous = std::mem::replace(&mut self.entries, Arc::new(Vec::new()));
        for entry in previous.iter() {
            self.store.release(entry.handle);
        }
        log::debug!("reset gallery, released {} resources", previous.len());
        previous.len()
    }

    /// [`reset_all`](Self::reset_all) behind a confirmation gate.
    ///
    /// Returns `false` and leaves the gallery untouched when cancelled.
    pub fn reset_all_confirmed(&mut self, confirm: &mut impl Confirm) -> bool {
        if !confirm.confirm(&RESET_PROMPT) {
            log::debug!("reset cancelled");
            return false;
        }
        self.reset_all();
        true
    }

    fn update(&mut self, id: EntryId, apply: impl FnOnce(&mut ImageEntry)) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let mut next = Vec::clone(&self.entries);
        apply(&mut next[pos]);
        self.entries = Arc::new(next);
        true
    }
}

impl<S: ResourceStore> Drop for Gallery<S> {
    fn drop(&mut self) {
        for entry in self.entries.iter() {
            self.store.release(entry.handle);
        }
    }
}

fn clamp_dimension(current: u32, delta: i64, floor: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta).max(floor);
    u32::try_from(next).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::tests::TrackingStore;
    use crate::test_helpers::accepted;
    use proptest::prelude::*;

    fn gallery_with(n: usize) -> Gallery<TrackingStore> {
        let mut gallery = Gallery::new(TrackingStore::new(), TilesConfig::default());
        gallery.add_batch((0..n).map(|i| accepted(&format!("{i}.png"))).collect());
        gallery
    }

    fn names<S: ResourceStore>(gallery: &Gallery<S>) -> Vec<&str> {
        gallery.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn add_batch_uses_default_transform() {
        let gallery = gallery_with(1);
        let entry = &gallery.entries()[0];
        assert_eq!((entry.width, entry.height), (200, 200));
        assert_eq!(entry.rotation_degrees, 0);
    }

    #[test]
    fn add_batch_appends_in_order() {
        let mut gallery = gallery_with(2);
        gallery.add_batch(vec![accepted("a.png"), accepted("b.png")]);
        assert_eq!(names(&gallery), ["0.png", "1.png", "a.png", "b.png"]);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut gallery = gallery_with(2);
        let last = gallery.entries()[1].id;
        assert!(gallery.remove(last));
        let ids = gallery.add_batch(vec![accepted("c.png")]);
        assert_ne!(ids[0], last);
    }

    #[test]
    fn id_is_separate_from_handle() {
        let mut store = TrackingStore::new();
        store.acquire("image/png", b"");
        store.acquire("image/png", b"");
        let mut gallery = Gallery::new(store, TilesConfig::default());
        gallery.add_batch(vec![accepted("x.png")]);
        let entry = &gallery.entries()[0];
        assert_eq!(entry.id, EntryId(1));
        assert_eq!(entry.handle, ResourceHandle(3));
    }

    #[test]
    fn remove_releases_handle() {
        let mut gallery = gallery_with(3);
        let target = gallery.entries()[1].clone();
        assert!(gallery.remove(target.id));
        assert_eq!(names(&gallery), ["0.png", "2.png"]);
        assert_eq!(gallery.store().released, vec![target.handle]);
    }

    #[test]
    fn remove_twice_is_noop() {
        let mut gallery = gallery_with(3);
        let id = gallery.entries()[0].id;
        assert!(gallery.remove(id));
        let before = gallery.snapshot();
        assert!(!gallery.remove(id));
        assert_eq!(*gallery.snapshot(), *before);
        assert!(gallery.store().double_releases().is_empty());
        assert_eq!(gallery.store().released.len(), 1);
    }

    #[test]
    fn resize_adds_delta_to_both_dimensions() {
        let mut gallery = gallery_with(1);
        let id = gallery.entries()[0].id;
        assert!(gallery.resize(id, 10));
        assert!(gallery.resize(id, -30));
        let entry = gallery.get(id).unwrap();
        assert_eq!((entry.width, entry.height), (180, 180));
    }

    #[test]
    fn resize_clamps_to_min_size() {
        let mut gallery = gallery_with(1);
        let id = gallery.entries()[0].id;
        assert!(gallery.resize(id, -10_000));
        let entry = gallery.get(id).unwrap();
        assert_eq!((entry.width, entry.height), (10, 10));
    }

    #[test]
    fn resize_extreme_deltas_saturate() {
        let mut gallery = gallery_with(1);
        let id = gallery.entries()[0].id;
        assert!(gallery.resize(id, i64::MAX));
        let entry = gallery.get(id).unwrap();
        assert_eq!((entry.width, entry.height), (u32::MAX, u32::MAX));

        assert!(gallery.resize(id, i64::MIN));
        let entry = gallery.get(id).unwrap();
        assert_eq!((entry.width, entry.height), (10, 10));
    }

    #[test]
    fn grow_and_shrink_use_resize_step() {
        let mut gallery = gallery_with(1);
        let id = gallery.entries()[0].id;
        gallery.grow(id);
        gallery.grow(id);
        gallery.shrink(id);
        assert_eq!(gallery.get(id).unwrap().width, 210);
    }

    #[test]
    fn rotate_adds_ninety() {
        let mut gallery = gallery_with(1);
        let id = gallery.entries()[0].id;
        gallery.rotate(id);
        let entry = gallery.get(id).unwrap();
        assert_eq!(entry.rotation_degrees, 90);
        assert!(entry.is_quarter_turned());
    }

    #[test]
    fn rotation_is_unbounded() {
        let mut gallery = gallery_with(1);
        let id = gallery.entries()[0].id;
        for _ in 0..5 {
            gallery.rotate(id);
        }
        let entry = gallery.get(id).unwrap();
        assert_eq!(entry.rotation_degrees, 450);
        assert_eq!(entry.normalized_rotation(), 90);
    }

    #[test]
    fn mutations_on_missing_id_are_noops() {
        let mut gallery = gallery_with(2);
        let before = gallery.snapshot();
        let missing = EntryId(99);
        assert!(!gallery.remove(missing));
        assert!(!gallery.resize(missing, 10));
        assert!(!gallery.rotate(missing));
        assert!(Arc::ptr_eq(&before, &gallery.snapshot()));
    }

    #[test]
    fn snapshot_is_not_affected_by_later_mutations() {
        let mut gallery = gallery_with(2);
        let before = gallery.snapshot();
        let id = gallery.entries()[0].id;
        gallery.rotate(id);
        gallery.remove(gallery.entries()[1].id);
        assert_eq!(before.len(), 2);
        assert_eq!(before[0].rotation_degrees, 0);
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn reset_all_releases_every_handle() {
        let mut gallery = gallery_with(5);
        let held: Vec<ResourceHandle> = gallery.entries().iter().map(|e| e.handle).collect();
        assert_eq!(gallery.reset_all(), 5);
        assert!(gallery.is_empty());
        assert_eq!(gallery.store().released, held);
        assert_eq!(gallery.store().live(), 0);
    }

    #[test]
    fn reset_cancelled_leaves_entries() {
        let mut gallery = gallery_with(3);
        let before = gallery.snapshot();
        let mut asked = None;
        let done = gallery.reset_all_confirmed(&mut |prompt: &ConfirmPrompt| {
            asked = Some(prompt.title);
            false
        });
        assert!(!done);
        assert_eq!(asked, Some("Are you sure?"));
        assert_eq!(*gallery.snapshot(), *before);
        assert!(gallery.store().released.is_empty());
    }

    #[test]
    fn reset_confirmed_empties() {
        let mut gallery = gallery_with(3);
        assert!(gallery.reset_all_confirmed(&mut |_: &ConfirmPrompt| true));
        assert!(gallery.is_empty());
        assert_eq!(gallery.store().released.len(), 3);
    }

    #[test]
    fn drop_releases_each_handle_once() {
        let gallery = gallery_with(4);
        let log = gallery.store().release_log();
        let mut held: Vec<ResourceHandle> = gallery.entries().iter().map(|e| e.handle).collect();
        assert!(log.borrow().is_empty());

        drop(gallery);

        let mut released = log.borrow().clone();
        released.sort();
        held.sort();
        assert_eq!(released, held);
    }

    #[test]
    fn drop_after_remove_skips_released_handle() {
        let mut gallery = gallery_with(3);
        let log = gallery.store().release_log();
        let removed = gallery.entries()[0].handle;
        gallery.remove(gallery.entries()[0].id);

        drop(gallery);

        let released = log.borrow();
        assert_eq!(released.len(), 3);
        assert_eq!(released.iter().filter(|h| **h == removed).count(), 1);
    }

    #[test]
    fn entry_id_parses_with_or_without_hash() {
        assert_eq!("3".parse::<EntryId>().unwrap(), EntryId(3));
        assert_eq!("#12".parse::<EntryId>().unwrap(), EntryId(12));
        assert!("abc".parse::<EntryId>().is_err());
    }

    proptest! {
        #[test]
        fn batches_accumulate_in_acceptance_order(batches in prop::collection::vec(0usize..6, 0..6)) {
            let mut gallery = Gallery::new(TrackingStore::new(), TilesConfig::default());
            let mut expected = Vec::new();
            for (b, size) in batches.iter().enumerate() {
                let batch: Vec<_> = (0..*size).map(|i| accepted(&format!("{b}-{i}.png"))).collect();
                expected.extend(batch.iter().map(|a| a.name.clone()));
                gallery.add_batch(batch);
            }
            prop_assert_eq!(gallery.len(), batches.iter().sum::<usize>());
            let actual: Vec<String> = gallery.entries().iter().map(|e| e.name.clone()).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn four_rotations_are_congruent(start_turns in 0usize..8) {
            let mut gallery = gallery_with(1);
            let id = gallery.entries()[0].id;
            for _ in 0..start_turns {
                gallery.rotate(id);
            }
            let before = gallery.get(id).unwrap().rotation_degrees;
            for _ in 0..4 {
                gallery.rotate(id);
            }
            let after = gallery.get(id).unwrap().rotation_degrees;
            prop_assert_eq!(before.rem_euclid(360), after.rem_euclid(360));
        }

        #[test]
        fn resize_never_goes_below_floor(deltas in prop::collection::vec(-500i64..500, 1..10)) {
            let mut gallery = gallery_with(1);
            let id = gallery.entries()[0].id;
            for delta in deltas {
                gallery.resize(id, delta);
                let entry = gallery.get(id).unwrap();
                prop_assert!(entry.width >= 10 && entry.height >= 10);
            }
        }
    }
}
