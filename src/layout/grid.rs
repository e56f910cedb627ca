//! Fixed-count grid pagination.

use super::calculations::{
    calculate_fill_dimensions, center_offset, grid_cell_origin, split_fixed,
};
use super::{Page, PaginationPolicy, Placement, PolicyKind, PrintLayout, Rect};
use crate::config::{GridConfig, PageConfig};
use crate::gallery::ImageEntry;

/// `per_page` images per sheet, each cropped to fill its grid cell.
///
/// The entry's own width/height do not matter here; the cell decides the
/// tile size. Quarter-turned images are fitted with their sides swapped so
/// the rotated result still covers the cell.
#[derive(Debug, Clone)]
pub struct GridPolicy {
    page: PageConfig,
    grid: GridConfig,
}

impl GridPolicy {
    pub fn new(page: PageConfig, grid: GridConfig) -> Self {
        Self { page, grid }
    }

    /// Size of a single cell.
    pub fn cell_size(&self) -> (u32, u32) {
        let columns = u32::try_from(self.grid.columns.max(1)).unwrap_or(u32::MAX);
        let rows = u32::try_from(self.grid.rows().max(1)).unwrap_or(u32::MAX);
        (self.page.width / columns, self.page.height / rows)
    }

    fn place(&self, slot: usize, entry: &ImageEntry) -> Placement {
        let cell = self.cell_size();
        let (x, y) = grid_cell_origin(slot, self.grid.columns, cell);

        let natural = (entry.natural.width, entry.natural.height);
        let turned = entry.is_quarter_turned();
        let oriented = if turned {
            (natural.1, natural.0)
        } else {
            natural
        };
        let (fill_w, fill_h) = calculate_fill_dimensions(oriented, cell);
        // The image box is laid out unrotated, then turned about its center
        let (box_w, box_h) = if turned {
            (fill_h, fill_w)
        } else {
            (fill_w, fill_h)
        };

        Placement {
            entry: entry.id,
            tile: Rect {
                x,
                y,
                width: cell.0,
                height: cell.1,
            },
            image: Rect {
                x: center_offset(cell.0, box_w),
                y: center_offset(cell.1, box_h),
                width: box_w,
                height: box_h,
            },
            rotation_degrees: entry.normalized_rotation(),
            clip: true,
        }
    }
}

impl PaginationPolicy for GridPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Grid
    }

    fn page(&self) -> PageConfig {
        self.page
    }

    fn paginate(&self, entries: &[ImageEntry]) -> PrintLayout {
        let pages = split_fixed(entries.len(), self.grid.per_page)
            .into_iter()
            .enumerate()
            .map(|(index, range)| Page {
                index,
                placements: entries[range]
                    .iter()
                    .enumerate()
                    .map(|(slot, entry)| self.place(slot, entry))
                    .collect(),
            })
            .collect();
        PrintLayout::from_pages(pages)
    }
}
