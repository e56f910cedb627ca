//! Height-packed flow pagination.

use super::calculations::{flow_positions, split_by_height};
use super::{Page, PaginationPolicy, Placement, PolicyKind, PrintLayout, Rect};
use crate::config::{FlowConfig, PageConfig};
use crate::gallery::ImageEntry;

/// Images at their own size, wrapped across the page and paged by height.
///
/// Page breaks follow [`split_by_height`] on the entries' heights against
/// the page height. Nothing is cropped or scaled, so an image larger than
/// the page overflows it.
#[derive(Debug, Clone)]
pub struct FlowPolicy {
    page: PageConfig,
    flow: FlowConfig,
}

impl FlowPolicy {
    pub fn new(page: PageConfig, flow: FlowConfig) -> Self {
        Self { page, flow }
    }
}

impl PaginationPolicy for FlowPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Flow
    }

    fn page(&self) -> PageConfig {
        self.page
    }

    fn paginate(&self, entries: &[ImageEntry]) -> PrintLayout {
        let heights: Vec<u32> = entries.iter().map(|e| e.height).collect();
        let pages = split_by_height(&heights, self.page.height)
            .into_iter()
            .enumerate()
            .map(|(index, range)| {
                let on_page = &entries[range];
                let sizes: Vec<(u32, u32)> = on_page.iter().map(|e| (e.width, e.height)).collect();
                let positions = flow_positions(&sizes, self.page.width, self.flow.margin);
                let placements = on_page
                    .iter()
                    .zip(positions)
                    .map(|(entry, (x, y))| Placement {
                        entry: entry.id,
                        tile: Rect {
                            x,
                            y,
                            width: entry.width,
                            height: entry.height,
                        },
                        image: Rect {
                            x: 0,
                            y: 0,
                            width: entry.width,
                            height: entry.height,
                        },
                        rotation_degrees: entry.rotation_degrees,
                        clip: false,
                    })
                    .collect();
                Page { index, placements }
            })
            .collect();
        PrintLayout::from_pages(pages)
    }
}
