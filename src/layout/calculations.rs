//! Pure calculation functions for pagination and tile geometry.
//!
//! All functions here are pure and testable without any images.

use std::ops::Range;

/// Split `count` items into consecutive pages of `per_page` items.
///
/// Every page but the last is full. Returns no pages for `count == 0`.
///
/// ```
/// # use printify::layout::calculations::split_fixed;
/// assert_eq!(split_fixed(5, 4), vec![0..4, 4..5]);
/// assert!(split_fixed(0, 4).is_empty());
/// ```
pub fn split_fixed(count: usize, per_page: usize) -> Vec<Range<usize>> {
    let per_page = per_page.max(1);
    (0..count.div_ceil(per_page))
        .map(|page| page * per_page..((page + 1) * per_page).min(count))
        .collect()
}

/// Split items into pages by accumulated height.
///
/// A new page starts when no page has been started yet, or when adding the
/// next item's height to the running total would exceed `budget`. The check
/// only looks at the total before the item is added, so an item taller than
/// the whole budget still lands on a page of its own and overflows it.
///
/// ```
/// # use printify::layout::calculations::split_by_height;
/// // 300 + 300 + 300 = 900 fits; the fourth would make 1200 > 1123
/// assert_eq!(split_by_height(&[300, 300, 300, 300], 1123), vec![0..3, 3..4]);
/// ```
pub fn split_by_height(heights: &[u32], budget: u32) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut current: u64 = 0;
    let mut started = false;

    for (i, &height) in heights.iter().enumerate() {
        if !started || current + u64::from(height) > u64::from(budget) {
            if started {
                pages.push(start..i);
            }
            start = i;
            current = 0;
            started = true;
        }
        current += u64::from(height);
    }
    if started {
        pages.push(start..heights.len());
    }
    pages
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = (h as f64 * src_aspect).round() as u32;
        (w.max(tgt_w), h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h.max(tgt_h))
    }
}

/// Offset that centers an `inner` span inside an `outer` span.
///
/// Negative when `inner` is larger, which is how a cover-fit crops evenly on
/// both sides.
pub fn center_offset(outer: u32, inner: u32) -> i64 {
    (i64::from(outer) - i64::from(inner)) / 2
}

/// Top-left corner of cell `index` in a row-major grid of `columns` columns.
pub fn grid_cell_origin(index: usize, columns: usize, cell: (u32, u32)) -> (i64, i64) {
    let columns = columns.max(1);
    let col = (index % columns) as i64;
    let row = (index / columns) as i64;
    (col * i64::from(cell.0), row * i64::from(cell.1))
}

/// Position items in a wrapping flow, left-to-right then top-to-bottom.
///
/// Each item occupies its own size plus `margin` on every side. A row wraps
/// when the next item would cross `page_width`, unless the row is still
/// empty. Returns the top-left corner of each item's content box.
pub fn flow_positions(sizes: &[(u32, u32)], page_width: u32, margin: u32) -> Vec<(i64, i64)> {
    let margin = i64::from(margin);
    let page_width = i64::from(page_width);
    let mut positions = Vec::with_capacity(sizes.len());
    let (mut x, mut y, mut row_height) = (0i64, 0i64, 0i64);

    for &(w, h) in sizes {
        let outer_w = i64::from(w) + 2 * margin;
        let outer_h = i64::from(h) + 2 * margin;
        if x > 0 && x + outer_w > page_width {
            x = 0;
            y += row_height;
            row_height = 0;
        }
        positions.push((x + margin, y + margin));
        x += outer_w;
        row_height = row_height.max(outer_h);
    }
    positions
}
