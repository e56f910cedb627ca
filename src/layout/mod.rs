//! Print layout engine.
//!
//! Turns the ordered gallery into pages. Two interchangeable policies decide
//! where page breaks fall and where each image sits on its page:
//!
//! | Policy | Page breaks | Placement |
//! |---|---|---|
//! | [`GridPolicy`] | every `grid.per_page` images | one cell each, cover-fit crop |
//! | [`FlowPolicy`] | when accumulated height would exceed the page | wrapping flow at the entry's own size |
//!
//! Both produce a [`PrintLayout`]: either [`PrintLayout::Empty`] (nothing to
//! print) or a list of [`Page`]s whose [`Placement`]s carry absolute geometry
//! in page units. Rendering and printing never recompute geometry.
//!
//! The module is split into:
//! - **Calculations**: pure page-split and geometry functions
//! - **Policies**: [`PaginationPolicy`] implementations combining those
//!   functions with entry transforms

pub mod calculations;
mod flow;
mod grid;

pub use flow::FlowPolicy;
pub use grid::GridPolicy;

use crate::config::{PageConfig, PrintConfig};
use crate::gallery::{EntryId, ImageEntry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which pagination policy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Fixed number of images per page, cropped to fill grid cells.
    #[default]
    Grid,
    /// Images at their own size, paged by accumulated height.
    Flow,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Grid => write!(f, "grid"),
            PolicyKind::Flow => write!(f, "flow"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(PolicyKind::Grid),
            "flow" => Ok(PolicyKind::Flow),
            other => Err(format!("unknown policy '{other}' (expected grid or flow)")),
        }
    }
}

/// Axis-aligned box in page units. `x`/`y` may be negative for cropped images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// One image positioned on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub entry: EntryId,
    /// Box the image is shown in, relative to the page.
    pub tile: Rect,
    /// Unrotated image box, relative to the tile.
    pub image: Rect,
    /// Rotation applied around the image box center.
    pub rotation_degrees: i64,
    /// Whether the image is clipped to its tile.
    pub clip: bool,
}

/// One physical sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Zero-based page number.
    pub index: usize,
    pub placements: Vec<Placement>,
}

/// A paginated layout ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "pages", rename_all = "lowercase")]
pub enum PrintLayout {
    /// Nothing to print; rendered as a placeholder page.
    Empty,
    Pages(Vec<Page>),
}

impl PrintLayout {
    pub fn from_pages(pages: Vec<Page>) -> Self {
        if pages.is_empty() {
            PrintLayout::Empty
        } else {
            PrintLayout::Pages(pages)
        }
    }

    pub fn pages(&self) -> &[Page] {
        match self {
            PrintLayout::Empty => &[],
            PrintLayout::Pages(pages) => pages,
        }
    }

    /// Number of sheets the layout prints on, counting the placeholder.
    pub fn sheet_count(&self) -> usize {
        self.pages().len().max(1)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PrintLayout::Empty)
    }
}

/// Strategy that partitions the ordered entries into pages.
pub trait PaginationPolicy {
    fn kind(&self) -> PolicyKind;

    /// Page surface the layout is computed for.
    fn page(&self) -> PageConfig;

    /// Paginate entries in their given order.
    fn paginate(&self, entries: &[ImageEntry]) -> PrintLayout;
}

/// Build the configured policy.
pub fn policy_for(kind: PolicyKind, config: &PrintConfig) -> Box<dyn PaginationPolicy> {
    match kind {
        PolicyKind::Grid => Box::new(GridPolicy::new(config.page, config.grid)),
        PolicyKind::Flow => Box::new(FlowPolicy::new(config.page, config.flow)),
    }
}

/// A layout together with the settings it was computed for.
///
/// This is what `printify plan` prints as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutPlan {
    pub policy: PolicyKind,
    pub page: PageConfig,
    pub layout: PrintLayout,
}

/// Paginate entries with the given policy.
pub fn plan(policy: &dyn PaginationPolicy, entries: &[ImageEntry]) -> LayoutPlan {
    LayoutPlan {
        policy: policy.kind(),
        page: policy.page(),
        layout: policy.paginate(entries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::entries_with_heights;

    #[test]
    fn policy_kind_parses_case_insensitively() {
        assert_eq!("grid".parse::<PolicyKind>(), Ok(PolicyKind::Grid));
        assert_eq!("FLOW".parse::<PolicyKind>(), Ok(PolicyKind::Flow));
        assert!("masonry".parse::<PolicyKind>().is_err());
    }

    #[test]
    fn policy_for_builds_requested_kind() {
        let config = PrintConfig::default();
        assert_eq!(policy_for(PolicyKind::Grid, &config).kind(), PolicyKind::Grid);
        assert_eq!(policy_for(PolicyKind::Flow, &config).kind(), PolicyKind::Flow);
    }

    #[test]
    fn empty_layout_still_prints_one_sheet() {
        assert_eq!(PrintLayout::Empty.sheet_count(), 1);
        assert!(PrintLayout::from_pages(vec![]).is_empty());
    }

    #[test]
    fn plan_serializes_with_kind_tag() {
        let config = PrintConfig::default();
        let policy = policy_for(PolicyKind::Flow, &config);
        let plan = plan(policy.as_ref(), &entries_with_heights(&[300]));
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["policy"], "flow");
        assert_eq!(json["layout"]["kind"], "pages");
        assert_eq!(json["layout"]["pages"][0]["placements"][0]["entry"], 1);
    }

    #[test]
    fn empty_plan_serializes_without_pages() {
        let config = PrintConfig::default();
        let policy = policy_for(PolicyKind::Grid, &config);
        let json = serde_json::to_value(plan(policy.as_ref(), &[])).unwrap();
        assert_eq!(json["layout"]["kind"], "empty");
    }
}
