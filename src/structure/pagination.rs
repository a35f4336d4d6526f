//! Pagination and overflow detection
//!
//! Pure geometry checks over host-reported layout measurements. The engine
//! never renders; the host hands back each element's rendered box and the
//! page's content height, and these helpers decide whether the page has
//! overflown its printable area.
//!
//! Where to insert the break and how to reflow mid-page content once a page
//! overflows is an open design area; the session only records and logs the
//! condition.

use serde::{Deserialize, Serialize};

/// Vertical space reserved at the bottom of every page for the footer
pub const PAGE_BOTTOM_MARGIN: f32 = 96.0;

/// Rendered height of one full page, used for the page-count estimate
pub const PAGE_RENDER_HEIGHT: f32 = 860.0;

/// Rendered box of one element, as reported by the host surface
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ElementBounds {
    /// Offset of the element's top edge from the page's content origin
    pub top: f32,
    pub height: f32,
}

/// Printable geometry of one page
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PageBounds {
    pub content_height: f32,
}

/// True when the element's bottom edge crosses into the reserved footer
/// space of its page.
pub fn is_overflown(element: &ElementBounds, page: &PageBounds) -> bool {
    element.top + element.height > page.content_height - PAGE_BOTTOM_MARGIN
}

/// Estimate of the page count from the total rendered height
pub fn page_count_estimate(total_height: f32) -> usize {
    if total_height <= 0.0 {
        return 0;
    }
    (total_height / PAGE_RENDER_HEIGHT).round() as usize
}
