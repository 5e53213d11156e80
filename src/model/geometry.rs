//! Geometry shared by highlight resolution and viewport mapping.
//!
//! Boxes are expressed in the reference scale of the resolution request
//! (the target render size handed to the lookup), never in CSS pixels.

use super::identifiers::PageIndex;
use serde::{Deserialize, Serialize};

/// Width/height pair in pixels of some render target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl RenderSize {
    /// Size from its two edges.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both sides are finite and strictly positive.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Raw corner-form answer from a line→rect lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineRect {
    /// Page the rectangle is on.
    pub page: PageIndex,
    /// Left edge.
    pub x1: f64,
    /// Top edge.
    pub y1: f64,
    /// Right edge.
    pub x2: f64,
    /// Bottom edge.
    pub y2: f64,
}

/// Axis-aligned highlight region on one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, never negative.
    pub width: f64,
    /// Height, never negative.
    pub height: f64,
    /// Page the box is on.
    pub page: PageIndex,
}

impl From<LineRect> for BoundingBox {
    fn from(rect: LineRect) -> Self {
        let (left, right) = if rect.x1 <= rect.x2 {
            (rect.x1, rect.x2)
        } else {
            (rect.x2, rect.x1)
        };
        let (top, bottom) = if rect.y1 <= rect.y2 {
            (rect.y1, rect.y2)
        } else {
            (rect.y2, rect.y1)
        };
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
            page: rect.page,
        }
    }
}

/// Result of one highlight event: exactly one primary box plus any secondaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightSet {
    /// First resolved box in request order; drives page targeting.
    pub primary: BoundingBox,
    /// Remaining resolved boxes in request order.
    pub secondary: Vec<BoundingBox>,
}

impl HighlightSet {
    /// Split boxes in request order into primary and secondaries.
    ///
    /// Returns `None` when there is nothing to highlight.
    pub fn from_ordered(boxes: Vec<BoundingBox>) -> Option<Self> {
        let mut iter = boxes.into_iter();
        let primary = iter.next()?;
        Some(Self {
            primary,
            secondary: iter.collect(),
        })
    }

    /// Page the viewer should navigate to.
    pub fn target_page(&self) -> PageIndex {
        self.primary.page
    }

    /// Total number of boxes. Never zero.
    pub fn box_count(&self) -> usize {
        1 + self.secondary.len()
    }

    /// All boxes, primary first.
    pub fn boxes(&self) -> impl Iterator<Item = &BoundingBox> {
        std::iter::once(&self.primary).chain(self.secondary.iter())
    }
}
