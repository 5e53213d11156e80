//! Horizontal panning while stepping through fields that share a line.
//!
//! A wide line can hold several fields side by side. As navigation moves across
//! them the container pans right in proportion to the field's position among its
//! siblings, up to a fraction of the container width.

use super::types::ScrollOffset;
use tracing::trace;

/// Default share of the container width a full sweep may pan.
pub const DEFAULT_PAN_FRACTION: f64 = 0.5;

/// Horizontal geometry of the scroll container, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanGeometry {
    /// Visible width of the container.
    pub container_width: f64,
    /// Largest horizontal scroll offset.
    pub max_scroll_left: f64,
}

/// Remembers which line the last pan targeted and the baseline to pan from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanTracker {
    line: Option<usize>,
    baseline: f64,
    fraction: f64,
}

impl Default for PanTracker {
    fn default() -> Self {
        Self::new(DEFAULT_PAN_FRACTION)
    }
}

impl PanTracker {
    /// Tracker panning at most `fraction` of the container width.
    ///
    /// Fractions outside `[0, 1]` are clamped; NaN falls back to the default.
    pub fn new(fraction: f64) -> Self {
        let fraction = if fraction.is_nan() {
            DEFAULT_PAN_FRACTION
        } else {
            fraction.clamp(0.0, 1.0)
        };
        Self {
            line: None,
            baseline: 0.0,
            fraction,
        }
    }

    /// Line the last pan targeted.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Scroll position panning starts from.
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Share of the container width a full sweep may pan.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Keep a manual horizontal scroll as the baseline for the current line.
    #[must_use]
    pub fn with_baseline(mut self, scroll_left: f64) -> Self {
        self.baseline = ScrollOffset::clamped(scroll_left).get();
        self
    }

    /// Pan for the field at `sibling_index` of `sibling_count` on `line`.
    ///
    /// Moving to a different line resets the baseline to the left edge first.
    #[must_use]
    pub fn pan(
        mut self,
        line: usize,
        sibling_index: usize,
        sibling_count: usize,
        geometry: PanGeometry,
    ) -> (Self, ScrollOffset) {
        if self.line != Some(line) {
            self.line = Some(line);
            self.baseline = 0.0;
        }

        let progress = sweep_progress(sibling_index, sibling_count);
        let reach = (geometry.container_width * self.fraction).min(geometry.max_scroll_left);
        let reach = if reach > 0.0 { reach } else { 0.0 };
        let offset =
            ScrollOffset::clamped_to(self.baseline + progress * reach, geometry.max_scroll_left);
        trace!(
            line,
            sibling_index,
            sibling_count,
            offset = offset.get(),
            "Panned to field"
        );
        (self, offset)
    }
}

/// `index / (count - 1)` in `[0, 1]`; zero when the line holds one field.
pub fn sweep_progress(sibling_index: usize, sibling_count: usize) -> f64 {
    if sibling_count <= 1 {
        return 0.0;
    }
    let last = (sibling_count - 1) as f64;
    (sibling_index as f64 / last).min(1.0)
}
