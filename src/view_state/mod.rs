//! View-state layer - scroll, paint and pan geometry for highlighted fields
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (DisplayScale, DevicePixelRatio, ScrollOffset)
//! - `viewport`: ViewportMapper - scroll target, paint rects, canvas backing size
//! - `pan`: PanTracker - horizontal panning across fields sharing a line

/// Horizontal panning.
pub mod pan;
/// Geometry newtypes.
pub mod types;
/// Scroll and paint mapping.
pub mod viewport;

pub use pan::{PanGeometry, PanTracker};
pub use types::{DevicePixelRatio, DisplayScale, ScrollOffset};
pub use viewport::{PagePlacement, PaintRect, ViewportMapper};
