//! Mapping resolved boxes onto the scrolled page view.
//!
//! Boxes arrive in the reference render scale. Pages are displayed at some CSS
//! width, so everything is multiplied by the [`DisplayScale`] before it meets
//! scroll or paint coordinates. The device pixel ratio only sizes the backing
//! store of a canvas and never enters scroll math.

use super::types::{DevicePixelRatio, DisplayScale, ScrollOffset};
use crate::highlight::{PageDimensionCache, ZoomLevel};
use crate::model::{BoundingBox, RenderSize};
use serde::Serialize;

/// Where a page canvas sits inside the scroll container, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PagePlacement {
    /// Offset of the page element from the top of the scroll content.
    pub page_top: f64,
    /// Offset of the canvas inside the page element (borders, headers).
    pub canvas_offset: f64,
}

/// A box in CSS pixels relative to its page canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaintRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Pixel size of a canvas backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackingStoreSize {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

/// Scroll and paint geometry for one zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMapper {
    scale: DisplayScale,
    pixel_ratio: DevicePixelRatio,
}

impl ViewportMapper {
    /// Mapper for a fixed scale and pixel ratio.
    pub fn new(scale: DisplayScale, pixel_ratio: DevicePixelRatio) -> Self {
        Self { scale, pixel_ratio }
    }

    /// Build a mapper from the page cache at `zoom`.
    ///
    /// The reference width is the first page's render width at that zoom.
    /// Returns `None` until that page has been rendered.
    pub fn for_zoom(
        css_display_width: f64,
        pages: &PageDimensionCache,
        zoom: ZoomLevel,
        pixel_ratio: DevicePixelRatio,
    ) -> Option<Self> {
        let reference = pages.reference_size(zoom)?;
        let scale = DisplayScale::new(css_display_width, reference.width)?;
        Some(Self::new(scale, pixel_ratio))
    }

    /// CSS to reference scale factor.
    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    /// Device pixel ratio used for backing stores.
    pub fn pixel_ratio(&self) -> DevicePixelRatio {
        self.pixel_ratio
    }

    /// Vertical scroll offset that centres `primary` in the viewport.
    pub fn scroll_target(
        &self,
        placement: PagePlacement,
        primary: &BoundingBox,
        viewport_height: f64,
    ) -> ScrollOffset {
        scroll_target(placement, primary, self.scale, viewport_height)
    }

    /// See [`paint_rect`].
    pub fn paint_rect(&self, bbox: &BoundingBox) -> PaintRect {
        paint_rect(bbox, self.scale)
    }

    /// See [`backing_store_size`].
    pub fn backing_store_size(&self, css: RenderSize) -> BackingStoreSize {
        backing_store_size(css, self.pixel_ratio)
    }
}

/// `page_top + canvas_offset + primary.y * scale - viewport_height / 2`, at least 0.
pub fn scroll_target(
    placement: PagePlacement,
    primary: &BoundingBox,
    scale: DisplayScale,
    viewport_height: f64,
) -> ScrollOffset {
    let top = placement.page_top + placement.canvas_offset + scale.apply(primary.y)
        - viewport_height / 2.0;
    ScrollOffset::clamped(top)
}

/// Map a reference-scale box into CSS pixels within its page canvas.
pub fn paint_rect(bbox: &BoundingBox, scale: DisplayScale) -> PaintRect {
    PaintRect {
        left: scale.apply(bbox.x),
        top: scale.apply(bbox.y),
        width: scale.apply(bbox.width),
        height: scale.apply(bbox.height),
    }
}

/// Canvas backing store for a page displayed at `css` size.
pub fn backing_store_size(css: RenderSize, ratio: DevicePixelRatio) -> BackingStoreSize {
    let device = |v: f64| {
        let scaled = (v * ratio.get()).floor();
        if scaled > 0.0 {
            scaled.min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    };
    BackingStoreSize {
        width: device(css.width),
        height: device(css.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageIndex;

    fn bbox(y: f64) -> BoundingBox {
        BoundingBox {
            x: 40.0,
            y,
            width: 800.0,
            height: 20.0,
            page: PageIndex::new(1),
        }
    }

    #[test]
    fn scroll_target_centres_box() {
        let placement = PagePlacement {
            page_top: 1000.0,
            canvas_offset: 8.0,
        };
        let scale = DisplayScale::new(600.0, 1200.0).expect("valid");

        let target = scroll_target(placement, &bbox(400.0), scale, 600.0);

        // 1000 + 8 + 400 * 0.5 - 300
        assert_eq!(target.get(), 908.0);
    }

    #[test]
    fn scroll_target_clamps_near_document_top() {
        let target = scroll_target(
            PagePlacement::default(),
            &bbox(10.0),
            DisplayScale::IDENTITY,
            800.0,
        );
        assert_eq!(target, ScrollOffset::ZERO);
    }

    #[test]
    fn paint_rect_scales_every_edge() {
        let scale = DisplayScale::new(400.0, 800.0).expect("valid");
        let rect = paint_rect(&bbox(100.0), scale);
        assert_eq!(
            rect,
            PaintRect {
                left: 20.0,
                top: 50.0,
                width: 400.0,
                height: 10.0,
            }
        );
    }

    #[test]
    fn backing_store_uses_pixel_ratio_only() {
        let size = backing_store_size(RenderSize::new(600.5, 800.0), DevicePixelRatio::new(2.0));
        assert_eq!(size, BackingStoreSize { width: 1201, height: 1600 });
    }

    #[test]
    fn pixel_ratio_does_not_affect_scroll() {
        let scale = DisplayScale::new(600.0, 1200.0).expect("valid");
        let standard = ViewportMapper::new(scale, DevicePixelRatio::STANDARD);
        let retina = ViewportMapper::new(scale, DevicePixelRatio::new(3.0));
        let placement = PagePlacement {
            page_top: 500.0,
            canvas_offset: 0.0,
        };

        assert_eq!(
            standard.scroll_target(placement, &bbox(300.0), 400.0),
            retina.scroll_target(placement, &bbox(300.0), 400.0)
        );
        assert_eq!(standard.paint_rect(&bbox(300.0)), retina.paint_rect(&bbox(300.0)));
    }

    #[test]
    fn mapper_for_zoom_uses_reference_page_width() {
        let mut pages = PageDimensionCache::new();
        let zoom = ZoomLevel::from_percent(150);
        pages.insert(PageIndex::new(0), zoom, RenderSize::new(1200.0, 1550.0));

        let mapper = ViewportMapper::for_zoom(900.0, &pages, zoom, DevicePixelRatio::STANDARD)
            .expect("reference page rendered");
        assert_eq!(mapper.scale().get(), 0.75);

        assert!(ViewportMapper::for_zoom(
            900.0,
            &pages,
            ZoomLevel::ACTUAL_SIZE,
            DevicePixelRatio::STANDARD
        )
        .is_none());
    }
}
