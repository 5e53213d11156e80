//! Line-id to bounding-box resolution.
//!
//! A highlight event names the document lines a field came from. Each line is
//! looked up independently; lookups for one event run concurrently and are joined
//! all-settled, so a blank or structural line never blocks the rest of the batch.

/// Lookup backed by the result file's per-line geometry.
pub mod line_metadata;

pub use line_metadata::LineMetadataLookup;

use crate::model::{
    BoundingBox, DocumentHandle, HighlightSet, LineId, LineRect, LookupError, PageIndex, RenderSize,
};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::debug;

// ===== Collaborators =====

/// External line→rect lookup.
///
/// Answers in the pixel space of `target`; the resolver never rescales.
#[async_trait]
pub trait LineRectLookup: Send + Sync {
    /// Rectangle of `line` in `document`, sized for `target`.
    async fn lookup(
        &self,
        document: &DocumentHandle,
        line: LineId,
        target: RenderSize,
    ) -> Result<LineRect, LookupError>;
}

/// Zoom level in whole percent (100 = unscaled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoomLevel(u32);

impl ZoomLevel {
    /// Unscaled rendering.
    pub const ACTUAL_SIZE: ZoomLevel = ZoomLevel(100);

    /// Zoom level from a percentage.
    pub fn from_percent(percent: u32) -> Self {
        Self(percent)
    }

    /// Zoom level in percent.
    pub fn percent(&self) -> u32 {
        self.0
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::ACTUAL_SIZE
    }
}

/// Rendered page sizes in CSS pixels, keyed by page and zoom.
///
/// Populated by whatever renders pages; read-only during resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDimensionCache {
    entries: HashMap<(PageIndex, ZoomLevel), RenderSize>,
}

impl PageDimensionCache {
    /// Empty cache; pages are added as the renderer reports them.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rendered size of `page` at `zoom`, replacing any previous entry.
    pub fn insert(&mut self, page: PageIndex, zoom: ZoomLevel, size: RenderSize) {
        self.entries.insert((page, zoom), size);
    }

    /// Rendered size of `page` at `zoom`, if it has been rendered.
    pub fn get(&self, page: PageIndex, zoom: ZoomLevel) -> Option<RenderSize> {
        self.entries.get(&(page, zoom)).copied()
    }

    /// Size of the first page at `zoom`, used as the reference render size.
    pub fn reference_size(&self, zoom: ZoomLevel) -> Option<RenderSize> {
        self.get(PageIndex::new(0), zoom)
    }

    /// Drop every entry for `zoom` (the pages were re-rendered).
    pub fn invalidate_zoom(&mut self, zoom: ZoomLevel) {
        self.entries.retain(|(_, z), _| *z != zoom);
    }

    /// Number of cached `(page, zoom)` entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been rendered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ===== Resolution =====

/// Settled outcome of one highlight batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Successfully resolved lines with their boxes, in request order.
    pub resolved: Vec<(LineId, BoundingBox)>,
    /// Lines whose lookup failed, in request order.
    pub failures: Vec<(LineId, LookupError)>,
}

impl Resolution {
    /// Primary/secondary split of the resolved boxes; `None` means nothing to highlight.
    pub fn highlight(&self) -> Option<HighlightSet> {
        HighlightSet::from_ordered(self.resolved.iter().map(|(_, b)| *b).collect())
    }

    /// True when no id survived filtering.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.failures.is_empty()
    }
}

/// Resolves line ids of one document against a lookup collaborator.
#[derive(Debug)]
pub struct HighlightResolver<L> {
    lookup: L,
    document: DocumentHandle,
}

impl<L: LineRectLookup> HighlightResolver<L> {
    /// Resolver for lines of `document`.
    pub fn new(lookup: L, document: DocumentHandle) -> Self {
        Self { lookup, document }
    }

    /// Document whose lines this resolver looks up.
    pub fn document(&self) -> &DocumentHandle {
        &self.document
    }

    /// Resolve raw line ids to boxes in the pixel space of `target`.
    ///
    /// Negative ids are dropped before any lookup. Every remaining id is looked up
    /// concurrently; results keep request order. A lookup whose page has not been
    /// rendered at `zoom` fails that id with [`LookupError::PageNotRendered`].
    pub async fn resolve(
        &self,
        raw_ids: &[i64],
        target: RenderSize,
        pages: &PageDimensionCache,
        zoom: ZoomLevel,
    ) -> Resolution {
        let ids: Vec<LineId> = raw_ids.iter().copied().filter_map(LineId::from_raw).collect();
        if ids.len() < raw_ids.len() {
            debug!(
                dropped = raw_ids.len() - ids.len(),
                "Ignoring negative line ids"
            );
        }
        if ids.is_empty() {
            return Resolution::default();
        }

        if !target.is_usable() {
            debug!(?target, "Render size not usable; failing whole batch");
            let reason = format!("render size {}x{} not usable", target.width, target.height);
            return Resolution {
                resolved: Vec::new(),
                failures: ids
                    .into_iter()
                    .map(|line| (line, LookupError::Unavailable(reason.clone())))
                    .collect(),
            };
        }

        let lookups = ids
            .iter()
            .map(|&line| self.resolve_one(line, target, pages, zoom));
        let settled = join_all(lookups).await;

        let mut resolution = Resolution::default();
        for (line, result) in ids.into_iter().zip(settled) {
            match result {
                Ok(bbox) => resolution.resolved.push((line, bbox)),
                Err(err) => {
                    debug!(%line, error = %err, "Line lookup failed");
                    resolution.failures.push((line, err));
                }
            }
        }
        debug!(
            resolved = resolution.resolved.len(),
            failed = resolution.failures.len(),
            document = %self.document,
            "Highlight batch settled"
        );
        resolution
    }

    async fn resolve_one(
        &self,
        line: LineId,
        target: RenderSize,
        pages: &PageDimensionCache,
        zoom: ZoomLevel,
    ) -> Result<BoundingBox, LookupError> {
        let rect = self.lookup.lookup(&self.document, line, target).await?;
        if pages.get(rect.page, zoom).is_none() {
            return Err(LookupError::PageNotRendered {
                page: rect.page,
                zoom_percent: zoom.percent(),
            });
        }
        Ok(BoundingBox::from(rect))
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Lookup answering from a fixed table, optionally sleeping per line.
    struct TableLookup {
        rects: HashMap<usize, Result<LineRect, LookupError>>,
        delays_ms: HashMap<usize, u64>,
        calls: AtomicUsize,
    }

    impl TableLookup {
        fn new() -> Self {
            Self {
                rects: HashMap::new(),
                delays_ms: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn line(mut self, line: usize, page: usize, y: f64) -> Self {
            self.rects.insert(
                line,
                Ok(LineRect {
                    page: PageIndex::new(page),
                    x1: 0.0,
                    y1: y,
                    x2: 800.0,
                    y2: y + 12.0,
                }),
            );
            self
        }

        fn blank(mut self, line: usize) -> Self {
            self.rects.insert(
                line,
                Err(LookupError::NoBoundingBox {
                    line: LineId::new(line),
                }),
            );
            self
        }

        fn slow(mut self, line: usize, ms: u64) -> Self {
            self.delays_ms.insert(line, ms);
            self
        }
    }

    #[async_trait]
    impl LineRectLookup for TableLookup {
        async fn lookup(
            &self,
            _document: &DocumentHandle,
            line: LineId,
            _target: RenderSize,
        ) -> Result<LineRect, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ms) = self.delays_ms.get(&line.get()) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            self.rects
                .get(&line.get())
                .cloned()
                .unwrap_or_else(|| {
                    Err(LookupError::InvalidLine {
                        line,
                        reason: "index out of range".to_string(),
                    })
                })
        }
    }

    fn doc() -> DocumentHandle {
        DocumentHandle::new("doc-1").expect("valid handle")
    }

    fn target() -> RenderSize {
        RenderSize::new(800.0, 1000.0)
    }

    fn pages(count: usize) -> PageDimensionCache {
        let mut cache = PageDimensionCache::new();
        for page in 0..count {
            cache.insert(PageIndex::new(page), ZoomLevel::ACTUAL_SIZE, target());
        }
        cache
    }

    #[tokio::test]
    async fn partial_resolution_keeps_request_order() {
        let lookup = TableLookup::new().line(3, 0, 30.0).blank(7).line(12, 1, 120.0);
        let resolver = HighlightResolver::new(lookup, doc());

        let resolution = resolver
            .resolve(&[3, 7, 12], target(), &pages(2), ZoomLevel::ACTUAL_SIZE)
            .await;

        let set = resolution.highlight().expect("two ids resolved");
        assert_eq!(set.primary.y, 30.0);
        assert_eq!(set.secondary.len(), 1);
        assert_eq!(set.secondary[0].y, 120.0);
        assert_eq!(set.target_page(), PageIndex::new(0));
        assert_eq!(resolution.failures.len(), 1);
        assert_eq!(resolution.failures[0].0, LineId::new(7));
    }

    #[tokio::test]
    async fn primary_is_first_in_request_order_not_first_to_finish() {
        let lookup = TableLookup::new()
            .line(3, 0, 30.0)
            .line(12, 1, 120.0)
            .slow(3, 50);
        let resolver = HighlightResolver::new(lookup, doc());

        let resolution = resolver
            .resolve(&[3, 12], target(), &pages(2), ZoomLevel::ACTUAL_SIZE)
            .await;

        let set = resolution.highlight().expect("both resolved");
        assert_eq!(set.primary.y, 30.0);
    }

    #[tokio::test]
    async fn negative_ids_are_dropped_before_lookup() {
        let lookup = TableLookup::new().line(4, 0, 40.0);
        let resolver = HighlightResolver::new(lookup, doc());

        let resolution = resolver
            .resolve(&[-1, 4, -20], target(), &pages(1), ZoomLevel::ACTUAL_SIZE)
            .await;

        assert_eq!(resolver.lookup.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolution.resolved.len(), 1);
        assert!(resolution.failures.is_empty());
    }

    #[tokio::test]
    async fn empty_request_is_a_no_op() {
        let resolver = HighlightResolver::new(TableLookup::new(), doc());

        let resolution = resolver
            .resolve(&[-3], target(), &pages(1), ZoomLevel::ACTUAL_SIZE)
            .await;

        assert!(resolution.is_empty());
        assert!(resolution.highlight().is_none());
        assert_eq!(resolver.lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_failures_mean_nothing_to_highlight() {
        let resolver = HighlightResolver::new(TableLookup::new().blank(1), doc());

        let resolution = resolver
            .resolve(&[1, 99], target(), &pages(1), ZoomLevel::ACTUAL_SIZE)
            .await;

        assert!(resolution.highlight().is_none());
        assert_eq!(resolution.failures.len(), 2);
        assert!(matches!(
            resolution.failures[1].1,
            LookupError::InvalidLine { .. }
        ));
    }

    #[tokio::test]
    async fn unrendered_page_fails_only_that_id() {
        let lookup = TableLookup::new().line(1, 0, 10.0).line(2, 5, 20.0);
        let resolver = HighlightResolver::new(lookup, doc());

        let resolution = resolver
            .resolve(&[1, 2], target(), &pages(1), ZoomLevel::ACTUAL_SIZE)
            .await;

        assert_eq!(resolution.resolved.len(), 1);
        assert_eq!(
            resolution.failures[0].1,
            LookupError::PageNotRendered {
                page: PageIndex::new(5),
                zoom_percent: 100,
            }
        );
    }

    #[tokio::test]
    async fn page_cache_is_zoom_specific() {
        let resolver = HighlightResolver::new(TableLookup::new().line(1, 0, 10.0), doc());

        let resolution = resolver
            .resolve(&[1], target(), &pages(1), ZoomLevel::from_percent(150))
            .await;

        assert!(resolution.highlight().is_none());
        assert!(matches!(
            resolution.failures[0].1,
            LookupError::PageNotRendered {
                zoom_percent: 150,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unusable_render_size_fails_batch_without_lookups() {
        let resolver = HighlightResolver::new(TableLookup::new().line(1, 0, 10.0), doc());

        let resolution = resolver
            .resolve(
                &[1],
                RenderSize::new(0.0, 1000.0),
                &pages(1),
                ZoomLevel::ACTUAL_SIZE,
            )
            .await;

        assert_eq!(resolver.lookup.calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            resolution.failures[0].1,
            LookupError::Unavailable(_)
        ));
    }

    #[test]
    fn page_cache_reference_size_and_invalidation() {
        let mut cache = pages(2);
        cache.insert(
            PageIndex::new(0),
            ZoomLevel::from_percent(200),
            RenderSize::new(1600.0, 2000.0),
        );

        assert_eq!(
            cache.reference_size(ZoomLevel::from_percent(200)),
            Some(RenderSize::new(1600.0, 2000.0))
        );
        assert_eq!(cache.len(), 3);

        cache.invalidate_zoom(ZoomLevel::ACTUAL_SIZE);
        assert_eq!(cache.len(), 1);
        assert!(cache.reference_size(ZoomLevel::ACTUAL_SIZE).is_none());
    }
}
