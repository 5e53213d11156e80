//! Domain model types (pure).
//!
//! All types in this module are plain data with smart constructors.

/// Error types.
pub mod error;
/// Raw extraction items.
pub mod extraction;
/// Page geometry.
pub mod geometry;
/// Identifier newtypes.
pub mod identifiers;
/// Comparison rows and key labels.
pub mod row;
/// Reconstructed tables.
pub mod table;

// Re-export for convenience
pub use error::{AppError, LookupError, SourceError};
pub use extraction::{ExtractionItem, Side};
pub use geometry::{BoundingBox, HighlightSet, LineRect, RenderSize};
pub use identifiers::{DocumentHandle, InvalidDocumentHandle, LineId, PageIndex};
pub use row::{
    base_key, bucket_key, normalized_key, row_label, ComparisonRow, SortKey, MISSING_VALUE, NO_KEY,
};
pub use table::{CellData, ClusterResult, ProcessedRow, TableGroup};
