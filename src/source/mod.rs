//! Extraction sources.
//!
//! The two model runs for a document come from an external collaborator. This
//! module defines that contract plus a JSON-file implementation:
//! - `ExtractionSource`: async fetch of one run's item list
//! - `FileSource`: both runs read from local JSON files

use crate::model::error::SourceError;
use crate::model::{DocumentHandle, ExtractionItem, Side};
use async_trait::async_trait;
use futures::future::try_join;

/// JSON file implementation.
pub mod file;

pub use file::{load_approvals, load_items, load_line_metadata, FileSource};

/// Supplier of extraction runs.
#[async_trait]
pub trait ExtractionSource: Send + Sync {
    /// Fetch the item list that `run` produced for `document`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` when the run cannot be read or parsed. Engine state
    /// is never touched on failure.
    async fn fetch(
        &self,
        document: &DocumentHandle,
        run: Side,
    ) -> Result<Vec<ExtractionItem>, SourceError>;
}

/// Fetch both runs concurrently.
///
/// # Errors
///
/// Fails with the first `SourceError` either fetch reports.
pub async fn fetch_both<S: ExtractionSource + ?Sized>(
    source: &S,
    document: &DocumentHandle,
) -> Result<(Vec<ExtractionItem>, Vec<ExtractionItem>), SourceError> {
    try_join(
        source.fetch(document, Side::A),
        source.fetch(document, Side::B),
    )
    .await
}
