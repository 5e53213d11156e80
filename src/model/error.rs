//! Error types for fieldmatch.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via `?` and
//! `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned by the binary's entry points
//!   - [`SourceError`] - Extraction source failures (file missing, unreadable, malformed)
//!   - [`ConfigError`](crate::config::ConfigError) - Config file read/parse failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing subscriber setup failures
//! - [`LookupError`] - Per-line highlight resolution failures
//!
//! # Recovery Strategy
//!
//! Alignment and clustering never fail: degenerate inputs produce degenerate but valid output.
//! A [`LookupError`] is **local**: the failing line id is logged and dropped while the rest of
//! the batch proceeds. [`SourceError`]s are **external** failures reported to the caller; they
//! never touch an existing session's rows or approvals, because the engine holds no
//! persistent state of its own.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::model::identifiers::{LineId, PageIndex};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all fatal failure modes.
///
/// # Examples
///
/// ```no_run
/// use fieldmatch::model::error::{AppError, SourceError};
///
/// fn run() -> Result<(), AppError> {
///     // SourceError converts to AppError via From
///     let _items = load()?;
///     Ok(())
/// }
/// # fn load() -> Result<(), SourceError> { Ok(()) }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// An extraction list could not be obtained.
    ///
    /// **Recovery**: report to the user; any session already built from earlier lists
    /// stays intact.
    #[error("Failed to load extraction: {0}")]
    Source(#[from] SourceError),

    /// The configuration file exists but could not be used.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The log file could not be set up.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors raised by an extraction source.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use fieldmatch::model::error::SourceError;
///
/// let err = SourceError::FileNotFound {
///     path: PathBuf::from("/tmp/run_a.json"),
/// };
/// assert!(err.to_string().contains("/tmp/run_a.json"));
/// ```
#[derive(Debug, Error)]
pub enum SourceError {
    /// The extraction file does not exist.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a recognizable extraction payload.
    ///
    /// Accepted shapes are a bare JSON array of items, or an object holding the array
    /// under `items` or `fields`.
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use fieldmatch::model::error::SourceError;
    ///
    /// let err = SourceError::Malformed {
    ///     path: PathBuf::from("run_b.json"),
    ///     reason: "expected an array".to_string(),
    /// };
    /// assert!(err.to_string().contains("expected an array"));
    /// ```
    #[error("Malformed extraction in {path}: {reason}")]
    Malformed {
        /// Offending file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// The remote extraction service failed or has no result for the document.
    #[error("Extraction source unavailable: {0}")]
    Unavailable(String),
}

/// Why a single line id could not be turned into a bounding box.
///
/// These are expected for blank or structural lines and are never fatal to a
/// highlight batch.
///
/// # Examples
///
/// ```
/// use fieldmatch::model::error::LookupError;
/// use fieldmatch::model::LineId;
///
/// let err = LookupError::NoBoundingBox { line: LineId::new(7) };
/// assert!(err.to_string().contains("line 7"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// The id is out of range or its metadata entry is malformed.
    #[error("Invalid line index {line}: {reason}")]
    InvalidLine {
        /// Requested line.
        line: LineId,
        /// What was wrong with it.
        reason: String,
    },

    /// The line exists but has zero height (blank or structural line).
    #[error("Line {line} has no valid bounding box")]
    NoBoundingBox {
        /// Requested line.
        line: LineId,
    },

    /// The line's page has not been rendered at the current zoom yet.
    #[error("Page {page} has no cached dimensions at zoom {zoom_percent}%")]
    PageNotRendered {
        /// Page the line lives on.
        page: PageIndex,
        /// Zoom level the cache was queried at.
        zoom_percent: u32,
    },

    /// The lookup collaborator itself failed.
    #[error("Line lookup unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_converts_into_app_error() {
        fn fails() -> Result<(), SourceError> {
            Err(SourceError::Unavailable("timeout".to_string()))
        }
        fn run() -> Result<(), AppError> {
            fails()?;
            Ok(())
        }
        let err = run().unwrap_err();
        assert!(matches!(err, AppError::Source(SourceError::Unavailable(_))));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn io_error_converts_into_app_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Output(_)));
    }

    #[test]
    fn page_not_rendered_mentions_page_and_zoom() {
        let err = LookupError::PageNotRendered {
            page: PageIndex::new(3),
            zoom_percent: 150,
        };
        let msg = err.to_string();
        assert!(msg.contains("Page 3"), "got: {msg}");
        assert!(msg.contains("150%"), "got: {msg}");
    }

    #[test]
    fn invalid_line_carries_reason() {
        let err = LookupError::InvalidLine {
            line: LineId::new(99),
            reason: "index out of range".to_string(),
        };
        assert!(err.to_string().contains("99"));
        assert!(err.to_string().contains("out of range"));
    }
}
