//! fieldmatch
//!
//! Reconciles two independent field extractions of the same document and maps
//! reconciled fields back onto source page regions.
//!
//! The library is a pure core (alignment, approvals, table clustering, viewport
//! geometry) around two async collaborator seams: where extraction runs come
//! from, and how a document line maps to a page rectangle.

/// Pairing of two extraction runs into comparison rows.
pub mod align;
/// Table reconstruction from aligned rows.
pub mod cluster;
/// Configuration loading.
pub mod config;
/// Reconciled field list.
pub mod export;
/// Line id to page box resolution.
pub mod highlight;
/// File-based tracing setup.
pub mod logging;
/// Domain types.
pub mod model;
/// Where extraction runs come from.
pub mod source;
/// Session, approval, highlight and navigation state.
pub mod state;
/// Scroll, paint and pan geometry.
pub mod view_state;
