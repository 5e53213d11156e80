//! Final reconciled field list.
//!
//! One entry per comparison row, carrying the effective value under the current
//! approvals. Persisting the payload is the caller's business.

use crate::model::DocumentHandle;
use crate::state::approval::display_value;
use crate::state::ReconciliationSession;
use serde::Serialize;

/// One reconciled field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledField {
    /// Row label, occurrence suffix included.
    pub key: String,
    /// Effective value: approval, agreed value or the unresolved sentinel.
    pub value: String,
    /// Unsuffixed grouping key.
    pub source_key: String,
    /// Ascending union of both runs' line numbers.
    pub line_numbers: Vec<usize>,
    /// Whether a reviewer approved a value for this row.
    pub is_approved: bool,
    /// Whether both runs reported the same value.
    pub is_match: bool,
}

/// Everything a reviewer signed off on for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportPayload {
    /// Handle of the document the fields were extracted from.
    pub document: DocumentHandle,
    /// Number of entries in `items`.
    pub total_items: usize,
    /// Reconciled fields in row order.
    pub items: Vec<ReconciledField>,
}

impl ExportPayload {
    /// Snapshot the reconciled fields of `session` for `document`.
    pub fn new(document: DocumentHandle, session: &ReconciliationSession) -> Self {
        let items = reconciled_fields(session);
        Self {
            document,
            total_items: items.len(),
            items,
        }
    }
}

/// Reconciled view of every row, in row order.
pub fn reconciled_fields(session: &ReconciliationSession) -> Vec<ReconciledField> {
    let approvals = session.approvals();
    session
        .rows()
        .iter()
        .map(|row| ReconciledField {
            key: row.key.clone(),
            value: display_value(row, approvals).to_string(),
            source_key: row.source_key.clone(),
            line_numbers: row.line_numbers.clone(),
            is_approved: approvals.contains(&row.key),
            is_match: row.is_match,
        })
        .collect()
}
