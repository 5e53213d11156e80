//! Reconciliation session.
//!
//! Holds both raw extraction lists, the reviewer's approvals and the rows derived
//! from them. Every mutation is a reducer: it consumes the session and returns a new
//! snapshot whose rows were recomputed from scratch. Nothing is patched in place.

use crate::align::align;
use crate::cluster::{cluster, ClusterOptions};
use crate::model::{normalized_key, ClusterResult, ComparisonRow, ExtractionItem, Side};
use crate::state::approval::{display_value, ApprovalMap};
use tracing::{debug, warn};

/// Session-scoped reconciliation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationSession {
    items_a: Vec<ExtractionItem>,
    items_b: Vec<ExtractionItem>,
    approvals: ApprovalMap,
    /// Derived from the two item lists; never edited directly.
    rows: Vec<ComparisonRow>,
}

impl ReconciliationSession {
    /// Start a session from two model runs.
    pub fn new(items_a: Vec<ExtractionItem>, items_b: Vec<ExtractionItem>) -> Self {
        Self::derive(items_a, items_b, ApprovalMap::new())
    }

    /// Start a session with approvals carried over from elsewhere.
    pub fn with_approvals(
        items_a: Vec<ExtractionItem>,
        items_b: Vec<ExtractionItem>,
        approvals: ApprovalMap,
    ) -> Self {
        Self::derive(items_a, items_b, approvals)
    }

    fn derive(
        items_a: Vec<ExtractionItem>,
        items_b: Vec<ExtractionItem>,
        approvals: ApprovalMap,
    ) -> Self {
        let rows = align(&items_a, &items_b);
        Self {
            items_a,
            items_b,
            approvals,
            rows,
        }
    }

    // ===== Accessors =====

    /// Aligned rows in display order.
    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    /// Reviewer approvals keyed by row label.
    pub fn approvals(&self) -> &ApprovalMap {
        &self.approvals
    }

    /// Raw item list of one run.
    pub fn items(&self, side: Side) -> &[ExtractionItem] {
        match side {
            Side::A => &self.items_a,
            Side::B => &self.items_b,
        }
    }

    /// Row with the given label, suffix included.
    pub fn row(&self, key: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// Effective value of `row` under this session's approvals.
    pub fn display_value<'a>(&'a self, row: &'a ComparisonRow) -> &'a str {
        display_value(row, &self.approvals)
    }

    /// Reconstruct tables from the current rows and approvals.
    pub fn tables(&self, options: &ClusterOptions) -> ClusterResult {
        cluster(&self.rows, &self.approvals, options)
    }

    // ===== Reducers =====

    /// Accept `value` for the row labelled `key`, whatever its match state.
    ///
    /// Rows do not depend on approvals, so they carry over unchanged.
    #[must_use]
    pub fn approve(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        debug!(key = %key, "Approving value");
        self.approvals.approve(key, value);
        self
    }

    /// Rewrite the key and value of one raw item, then re-align.
    ///
    /// Approvals are left exactly as they were, even for the affected key.
    /// An out-of-range index leaves the session unchanged.
    #[must_use]
    pub fn update(
        self,
        side: Side,
        index: usize,
        new_key: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        let Self {
            mut items_a,
            mut items_b,
            approvals,
            rows,
        } = self;

        let items = match side {
            Side::A => &mut items_a,
            Side::B => &mut items_b,
        };
        let Some(item) = items.get_mut(index) else {
            warn!(%side, index, len = items.len(), "Ignoring edit of nonexistent item");
            return Self {
                items_a,
                items_b,
                approvals,
                rows,
            };
        };
        item.source_key = new_key.into();
        item.value = new_value.into();
        debug!(%side, index, key = %item.source_key, "Edited extraction item");

        Self::derive(items_a, items_b, approvals)
    }

    /// Remove every occurrence of a key from both runs, then re-align.
    ///
    /// Keys are compared normalized (see [`normalized_key`]), so a row label, a bare
    /// key and a raw key that itself ends in `" [n]"` all select the same items.
    /// Approvals for the removed rows are dropped with them.
    #[must_use]
    pub fn delete(self, key: &str) -> Self {
        let target = normalized_key(key).to_string();
        let Self {
            mut items_a,
            mut items_b,
            mut approvals,
            ..
        } = self;

        let before = items_a.len() + items_b.len();
        items_a.retain(|item| normalized_key(&item.source_key) != target);
        items_b.retain(|item| normalized_key(&item.source_key) != target);
        approvals.retain(|label| normalized_key(label) != target);
        debug!(
            key = %target,
            removed = before - items_a.len() - items_b.len(),
            "Deleted key from both runs"
        );

        Self::derive(items_a, items_b, approvals)
    }

    /// Replace one side's list after the model was re-run.
    #[must_use]
    pub fn replace_run(self, side: Side, items: Vec<ExtractionItem>) -> Self {
        let Self {
            items_a,
            items_b,
            approvals,
            ..
        } = self;
        match side {
            Side::A => Self::derive(items, items_b, approvals),
            Side::B => Self::derive(items_a, items, approvals),
        }
    }

    /// Forget all approvals (reconciliation reset).
    #[must_use]
    pub fn reset(mut self) -> Self {
        self.approvals.clear();
        self
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
