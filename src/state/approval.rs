//! Reviewer approvals and the display rule.

use crate::model::ComparisonRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display sentinel for a row that disagrees and has no approval yet.
///
/// A domain marker meaning "unresolved", not an absent value.
pub const UNRESOLVED: &str = "null";

/// Map from row key (suffix included) to the value the reviewer accepted.
///
/// Independent of which side produced the value; free-text overrides are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalMap(BTreeMap<String, String>);

impl ApprovalMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the accepted value for `key`, replacing any earlier one.
    pub fn approve(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Approved value for a row label.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// True if the row label has an approval.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Drop every approval for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|key, _| keep(key));
    }

    /// Forget every approval.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Number of approved rows.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing is approved.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Approvals in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for ApprovalMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Effective value of a row.
///
/// Approval wins regardless of match state; otherwise an agreed value; otherwise
/// [`UNRESOLVED`].
pub fn display_value<'a>(row: &'a ComparisonRow, approvals: &'a ApprovalMap) -> &'a str {
    if let Some(approved) = approvals.get(&row.key) {
        approved
    } else if row.is_match {
        &row.val_a
    } else {
        UNRESOLVED
    }
}
