//! Reconstructed table structure produced by clustering.

use serde::Serialize;
use std::collections::BTreeMap;

/// One resolved field placed in a reconstructed document line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellData {
    /// Reconciled display value.
    pub value: String,
    /// Whether the value came from an approval.
    pub is_approved: bool,
    /// Whether both runs agreed.
    pub is_match: bool,
    /// Row label the cell came from, suffix included.
    pub original_key: String,
    /// Line numbers of the source row.
    pub line_numbers: Vec<usize>,
}

/// One reconstructed "document line" worth of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedRow {
    /// Document line the fields sit on.
    pub line_number: usize,
    /// Base key (suffix stripped) → cell.
    pub data: BTreeMap<String, CellData>,
    /// Number of distinct fields on this line.
    pub density: usize,
}

impl ProcessedRow {
    /// Base keys present on this line.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

/// A cluster of columns that co-occur across several document lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableGroup {
    /// Position of the table in document order, starting at 0.
    pub id: usize,
    /// Column labels in first-seen order. Disjoint from every other group's columns.
    pub columns: Vec<String>,
    /// Member rows in ascending line order.
    pub rows: Vec<ProcessedRow>,
}

impl TableGroup {
    /// Smallest line number among member rows.
    pub fn first_line(&self) -> Option<usize> {
        self.rows.iter().map(|r| r.line_number).min()
    }
}

/// Output of the table clusterer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterResult {
    /// Reconstructed tables in document order.
    pub tables: Vec<TableGroup>,
    /// Lines not classified as table rows, ascending.
    pub info_rows: Vec<ProcessedRow>,
}
