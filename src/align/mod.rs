//! Field alignment.
//!
//! Merges two flat extraction lists into comparable rows. Items are grouped by
//! source key, and the i-th occurrence of a key on side A is paired with the i-th
//! occurrence on side B. Pure and total: every input produces rows, nothing fails.
//!
//! # Ordering
//!
//! Rows come out sorted by [`SortKey`] (smallest line number, anchorless rows last).
//! Equal sort keys keep the order in which their keys were first seen, where a key's
//! first-seen rank is the smaller of its first positions in the two lists and equal
//! ranks fall back to comparing the key text. That rank treats both lists alike, so
//! swapping the inputs swaps the sides of every row without reordering anything.

use crate::model::{
    bucket_key, row_label, ComparisonRow, ExtractionItem, SortKey, MISSING_VALUE,
};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Occurrences of one key within one list.
#[derive(Debug, Default)]
struct KeyGroup {
    /// Position of the first occurrence in the raw list.
    first_seen: usize,
    /// Raw list positions of every occurrence, in insertion order.
    indices: Vec<usize>,
}

/// Align two extraction lists into ordered comparison rows.
///
/// Produces `max(countA, countB)` rows for every key present on either side.
pub fn align(items_a: &[ExtractionItem], items_b: &[ExtractionItem]) -> Vec<ComparisonRow> {
    let groups_a = group_by_key(items_a);
    let groups_b = group_by_key(items_b);

    let mut rows = Vec::new();
    for key in ordered_keys(&groups_a, &groups_b) {
        let indices_a = groups_a.get(key).map_or(&[][..], |g| g.indices.as_slice());
        let indices_b = groups_b.get(key).map_or(&[][..], |g| g.indices.as_slice());
        let occurrences = indices_a.len().max(indices_b.len());

        for i in 0..occurrences {
            let a = indices_a.get(i).map(|&idx| (idx, &items_a[idx]));
            let b = indices_b.get(i).map(|&idx| (idx, &items_b[idx]));
            rows.push(build_row(key, i, occurrences, a, b));
        }
    }

    // Stable: ties keep key rank order, then occurrence order.
    rows.sort_by_key(|row| row.sort_key);

    debug!(
        items_a = items_a.len(),
        items_b = items_b.len(),
        rows = rows.len(),
        "Aligned extraction lists"
    );
    rows
}

fn group_by_key(items: &[ExtractionItem]) -> HashMap<&str, KeyGroup> {
    let mut groups: HashMap<&str, KeyGroup> = HashMap::new();
    for (idx, item) in items.iter().enumerate() {
        let group = groups
            .entry(bucket_key(&item.source_key))
            .or_insert_with(|| KeyGroup {
                first_seen: idx,
                indices: Vec::new(),
            });
        group.indices.push(idx);
    }
    groups
}

/// Union of keys from both sides in first-seen rank order.
fn ordered_keys<'a>(
    groups_a: &HashMap<&'a str, KeyGroup>,
    groups_b: &HashMap<&'a str, KeyGroup>,
) -> Vec<&'a str> {
    let rank = |key: &str| {
        let first_a = groups_a.get(key).map_or(usize::MAX, |g| g.first_seen);
        let first_b = groups_b.get(key).map_or(usize::MAX, |g| g.first_seen);
        first_a.min(first_b)
    };

    let mut keys: Vec<&str> = groups_a
        .keys()
        .chain(groups_b.keys())
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    keys.sort_by(|x, y| rank(*x).cmp(&rank(*y)).then_with(|| x.cmp(y)));
    keys
}

fn build_row(
    key: &str,
    occurrence: usize,
    occurrences: usize,
    a: Option<(usize, &ExtractionItem)>,
    b: Option<(usize, &ExtractionItem)>,
) -> ComparisonRow {
    let val_a = a.map_or(MISSING_VALUE, |(_, item)| item.value.as_str());
    let val_b = b.map_or(MISSING_VALUE, |(_, item)| item.value.as_str());
    let is_match = a.is_some() && b.is_some() && val_a == val_b;

    let line_numbers_a = a.map(|(_, item)| item.line_numbers.clone()).unwrap_or_default();
    let line_numbers_b = b.map(|(_, item)| item.line_numbers.clone()).unwrap_or_default();
    let line_numbers: Vec<usize> = line_numbers_a
        .iter()
        .chain(line_numbers_b.iter())
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let sort_key = SortKey::from_lines(&line_numbers);

    ComparisonRow {
        key: row_label(key, occurrence, occurrences),
        source_key: key.to_string(),
        val_a: val_a.to_string(),
        val_b: val_b.to_string(),
        is_match,
        line_numbers_a,
        line_numbers_b,
        line_numbers,
        sort_key,
        index_a: a.map(|(idx, _)| idx),
        index_b: b.map(|(idx, _)| idx),
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "align_tests.rs"]
mod tests;
