//! Aligned comparison rows and their key labels.

use serde::Serialize;

/// Bucket name for items reported without a usable key.
pub const NO_KEY: &str = "(no key)";

/// Value shown for the side that has no item at a given occurrence.
pub const MISSING_VALUE: &str = "(missing)";

/// Map a raw source key onto its grouping bucket.
///
/// Blank keys all fall into [`NO_KEY`]; anything else is kept verbatim.
pub fn bucket_key(raw: &str) -> &str {
    if raw.trim().is_empty() {
        NO_KEY
    } else {
        raw
    }
}

/// Build the display label for the `index`-th (0-based) occurrence of `key`.
///
/// The `" [n]"` suffix is only added when the key occurs more than once.
pub fn row_label(key: &str, index: usize, occurrences: usize) -> String {
    if occurrences > 1 {
        format!("{key} [{}]", index + 1)
    } else {
        key.to_string()
    }
}

/// Strip a trailing `" [n]"` disambiguation suffix from a row label.
///
/// Labels without a well-formed suffix are returned unchanged.
pub fn base_key(label: &str) -> &str {
    let Some(stripped) = label.strip_suffix(']') else {
        return label;
    };
    let Some(open) = stripped.rfind(" [") else {
        return label;
    };
    let digits = &stripped[open + 2..];
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        &label[..open]
    } else {
        label
    }
}

/// Key with every trailing `" [n]"` suffix stripped, blank keys bucketed.
///
/// Raw source keys may carry a suffix of their own, so `"Amount [2]"` as reported
/// and the second `"Amount"` row label both normalize to `"Amount"`.
pub fn normalized_key(raw: &str) -> &str {
    let mut key = bucket_key(raw);
    loop {
        let stripped = bucket_key(base_key(key));
        if stripped == key {
            return key;
        }
        key = stripped;
    }
}

/// Ordering key of a row: its smallest line number, or "unordered".
///
/// `UNORDERED` compares greater than every real line, so anchorless rows sort last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SortKey(usize);

impl SortKey {
    /// Sentinel for rows without any line anchor.
    pub const UNORDERED: Self = Self(usize::MAX);

    /// Sort key of a row anchored on `lines`.
    pub fn from_lines(lines: &[usize]) -> Self {
        lines.iter().min().copied().map_or(Self::UNORDERED, Self)
    }

    /// The anchoring line, or `None` for unordered rows.
    pub fn line(&self) -> Option<usize> {
        if self.is_unordered() {
            None
        } else {
            Some(self.0)
        }
    }

    /// True for rows without any line anchor.
    pub fn is_unordered(&self) -> bool {
        *self == Self::UNORDERED
    }
}

/// One comparable row: the i-th occurrence of a key from both runs, side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    /// Row label; carries a `" [n]"` suffix when the key occurs more than once.
    pub key: String,
    /// Unsuffixed grouping key (see [`bucket_key`]).
    pub source_key: String,
    /// Value reported by run A, or [`MISSING_VALUE`].
    pub val_a: String,
    /// Value reported by run B, or [`MISSING_VALUE`].
    pub val_b: String,
    /// Both runs present with identical values.
    pub is_match: bool,
    /// Line numbers of the A item.
    pub line_numbers_a: Vec<usize>,
    /// Line numbers of the B item.
    pub line_numbers_b: Vec<usize>,
    /// Ascending, deduplicated union of both sides.
    pub line_numbers: Vec<usize>,
    /// Ordering key derived from `line_numbers`.
    pub sort_key: SortKey,
    /// Position of the A item in the raw A list, if that side is present.
    pub index_a: Option<usize>,
    /// Position of the B item in the raw B list, if that side is present.
    pub index_b: Option<usize>,
}

impl ComparisonRow {
    /// Line used to place the row in a document-line bucket.
    ///
    /// Prefers side A's anchor, falls back to side B's.
    pub fn primary_line(&self) -> Option<usize> {
        self.line_numbers_a
            .iter()
            .min()
            .or_else(|| self.line_numbers_b.iter().min())
            .copied()
    }

    /// Row with the A and B sides exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            key: self.key.clone(),
            source_key: self.source_key.clone(),
            val_a: self.val_b.clone(),
            val_b: self.val_a.clone(),
            is_match: self.is_match,
            line_numbers_a: self.line_numbers_b.clone(),
            line_numbers_b: self.line_numbers_a.clone(),
            line_numbers: self.line_numbers.clone(),
            sort_key: self.sort_key,
            index_a: self.index_b,
            index_b: self.index_a,
        }
    }
}
