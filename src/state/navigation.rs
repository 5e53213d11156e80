//! QA navigation handler.
//!
//! Pure functions for stepping through comparison rows during review.
//! Next/prev wrap around. The focused row also reports its position among the
//! rows anchored on the same document line, which drives horizontal panning.

use crate::model::ComparisonRow;
use crate::state::approval::ApprovalMap;

/// Which rows navigation visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationScope {
    /// Every row in display order.
    #[default]
    All,
    /// Only mismatches that have no approved value yet.
    NeedsReview,
}

/// Reviewer's position in the row list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QaNavigation {
    /// Rows navigation visits.
    pub scope: NavigationScope,
    /// Index into the row list; `None` before the first step.
    pub current: Option<usize>,
}

/// The focused row and where it sits on its line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldFocus<'a> {
    /// Index of the focused row.
    pub index: usize,
    /// The focused row.
    pub row: &'a ComparisonRow,
    /// Primary line of the row, if it has one.
    pub line: Option<usize>,
    /// Position among rows sharing `line`, in row order.
    pub sibling_index: usize,
    /// Number of rows sharing `line`; 1 for anchorless rows.
    pub sibling_count: usize,
}

impl QaNavigation {
    /// Unfocused navigation over `scope`.
    pub fn new(scope: NavigationScope) -> Self {
        Self {
            scope,
            current: None,
        }
    }

    /// Resolve the current position against `rows`.
    ///
    /// Returns `None` before the first step or when the rows shrank past it.
    pub fn focus<'a>(&self, rows: &'a [ComparisonRow]) -> Option<FieldFocus<'a>> {
        let index = self.current?;
        let row = rows.get(index)?;
        let line = row.primary_line();
        let (sibling_index, sibling_count) = match line {
            Some(line) => {
                let before = rows[..index]
                    .iter()
                    .filter(|r| r.primary_line() == Some(line))
                    .count();
                let total = rows.iter().filter(|r| r.primary_line() == Some(line)).count();
                (before, total)
            }
            None => (0, 1),
        };
        Some(FieldFocus {
            index,
            row,
            line,
            sibling_index,
            sibling_count,
        })
    }
}

// ===== Public API =====

/// Step to the next row in scope.
///
/// Behavior:
/// - Starts at the first row in scope when nothing is focused yet
/// - Wraps from the last row in scope to the first
/// - Leaves the position unchanged when no row is in scope
pub fn next_field(
    mut nav: QaNavigation,
    rows: &[ComparisonRow],
    approvals: &ApprovalMap,
) -> QaNavigation {
    let candidates = in_scope(nav.scope, rows, approvals);
    let Some(&first) = candidates.first() else {
        return nav;
    };
    let next = match nav.current {
        Some(current) => candidates.iter().copied().find(|&i| i > current).unwrap_or(first),
        None => first,
    };
    nav.current = Some(next);
    nav
}

/// Step to the previous row in scope.
///
/// Behavior:
/// - Starts at the last row in scope when nothing is focused yet
/// - Wraps from the first row in scope to the last
/// - Leaves the position unchanged when no row is in scope
pub fn prev_field(
    mut nav: QaNavigation,
    rows: &[ComparisonRow],
    approvals: &ApprovalMap,
) -> QaNavigation {
    let candidates = in_scope(nav.scope, rows, approvals);
    let Some(&last) = candidates.last() else {
        return nav;
    };
    let prev = match nav.current {
        Some(current) => candidates
            .iter()
            .rev()
            .copied()
            .find(|&i| i < current)
            .unwrap_or(last),
        None => last,
    };
    nav.current = Some(prev);
    nav
}

/// Focus the row labelled `key`, whatever the scope. Unknown keys change nothing.
pub fn focus_key(mut nav: QaNavigation, rows: &[ComparisonRow], key: &str) -> QaNavigation {
    if let Some(index) = rows.iter().position(|row| row.key == key) {
        nav.current = Some(index);
    }
    nav
}

fn in_scope(scope: NavigationScope, rows: &[ComparisonRow], approvals: &ApprovalMap) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| match scope {
            NavigationScope::All => true,
            NavigationScope::NeedsReview => !row.is_match && !approvals.contains(&row.key),
        })
        .map(|(i, _)| i)
        .collect()
}
