//! Property-based tests for alignment, reconciliation and table invariants.
//!
//! Tests validate:
//! 1. Swapping the two runs swaps row sides and nothing else
//! 2. Realigning the same input is deterministic
//! 3. Approvals always win the displayed value
//! 4. Deleting a key removes every occurrence from rows and approvals
//! 5. Table columns are disjoint and every line is classified once
//! 6. Scroll targets are never negative

use fieldmatch::align::align;
use fieldmatch::cluster::{cluster, ClusterOptions};
use fieldmatch::model::{normalized_key, BoundingBox, ExtractionItem, PageIndex};
use fieldmatch::state::{ApprovalMap, ReconciliationSession};
use fieldmatch::view_state::viewport::scroll_target;
use fieldmatch::view_state::{DisplayScale, PagePlacement};
use proptest::prelude::*;
use std::collections::HashSet;

// ===== Strategies =====

const KEYS: &[&str] = &["Name", "Amount", "Amount [2]", "Date", "Claimant", "Status", ""];

fn item_strategy() -> impl Strategy<Value = ExtractionItem> {
    (
        prop::sample::select(KEYS),
        prop::sample::select(&["a", "b", "c"][..]),
        prop::collection::vec(0usize..20, 0..3),
    )
        .prop_map(|(key, value, lines)| ExtractionItem::new(key, value, lines))
}

fn items_strategy() -> impl Strategy<Value = Vec<ExtractionItem>> {
    prop::collection::vec(item_strategy(), 0..12)
}

// ===== Property 1: Symmetry =====

proptest! {
    #[test]
    fn swapping_runs_swaps_row_sides(a in items_strategy(), b in items_strategy()) {
        let forward: Vec<_> = align(&a, &b).iter().map(|row| row.swapped()).collect();
        let backward = align(&b, &a);
        prop_assert_eq!(forward, backward);
    }
}

// ===== Property 2: Determinism =====

proptest! {
    #[test]
    fn realignment_is_deterministic(a in items_strategy(), b in items_strategy()) {
        prop_assert_eq!(align(&a, &b), align(&a, &b));
    }

    #[test]
    fn row_count_is_sum_of_per_key_maxima(a in items_strategy(), b in items_strategy()) {
        let rows = align(&a, &b);
        let expected: usize = KEYS
            .iter()
            .map(|key| {
                let count = |items: &[ExtractionItem]| {
                    items.iter().filter(|i| i.source_key == *key).count()
                };
                count(&a).max(count(&b))
            })
            .sum();
        prop_assert_eq!(rows.len(), expected);
    }

    #[test]
    fn rows_are_sorted_by_sort_key(a in items_strategy(), b in items_strategy()) {
        let rows = align(&a, &b);
        prop_assert!(rows.windows(2).all(|w| w[0].sort_key <= w[1].sort_key));
    }
}

// ===== Property 3: Approval Precedence =====

proptest! {
    #[test]
    fn approved_value_is_displayed(
        a in items_strategy(),
        b in items_strategy(),
        pick in any::<prop::sample::Index>(),
        approved in "[a-z]{1,6}",
    ) {
        let session = ReconciliationSession::new(a, b);
        prop_assume!(!session.rows().is_empty());
        let key = session.rows()[pick.index(session.rows().len())].key.clone();

        let session = session.approve(key.clone(), approved.clone());
        let row = session.row(&key).expect("approved row exists");
        prop_assert_eq!(session.display_value(row), approved.as_str());
    }
}

// ===== Property 4: Deletion Completeness =====

proptest! {
    #[test]
    fn delete_removes_every_occurrence(
        a in items_strategy(),
        b in items_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let session = ReconciliationSession::new(a, b);
        prop_assume!(!session.rows().is_empty());
        let label = session.rows()[pick.index(session.rows().len())].key.clone();
        let session = session.approve(label.clone(), "x");
        let target = normalized_key(&label).to_string();

        let session = session.delete(&label);
        prop_assert!(session.rows().iter().all(|r| normalized_key(&r.key) != target));
        prop_assert!(session.approvals().iter().all(|(k, _)| normalized_key(k) != target));
    }
}

// ===== Property 5: Cluster Partition =====

proptest! {
    #[test]
    fn table_columns_are_disjoint(
        a in items_strategy(),
        b in items_strategy(),
        threshold in 0usize..4,
    ) {
        let rows = align(&a, &b);
        let options = ClusterOptions { density_threshold: threshold };
        let result = cluster(&rows, &ApprovalMap::new(), &options);

        let mut seen = HashSet::new();
        for table in &result.tables {
            for column in &table.columns {
                prop_assert!(seen.insert(column.clone()), "column {} in two tables", column);
            }
        }

        let mut lines = HashSet::new();
        for row in result.tables.iter().flat_map(|t| &t.rows).chain(&result.info_rows) {
            let line = row.line_number;
            prop_assert!(lines.insert(line), "line {} classified twice", line);
        }
    }
}

// ===== Property 6: Scroll Targets =====

proptest! {
    #[test]
    fn scroll_target_is_never_negative(
        page_top in 0.0f64..10_000.0,
        y in 0.0f64..2_000.0,
        css_width in 1.0f64..2_000.0,
        viewport in 0.0f64..5_000.0,
    ) {
        let scale = DisplayScale::new(css_width, 850.0).expect("positive widths");
        let bbox = BoundingBox { x: 0.0, y, width: 850.0, height: 12.0, page: PageIndex::new(0) };
        let placement = PagePlacement { page_top, canvas_offset: 0.0 };

        prop_assert!(scroll_target(placement, &bbox, scale, viewport).get() >= 0.0);
    }
}
