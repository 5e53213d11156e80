//! Tests for session reducers.

use super::*;
use crate::state::approval::UNRESOLVED;

fn item(key: &str, value: &str, lines: &[usize]) -> ExtractionItem {
    ExtractionItem::new(key, value, lines.to_vec())
}

fn sample() -> ReconciliationSession {
    ReconciliationSession::new(
        vec![
            item("Claim Number", "123", &[5]),
            item("Amount", "10", &[7]),
            item("Amount", "20", &[9]),
            item("Insured", "ACME", &[1]),
        ],
        vec![
            item("Claim Number", "124", &[5]),
            item("Amount", "10", &[7]),
            item("Amount", "21", &[9]),
            item("Insured", "ACME", &[1]),
        ],
    )
}

fn keys(session: &ReconciliationSession) -> Vec<&str> {
    session.rows().iter().map(|r| r.key.as_str()).collect()
}

// ===== approve =====

#[test]
fn approve_sets_display_value_for_mismatch() {
    let session = sample().approve("Claim Number", "124");
    let row = session.row("Claim Number").expect("row exists");
    assert_eq!(session.display_value(row), "124");
}

#[test]
fn approve_does_not_change_rows() {
    let before = sample();
    let after = before.clone().approve("Amount [2]", "20.5");
    assert_eq!(before.rows(), after.rows());
    assert_eq!(after.approvals().get("Amount [2]"), Some("20.5"));
}

#[test]
fn unapproved_mismatch_displays_unresolved() {
    let session = sample();
    let row = session.row("Amount [2]").expect("row exists");
    assert_eq!(session.display_value(row), UNRESOLVED);
}

// ===== update =====

#[test]
fn update_rewrites_value_and_realigns() {
    let session = sample().update(Side::B, 0, "Claim Number", "123");
    let row = session.row("Claim Number").expect("row exists");
    assert!(row.is_match, "edited B value should now agree with A");
    assert_eq!(session.items(Side::B)[0].value, "123");
}

#[test]
fn update_can_rename_key() {
    let session = sample().update(Side::A, 3, "Insured Name", "ACME");
    let labels = keys(&session);
    assert!(labels.contains(&"Insured Name"));
    assert!(labels.contains(&"Insured"), "B still reports the old key");
    let renamed = session.row("Insured Name").expect("renamed row");
    assert_eq!(renamed.val_b, crate::model::MISSING_VALUE);
}

#[test]
fn update_leaves_approvals_untouched() {
    let session = sample()
        .approve("Claim Number", "999")
        .update(Side::A, 0, "Claim Number", "124");
    assert_eq!(session.approvals().get("Claim Number"), Some("999"));
    let row = session.row("Claim Number").expect("row exists");
    assert!(row.is_match);
    assert_eq!(session.display_value(row), "999", "approval still wins");
}

#[test]
fn update_out_of_range_is_noop() {
    let before = sample();
    let after = before.clone().update(Side::A, 42, "X", "Y");
    assert_eq!(before, after);
}

// ===== delete =====

#[test]
fn delete_by_suffixed_label_removes_all_occurrences() {
    let session = sample().delete("Amount [1]");
    assert!(
        session.rows().iter().all(|r| r.source_key != "Amount"),
        "no Amount rows should remain: {:?}",
        keys(&session)
    );
    assert_eq!(session.items(Side::A).len(), 2);
    assert_eq!(session.items(Side::B).len(), 2);
}

#[test]
fn delete_drops_approvals_for_key() {
    let session = sample()
        .approve("Amount [2]", "20")
        .approve("Claim Number", "124")
        .delete("Amount");
    assert!(!session.approvals().contains("Amount [2]"));
    assert!(session.approvals().contains("Claim Number"));
}

#[test]
fn delete_matches_raw_keys_carrying_a_suffix() {
    let session = ReconciliationSession::new(
        vec![item("Amount [2]", "5", &[1]), item("Kept", "1", &[3])],
        vec![item("Amount", "7", &[2])],
    )
    .approve("Amount [2]", "5")
    .delete("Amount [2]");

    assert_eq!(keys(&session), vec!["Kept"]);
    assert!(session.approvals().is_empty());
}

#[test]
fn delete_no_key_bucket_removes_blank_keys() {
    let session = ReconciliationSession::new(
        vec![item("", "stray", &[2]), item("Kept", "1", &[3])],
        vec![item("  ", "other", &[2])],
    )
    .delete(crate::model::NO_KEY);
    assert_eq!(keys(&session), vec!["Kept"]);
}

#[test]
fn delete_unknown_key_keeps_everything() {
    let before = sample();
    let after = before.clone().delete("Nope");
    assert_eq!(before.rows(), after.rows());
}

// ===== replace_run / reset =====

#[test]
fn replace_run_realigns_with_new_list() {
    let session = sample().replace_run(Side::B, vec![item("Claim Number", "123", &[5])]);
    assert_eq!(session.items(Side::B).len(), 1);
    let row = session.row("Claim Number").expect("row exists");
    assert!(row.is_match);
    let amount = session.row("Amount [1]").expect("A still has amounts");
    assert_eq!(amount.val_b, crate::model::MISSING_VALUE);
}

#[test]
fn replace_run_keeps_approvals() {
    let session = sample()
        .approve("Insured", "ACME Corp")
        .replace_run(Side::A, vec![item("Insured", "ACME", &[1])]);
    assert_eq!(session.approvals().get("Insured"), Some("ACME Corp"));
}

#[test]
fn reset_clears_approvals_only() {
    let approved = sample().approve("Claim Number", "124");
    let reset = approved.clone().reset();
    assert!(reset.approvals().is_empty());
    assert_eq!(approved.rows(), reset.rows());
}
