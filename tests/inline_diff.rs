//! Inline-diff invariants exercised as a black-box contract against the
//! public `inline_diff` API (the in-module property tests in
//! `src/inline_diff.rs` cover the same invariants plus internals like
//! `extract_old_content` that aren't part of the public surface).

use diffbridge::inline_diff::{compute, extract_accepted_content, LineKind};
use proptest::prelude::*;

#[test]
fn identical_inputs_yield_only_unchanged() {
    let diff = compute("same\ntext\n", "same\ntext\n");
    assert!(diff.kinds.iter().all(|k| *k == LineKind::Unchanged));
}

#[test]
fn empty_old_yields_only_added() {
    let diff = compute("", "x\ny\nz\n");
    assert!(diff.kinds.iter().all(|k| *k == LineKind::Added));
}

#[test]
fn empty_new_yields_only_deleted() {
    let diff = compute("x\ny\nz\n", "");
    assert!(diff.kinds.iter().all(|k| *k == LineKind::Deleted));
}

#[test]
fn first_changed_row_is_none_when_identical() {
    let diff = compute("a\nb\n", "a\nb\n");
    assert_eq!(diff.first_changed_row(), None);
}

#[test]
fn first_changed_row_points_at_the_first_edit() {
    let diff = compute("a\nb\nc\n", "a\nB\nc\n");
    assert_eq!(diff.first_changed_row(), Some(1));
}

proptest! {
    #[test]
    fn lines_and_kinds_always_match_length(
        old in "[a-d\n]{0,60}",
        new in "[a-d\n]{0,60}",
    ) {
        let diff = compute(&old, &new);
        prop_assert_eq!(diff.lines.len(), diff.kinds.len());
        prop_assert_eq!(diff.len(), diff.lines.len());
    }

    #[test]
    fn accepted_content_reconstructs_new_text(
        old in "[a-d\n]{0,60}",
        new in "[a-d\n]{0,60}",
    ) {
        let diff = compute(&old, &new);
        let new_trailing = new.ends_with('\n');
        let reconstructed = extract_accepted_content(&diff, new_trailing);
        prop_assert_eq!(reconstructed, new);
    }
}
