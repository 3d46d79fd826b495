//! Pure line-level diff computation for the inline layout.
//!
//! Drives `similar::TextDiff` over line slices and asks it for its op
//! list directly (`TextDiff::ops`), expanding each op into
//! `unchanged`/`added`/`deleted` lines interleaved in document order --
//! the inline layout has no `Replace` row kind, only those three.

use similar::{DiffOp, TextDiff};

use crate::text::split_lines;

/// Kind of a single line in an inline diff view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Present, unchanged, in both old and new text.
    Unchanged,
    /// Present only in the new text.
    Added,
    /// Present only in the old text.
    Deleted,
}

/// Result of [`compute`]: parallel arrays, `lines[i]` has kind `kinds[i]`.
#[derive(Debug, Clone, Default)]
pub struct InlineDiff {
    /// Line text, in document order.
    pub lines: Vec<String>,
    /// Kind of each line. `kinds.len() == lines.len()` always.
    pub kinds: Vec<LineKind>,
}

impl InlineDiff {
    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether there are no lines at all (both inputs empty).
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Row index of the first non-unchanged line, if any. Used by the
    /// inline `LayoutEngine` to position the cursor.
    pub fn first_changed_row(&self) -> Option<usize> {
        self.kinds.iter().position(|k| *k != LineKind::Unchanged)
    }
}

/// Compute the inline diff between `old_text` and `new_text`.
///
/// Empty/absent `old_text` yields pure insertions; empty/absent
/// `new_text` yields pure deletions. `compute(x, x)` yields only
/// `Unchanged` entries.
pub fn compute(old_text: &str, new_text: &str) -> InlineDiff {
    let (old_lines, _) = split_lines(old_text);
    let (new_lines, _) = split_lines(new_text);

    let old_refs: Vec<&str> = old_lines.iter().map(String::as_str).collect();
    let new_refs: Vec<&str> = new_lines.iter().map(String::as_str).collect();

    let diff = TextDiff::from_slices(&old_refs, &new_refs);

    let mut lines = Vec::with_capacity(old_lines.len().max(new_lines.len()));
    let mut kinds = Vec::with_capacity(lines.capacity());

    // Each op is a hunk over old/new line ranges. A pure insertion has
    // an empty old range; similar's Equal ops between hunks already
    // cover the unchanged runs on both sides, so no separate
    // bookkeeping is needed to place an insertion relative to its
    // neighboring unchanged lines.
    for op in diff.ops() {
        match *op {
            DiffOp::Equal {
                old_index, len, ..
            } => {
                for i in 0..len {
                    lines.push(old_lines[old_index + i].clone());
                    kinds.push(LineKind::Unchanged);
                }
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                for i in 0..old_len {
                    lines.push(old_lines[old_index + i].clone());
                    kinds.push(LineKind::Deleted);
                }
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                for i in 0..new_len {
                    lines.push(new_lines[new_index + i].clone());
                    kinds.push(LineKind::Added);
                }
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                for i in 0..old_len {
                    lines.push(old_lines[old_index + i].clone());
                    kinds.push(LineKind::Deleted);
                }
                for i in 0..new_len {
                    lines.push(new_lines[new_index + i].clone());
                    kinds.push(LineKind::Added);
                }
            }
        }
    }

    InlineDiff { lines, kinds }
}

/// Concatenate every non-deleted line, joined by `\n`, re-appending a
/// trailing newline iff `new_had_trailing_newline` -- iff the original
/// `new_file_contents` ended with one.
pub fn extract_accepted_content(diff: &InlineDiff, new_had_trailing_newline: bool) -> String {
    let accepted: Vec<&str> = diff
        .lines
        .iter()
        .zip(diff.kinds.iter())
        .filter(|(_, kind)| **kind != LineKind::Deleted)
        .map(|(line, _)| line.as_str())
        .collect();

    let mut out = accepted.join("\n");
    if new_had_trailing_newline && !accepted.is_empty() {
        out.push('\n');
    }
    out
}

/// Concatenate every non-added line, joined by `\n`. Used only by tests
/// to assert the old-side reconstruction property.
fn extract_old_content(diff: &InlineDiff, old_had_trailing_newline: bool) -> String {
    let original: Vec<&str> = diff
        .lines
        .iter()
        .zip(diff.kinds.iter())
        .filter(|(_, kind)| **kind != LineKind::Added)
        .map(|(line, _)| line.as_str())
        .collect();

    let mut out = original.join("\n");
    if old_had_trailing_newline && !original.is_empty() {
        out.push('\n');
    }
    out
}
