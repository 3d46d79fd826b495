//! Registry invariants exercised directly against `DiffRegistry` rather
//! than through a full `DiffController` build.

use std::path::PathBuf;

use diffbridge::registry::DiffRegistry;
use diffbridge::state::{DiffRequest, DiffState, Layout, Orientation, Status};
use diffbridge::DiffError;

const SPLIT: Layout = Layout::Split {
    orientation: Orientation::Vertical,
};

fn state(tab_name: &str) -> DiffState {
    DiffState {
        request: DiffRequest {
            old_file_path: PathBuf::from("/tmp/a.txt"),
            new_file_path: PathBuf::from("/tmp/a.txt"),
            new_file_contents: "new".to_string(),
            tab_name: tab_name.to_string(),
        },
        status: Status::Pending,
        layout: SPLIT,
        tab_id: diffbridge::host::TabId(1),
        created_new_tab: true,
        original_tab_id: None,
        had_assistant_terminal: false,
        assistant_terminal_width: None,
        windows: Vec::new(),
        buffers: Vec::new(),
        ui_hook_ids: Vec::new(),
        old_file_existed: true,
        new_had_trailing_newline: true,
        placeholder: None,
    }
}

#[tokio::test]
async fn resolved_diffs_are_never_pending_again() {
    let registry = DiffRegistry::new();
    let (suspension, resumer) = diffbridge::suspension::bridge();
    registry.register(state("a"), resumer).unwrap();

    registry.resolve_saved("a", "final".to_string()).unwrap();
    assert_eq!(registry.status_of("a"), Some(Status::Saved));
    assert!(matches!(
        registry.resolve_rejected("a"),
        Err(DiffError::NotPending { .. })
    ));

    drop(suspension);
}

#[test]
fn cleanup_removes_the_entry() {
    let registry = DiffRegistry::new();
    let (_s, r) = diffbridge::suspension::bridge();
    registry.register(state("a"), r).unwrap();
    let taken = registry.take("a");
    assert!(taken.is_some());
    assert!(!registry.contains("a"));
}

#[test]
fn cleanup_all_is_idempotent() {
    let registry = DiffRegistry::new();
    assert!(registry.take_all_rejecting_pending().is_empty());
    assert!(registry.take_all_rejecting_pending().is_empty());
}

#[tokio::test]
async fn second_open_under_the_same_tab_name_rejects_the_first_before_registering() {
    let registry = DiffRegistry::new();
    let (first_suspension, first_resumer) = diffbridge::suspension::bridge();
    registry.register(state("dup"), first_resumer).unwrap();

    // What `DiffController::open_diff_blocking` does on replacement:
    // force-reject-and-take before accepting the new registration.
    let previous = registry.force_reject_and_take("dup").unwrap();
    assert_eq!(previous.status, Status::Rejected);
    assert!(matches!(
        first_suspension.wait().await,
        diffbridge::suspension::Resolution::Rejected
    ));
    assert!(!registry.contains("dup"));

    let (_second_suspension, second_resumer) = diffbridge::suspension::bridge();
    registry.register(state("dup"), second_resumer).unwrap();
    assert!(registry.contains("dup"));
}
