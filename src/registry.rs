//! Process-wide table of live diffs, keyed by tab name.
//!
//! A trait-free, mutex-guarded map behind a small, typed API,
//! instrumented with `tracing` at each state transition.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::errors::DiffError;
use crate::state::{DiffState, Status};
use crate::suspension::Resumer;

/// One live diff plus the `Resumer` that will wake its suspended caller.
struct Entry {
    state: DiffState,
    resumer: Option<Resumer>,
}

/// The process-wide registry. One instance is shared (via `Arc`) across
/// every RPC handler invocation.
#[derive(Default)]
pub struct DiffRegistry {
    entries: Mutex<HashMap<String, Entry>>,
}

impl DiffRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending diff under `state.request.tab_name`.
    /// Fails with [`DiffError::AlreadyRegistered`] if that name is
    /// already live -- callers must force-reject any existing diff for
    /// the same tab name first.
    pub fn register(&self, state: DiffState, resumer: Resumer) -> Result<(), DiffError> {
        let tab_name = state.request.tab_name.clone();
        let mut entries = self.entries.lock();
        if entries.contains_key(&tab_name) {
            return Err(DiffError::AlreadyRegistered { tab_name });
        }
        tracing::debug!(tab_name = %tab_name, "diff registered");
        entries.insert(
            tab_name,
            Entry {
                state,
                resumer: Some(resumer),
            },
        );
        Ok(())
    }

    /// Whether a diff is currently registered for `tab_name`, in any
    /// status.
    pub fn contains(&self, tab_name: &str) -> bool {
        self.entries.lock().contains_key(tab_name)
    }

    /// Resolve the diff for `tab_name` as saved with `contents`, waking
    /// its suspended caller exactly once. Idempotent: a second call
    /// after resolution returns `NotPending` rather than firing the
    /// resumer twice.
    pub fn resolve_saved(&self, tab_name: &str, contents: String) -> Result<(), DiffError> {
        self.resolve(tab_name, Status::Saved, crate::suspension::Resolution::Saved(contents))
    }

    /// Resolve the diff for `tab_name` as rejected, waking its suspended
    /// caller exactly once.
    pub fn resolve_rejected(&self, tab_name: &str) -> Result<(), DiffError> {
        self.resolve(tab_name, Status::Rejected, crate::suspension::Resolution::Rejected)
    }

    fn resolve(
        &self,
        tab_name: &str,
        status: Status,
        resolution: crate::suspension::Resolution,
    ) -> Result<(), DiffError> {
        let resumer = {
            let mut entries = self.entries.lock();
            let entry = entries
                .get_mut(tab_name)
                .ok_or_else(|| DiffError::NotFound {
                    tab_name: tab_name.to_string(),
                })?;
            if entry.state.is_resolved() {
                return Err(DiffError::NotPending {
                    tab_name: tab_name.to_string(),
                    status: status_label(entry.state.status).to_string(),
                });
            }
            entry.state.status = status;
            entry.resumer.take()
        };
        tracing::debug!(tab_name = %tab_name, ?status, "diff resolved");
        if let Some(resumer) = resumer {
            resumer.resolve(resolution);
        }
        Ok(())
    }

    /// Remove a diff's bookkeeping entry and hand back its `DiffState` so
    /// the caller can tear down the UI state it owns: detach hooks, close
    /// windows, delete buffers, and remove the entry. Used once a diff is
    /// resolved.
    pub fn take(&self, tab_name: &str) -> Option<DiffState> {
        let entry = self.entries.lock().remove(tab_name)?;
        tracing::debug!(tab_name = %tab_name, "diff removed from registry");
        Some(entry.state)
    }

    /// Force-reject whatever diff is registered under `tab_name`, if any,
    /// waking its suspended caller with `DIFF_REJECTED`, then remove and
    /// return its state for UI teardown. Used by the replacement step in
    /// `open_diff_blocking` and by shutdown.
    pub fn force_reject_and_take(&self, tab_name: &str) -> Option<DiffState> {
        let mut entries = self.entries.lock();
        let mut entry = entries.remove(tab_name)?;
        if !entry.state.is_resolved() {
            entry.state.status = Status::Rejected;
            if let Some(resumer) = entry.resumer.take() {
                resumer.resolve(crate::suspension::Resolution::Rejected);
            }
        }
        tracing::debug!(tab_name = %tab_name, "diff force-rejected");
        Some(entry.state)
    }

    /// Reject every still-pending diff and hand back every live
    /// `DiffState` for teardown, emptying the registry. Used by
    /// `closeAllDiffTabs` and process shutdown.
    pub fn take_all_rejecting_pending(&self) -> Vec<DiffState> {
        let mut entries = self.entries.lock();
        let mut states = Vec::with_capacity(entries.len());
        for (_, mut entry) in entries.drain() {
            if !entry.state.is_resolved() {
                entry.state.status = Status::Rejected;
                if let Some(resumer) = entry.resumer.take() {
                    resumer.resolve(crate::suspension::Resolution::Rejected);
                }
            }
            states.push(entry.state);
        }
        states
    }

    /// Tab names of every diff still pending, for `closeAllDiffTabs`.
    pub fn pending_tab_names(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, entry)| !entry.state.is_resolved())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Read-only snapshot of a diff's current status, for diagnostics.
    pub fn status_of(&self, tab_name: &str) -> Option<Status> {
        self.entries.lock().get(tab_name).map(|e| e.state.status)
    }
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Pending => "pending",
        Status::Saved => "saved",
        Status::Rejected => "rejected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TabId;
    use crate::state::{DiffRequest, Layout, Orientation};
    use crate::suspension::{bridge, Resolution};
    use std::path::PathBuf;

    const SPLIT: Layout = Layout::Split {
        orientation: Orientation::Vertical,
    };

    fn sample_state(tab_name: &str) -> DiffState {
        DiffState {
            request: DiffRequest {
                old_file_path: PathBuf::from("/tmp/a.txt"),
                new_file_path: PathBuf::from("/tmp/a.txt"),
                new_file_contents: "new".to_string(),
                tab_name: tab_name.to_string(),
            },
            status: Status::Pending,
            layout: SPLIT,
            tab_id: TabId(1),
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

    #[test]
    fn register_then_duplicate_fails() {
        let registry = DiffRegistry::new();
        let (_s, r) = bridge();
        registry.register(sample_state("a"), r).unwrap();
        let (_s2, r2) = bridge();
        assert!(matches!(
            registry.register(sample_state("a"), r2),
            Err(DiffError::AlreadyRegistered { .. })
        ));
    }

    #[tokio::test]
    async fn resolve_saved_wakes_suspension_exactly_once() {
        let registry = DiffRegistry::new();
        let (suspension, resumer) = bridge();
        registry.register(sample_state("a"), resumer).unwrap();

        registry.resolve_saved("a", "final".to_string()).unwrap();
        assert!(matches!(
            registry.resolve_saved("a", "again".to_string()),
            Err(DiffError::NotPending { .. })
        ));

        match suspension.wait().await {
            Resolution::Saved(s) => assert_eq!(s, "final"),
            Resolution::Rejected => panic!("expected Saved"),
        }
    }

    #[test]
    fn resolve_missing_tab_is_not_found() {
        let registry = DiffRegistry::new();
        assert!(matches!(
            registry.resolve_rejected("missing"),
            Err(DiffError::NotFound { .. })
        ));
    }

    #[test]
    fn pending_tab_names_excludes_resolved() {
        let registry = DiffRegistry::new();
        let (_s1, r1) = bridge();
        let (_s2, r2) = bridge();
        registry.register(sample_state("a"), r1).unwrap();
        registry.register(sample_state("b"), r2).unwrap();
        registry.resolve_rejected("a").unwrap();
        assert_eq!(registry.pending_tab_names(), vec!["b".to_string()]);
    }

    #[test]
    fn take_removes_entry_and_returns_state() {
        let registry = DiffRegistry::new();
        let (_s, r) = bridge();
        registry.register(sample_state("a"), r).unwrap();
        let state = registry.take("a").unwrap();
        assert_eq!(state.request.tab_name, "a");
        assert!(!registry.contains("a"));
    }

    #[tokio::test]
    async fn force_reject_and_take_wakes_suspension() {
        let registry = DiffRegistry::new();
        let (suspension, resumer) = bridge();
        registry.register(sample_state("a"), resumer).unwrap();
        let state = registry.force_reject_and_take("a").unwrap();
        assert_eq!(state.status, Status::Rejected);
        assert!(matches!(suspension.wait().await, Resolution::Rejected));
        assert!(!registry.contains("a"));
    }

    #[tokio::test]
    async fn take_all_rejecting_pending_wakes_every_suspension() {
        let registry = DiffRegistry::new();
        let (s1, r1) = bridge();
        let (s2, r2) = bridge();
        registry.register(sample_state("a"), r1).unwrap();
        registry.register(sample_state("b"), r2).unwrap();
        let states = registry.take_all_rejecting_pending();
        assert_eq!(states.len(), 2);
        assert!(matches!(s1.wait().await, Resolution::Rejected));
        assert!(matches!(s2.wait().await, Resolution::Rejected));
        assert_eq!(registry.pending_tab_names().len(), 0);
    }
}
