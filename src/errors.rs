//! Error kinds for the diff subsystem.
//!
//! A `#[non_exhaustive]` `thiserror` enum, one variant per named failure
//! mode, each carrying just enough context to explain itself.

use std::path::PathBuf;

use thiserror::Error;

/// Errors `DiffController::open_diff_blocking` and the `closeTab`/
/// `closeAllDiffTabs` handlers can report to the RPC caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiffError {
    /// `old_file_path` is open in the editor with unsaved modifications.
    /// Reported without creating any `DiffState`.
    #[error("{path} is open with unsaved changes")]
    UnsavedChanges {
        /// The file that has unsaved modifications.
        path: PathBuf,
    },

    /// No main editor window exists and one could not be created.
    #[error("no suitable window available to host the diff")]
    NoSuitableWindow,

    /// The editor refused to allocate a buffer.
    #[error("failed to create buffer: {reason}")]
    BufferCreationFailed {
        /// Underlying host error message.
        reason: String,
    },

    /// `open_diff_blocking` was invoked outside a suspendable execution
    /// context. Always a programmer error.
    #[error("internal error: must run inside a suspendable execution context")]
    InternalError,

    /// A step after validation failed; partial state has been rolled
    /// back before this error is returned.
    #[error("failed to set up diff: {cause}")]
    SetupFailed {
        /// The underlying cause, as reported by the failing step.
        cause: String,
    },

    /// The registry was asked to register a `tab_name` that is already
    /// live. Callers must force-reject the existing diff first; this
    /// indicates that step was skipped.
    #[error("diff state for tab {tab_name:?} already registered")]
    AlreadyRegistered {
        /// The tab name that collided.
        tab_name: String,
    },

    /// A registry operation that requires `status = pending` was
    /// invoked on a diff that has already resolved.
    #[error("diff for tab {tab_name:?} is not pending (already {status})")]
    NotPending {
        /// The tab name.
        tab_name: String,
        /// The current status, for diagnostics.
        status: String,
    },

    /// No live diff exists for the given tab name.
    #[error("no diff registered for tab {tab_name:?}")]
    NotFound {
        /// The tab name that was looked up.
        tab_name: String,
    },
}
