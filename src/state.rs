//! Types describing one in-flight or resolved diff.

use std::path::PathBuf;

use crate::host::{BufferId, HookId, TabId, WindowId};

/// Split-window orientation (`diff_opts.layout`: `vertical` or
/// `horizontal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Windows side by side (left/right).
    Vertical,
    /// Windows stacked (top/bottom).
    Horizontal,
}

/// How a diff is rendered. Two editor UIs, one concept -- kept as a
/// tagged variant rather than a runtime string so `LayoutEngine` dispatch
/// is exhaustive at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Two windows: the old content (write-intercepted) on one side, the
    /// new content (read-only) on the other, with the editor's native
    /// diff-mode highlighting enabled between them.
    Split {
        /// Which way the windows are split.
        orientation: Orientation,
    },
    /// A single write-intercepted buffer holding the merged line-by-line
    /// diff, with added/deleted lines decorated in place.
    Inline,
}

impl Layout {
    /// Parse the `diff_opts.layout` string (`"vertical"`, `"horizontal"`,
    /// `"inline"`). Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vertical" => Some(Layout::Split {
                orientation: Orientation::Vertical,
            }),
            "horizontal" => Some(Layout::Split {
                orientation: Orientation::Horizontal,
            }),
            "inline" => Some(Layout::Inline),
            _ => None,
        }
    }
}

/// Resolution state of a diff. Monotonic: Pending -> Saved | Rejected,
/// never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Still showing, waiting on the user.
    Pending,
    /// The user saved (accepted) the diff.
    Saved,
    /// The user closed/rejected the diff without saving.
    Rejected,
}

/// The caller-supplied request to open a diff: `old_file_path`,
/// `new_file_path`, `new_file_contents`, `tab_name`. Layout is not part of
/// the request -- it is resolved from process-wide configuration.
#[derive(Debug, Clone)]
pub struct DiffRequest {
    /// Path to the file being diffed. May not yet exist on disk (a
    /// "new file" diff).
    pub old_file_path: PathBuf,
    /// Path the proposed content would be written to (the wire contract
    /// names it separately from `old_file_path`).
    pub new_file_path: PathBuf,
    /// Proposed replacement content.
    pub new_file_contents: String,
    /// Unique name identifying this diff tab. At most one live diff may
    /// exist per tab name at a time.
    pub tab_name: String,
}

/// Everything the registry tracks about one diff, from creation through
/// resolution.
#[derive(Debug)]
pub struct DiffState {
    /// The request this state was created from.
    pub request: DiffRequest,
    /// Current resolution status.
    pub status: Status,
    /// Layout actually used to render this diff.
    pub layout: Layout,
    /// The tab this diff is shown in.
    pub tab_id: TabId,
    /// Whether `tab_id` was freshly created for this diff (vs. reused).
    pub created_new_tab: bool,
    /// The tab that was current before this diff was opened, to restore
    /// focus to on cleanup.
    pub original_tab_id: Option<TabId>,
    /// Whether the originating tab had a visible assistant terminal.
    pub had_assistant_terminal: bool,
    /// Width of that terminal, if known, for restoration.
    pub assistant_terminal_width: Option<u16>,
    /// Windows created for this diff, to close on cleanup.
    pub windows: Vec<WindowId>,
    /// Buffers created for this diff, to delete on cleanup.
    pub buffers: Vec<BufferId>,
    /// Hooks installed on those buffers, to detach on cleanup.
    pub ui_hook_ids: Vec<HookId>,
    /// Whether the old file existed on disk when the diff was opened.
    pub old_file_existed: bool,
    /// Whether `new_file_contents` ended with a trailing newline.
    pub new_had_trailing_newline: bool,
    /// For a new-file split diff, the window/buffer pair holding the
    /// empty placeholder on the original side, if this diff created
    /// one. `on_new_file_reject` governs whether teardown leaves it in
    /// place or closes it.
    pub placeholder: Option<(WindowId, BufferId)>,
}

impl DiffState {
    /// Whether this diff has resolved (either accepted or rejected).
    pub fn is_resolved(&self) -> bool {
        !matches!(self.status, Status::Pending)
    }
}
