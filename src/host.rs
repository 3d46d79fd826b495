//! The `EditorHost` trait: the complete interface the diff core needs
//! from a host editor.
//!
//! Buffers, windows and tabs are editor primitives this crate never
//! touches directly through a real UI: it defines the seam here and
//! ships `headless::HeadlessEditorHost`, an in-memory model faithful
//! enough to exercise every invariant and scenario this crate cares
//! about.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::inline_diff::LineKind;

/// Callback a host invokes when a previously installed hook fires: the
/// write intercept on save, or the close hook on buffer close. Wired by
/// the caller at install time to resolve the right diff in the
/// registry; the host itself never reaches into the registry.
pub type HookCallback = Arc<dyn Fn() + Send + Sync>;

/// Opaque handle to an editor buffer, scoped to one `EditorHost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// Opaque handle to an editor window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// Opaque handle to an editor tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

/// Opaque handle to an installed UI hook (write intercept or close hook),
/// returned so it can later be detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(pub u64);

/// An error surfaced by the host editor while performing a requested
/// operation (buffer/window creation, file load, ...).
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    /// Construct a `HostError` from any displayable cause.
    pub fn new(cause: impl std::fmt::Display) -> Self {
        Self(cause.to_string())
    }
}

/// Everything `DiffController`/`LayoutEngine`/`UIBinder` need from a host
/// editor. A real binding (Neovim, an IDE, a browser-based editor, ...)
/// implements this against its own UI; this crate is agnostic to which.
pub trait EditorHost {
    /// Whether a file exists at `path` on disk.
    fn file_exists(&self, path: &Path) -> bool;

    /// Whether `path` is currently open in the editor with unsaved
    /// modifications. Opening a diff against such a file is refused,
    /// reported as `DiffError::UnsavedChanges`.
    fn is_open_with_unsaved_changes(&self, path: &Path) -> bool;

    /// The tab that is current right now.
    fn current_tab(&self) -> TabId;

    /// Whether the assistant terminal was visible in the tab that is
    /// current right now (sampled before creating a new tab).
    fn current_tab_had_assistant_terminal(&self) -> bool;

    /// Width of the assistant terminal split, if visible, for later
    /// restoration (`DiffState::assistant_terminal_width`).
    fn assistant_terminal_width(&self) -> Option<u16>;

    /// Create a brand-new editor tab and make it current. Returns the
    /// id of the tab that was current *before* the switch, tracked as
    /// `original_tab_id` so cleanup can restore it.
    fn create_tab(&self) -> (TabId, TabId);

    /// Switch the editor's current tab.
    fn switch_to_tab(&self, tab: TabId);

    /// Close a tab outright (used by cleanup when `created_new_tab`).
    fn close_tab(&self, tab: TabId);

    /// Re-embed the assistant terminal as a side split in `tab`, sized
    /// to `width` if known.
    fn reembed_assistant_terminal(&self, tab: TabId, width: Option<u16>);

    /// Find a window currently showing `path`, if any.
    fn find_window_showing(&self, path: &Path) -> Option<WindowId>;

    /// The current main editor window, skipping terminals, tree
    /// explorers, and floating windows. `None` in pathological UI
    /// states, reported as `NoSuitableWindow`.
    fn current_main_window(&self) -> Option<WindowId>;

    /// Split `from` to create a new window for the original side.
    fn split_window(&self, from: WindowId) -> Result<WindowId, HostError>;

    /// Load `path`'s on-disk content fresh into `window`, returning the
    /// buffer now shown there.
    fn load_file_into_window(&self, window: WindowId, path: &Path)
        -> Result<BufferId, HostError>;

    /// Read `path`'s on-disk content directly, without attaching it to
    /// any window or buffer (used by the inline layout, which only ever
    /// needs the text).
    fn read_file_contents(&self, path: &Path) -> Result<String, HostError>;

    /// If the current window holds an empty, unnamed scratch buffer,
    /// return it (new-file diffs reuse it instead of splitting).
    fn current_window_empty_scratch_buffer(&self, window: WindowId) -> Option<BufferId>;

    /// Create a new in-memory "write-intercepting" scratch buffer named
    /// `name`, populated with `contents`.
    fn create_scratch_buffer(&self, name: &str, contents: &str) -> Result<BufferId, HostError>;

    /// Create a read-only scratch buffer (used by the inline layout).
    fn create_readonly_buffer(&self, name: &str, contents: &str) -> Result<BufferId, HostError>;

    /// Make `buffer` the one displayed in `window`.
    fn show_buffer_in_window(&self, window: WindowId, buffer: BufferId);

    /// Propagate a filetype to `buffer` for syntax highlighting.
    fn set_buffer_filetype(&self, buffer: BufferId, filetype: &str);

    /// Turn on diff-mode rendering between `left` and `right`.
    fn enable_diff_mode(&self, left: BufferId, right: BufferId);

    /// Make every window in `windows` the same width.
    fn equalize_window_widths(&self, windows: &[WindowId]);

    /// Attach the buffer-local back-reference `diff_tab_name` (and
    /// `inline_diff = true` for inline buffers) every diff buffer must
    /// carry so hooks can resolve it in the registry.
    fn tag_buffer(&self, buffer: BufferId, tab_name: &str, inline: bool);

    /// Install a write intercept: saves to `buffer` never hit disk and
    /// instead invoke `on_save`, which the caller uses to resolve the
    /// diff as accepted.
    fn install_write_intercept(&self, buffer: BufferId, on_save: HookCallback) -> HookId;

    /// Install a close/unload/wipeout hook on `buffer` that invokes
    /// `on_close`, which the caller uses to resolve the diff as
    /// rejected.
    fn install_close_hook(&self, buffer: BufferId, on_close: HookCallback) -> HookId;

    /// Detach a previously installed hook. Never fails outwardly: a
    /// stale hook id is swallowed, since errors inside UI hooks must
    /// never propagate back to the editor.
    fn detach_hook(&self, hook: HookId);

    /// Read the current contents of `buffer` (for accept-time content
    /// extraction).
    fn read_buffer_contents(&self, buffer: BufferId) -> String;

    /// Whether `buffer`'s content, when it was first populated, ended
    /// with a trailing newline.
    fn buffer_had_trailing_newline_on_load(&self, buffer: BufferId) -> bool;

    /// Delete a buffer we created.
    fn delete_buffer(&self, buffer: BufferId);

    /// Close a window we created.
    fn close_window(&self, window: WindowId);

    /// Move the cursor in `window` to `line` (0-indexed).
    fn cursor_to_line(&self, window: WindowId, line: usize);

    /// Apply a decoration (background highlight + sign column marker)
    /// to one line of an inline diff buffer. `kind == Unchanged` lines
    /// carry no decoration and this is not called for them.
    fn decorate_inline_line(&self, buffer: BufferId, line: usize, kind: LineKind);

    /// Schedule a reload of any open buffers for `path` after `delay`,
    /// so an external save a tab close triggers is picked up once it
    /// has actually landed on disk.
    fn schedule_reload(&self, path: &Path, delay: Duration);
}
