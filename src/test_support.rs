//! Test-only `EditorHost` that records every call against a
//! `HeadlessEditorHost`, for integration tests that want to assert on
//! *what was asked of the host*, not just the resulting state.

use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;

use crate::headless::HeadlessEditorHost;
use crate::host::{BufferId, EditorHost, HookCallback, HookId, HostError, TabId, WindowId};
use crate::inline_diff::LineKind;

/// One recorded call, by method name, with its key arguments rendered
/// as strings (good enough for `assert!(log.iter().any(...))` style
/// assertions without templating a variant per method).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// The `EditorHost` method invoked.
    pub method: &'static str,
    /// Its arguments, rendered for comparison.
    pub args: Vec<String>,
}

/// Wraps a `HeadlessEditorHost`, recording every call made through the
/// `EditorHost` trait before delegating to it.
pub struct RecordingEditorHost {
    inner: HeadlessEditorHost,
    calls: Mutex<Vec<Call>>,
}

impl Default for RecordingEditorHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingEditorHost {
    /// Wrap a fresh `HeadlessEditorHost`.
    pub fn new() -> Self {
        Self {
            inner: HeadlessEditorHost::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The wrapped host, for seeding and assertions the recorder
    /// doesn't itself expose.
    pub fn inner(&self) -> &HeadlessEditorHost {
        &self.inner
    }

    /// The calls recorded so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Whether `method` was called at least once.
    pub fn was_called(&self, method: &str) -> bool {
        self.calls.lock().iter().any(|c| c.method == method)
    }

    /// Forward to the wrapped host's write-intercept simulation.
    pub fn fire_write_intercept(&self, buffer: BufferId) {
        self.inner.fire_write_intercept(buffer);
    }

    /// Forward to the wrapped host's close-hook simulation.
    pub fn fire_close_hook(&self, buffer: BufferId) {
        self.inner.fire_close_hook(buffer);
    }

    fn record(&self, method: &'static str, args: Vec<String>) {
        self.calls.lock().push(Call { method, args });
    }
}

impl EditorHost for RecordingEditorHost {
    fn file_exists(&self, path: &Path) -> bool {
        self.record("file_exists", vec![path.display().to_string()]);
        self.inner.file_exists(path)
    }

    fn is_open_with_unsaved_changes(&self, path: &Path) -> bool {
        self.record(
            "is_open_with_unsaved_changes",
            vec![path.display().to_string()],
        );
        self.inner.is_open_with_unsaved_changes(path)
    }

    fn current_tab(&self) -> TabId {
        self.record("current_tab", vec![]);
        self.inner.current_tab()
    }

    fn current_tab_had_assistant_terminal(&self) -> bool {
        self.record("current_tab_had_assistant_terminal", vec![]);
        self.inner.current_tab_had_assistant_terminal()
    }

    fn assistant_terminal_width(&self) -> Option<u16> {
        self.record("assistant_terminal_width", vec![]);
        self.inner.assistant_terminal_width()
    }

    fn create_tab(&self) -> (TabId, TabId) {
        self.record("create_tab", vec![]);
        self.inner.create_tab()
    }

    fn switch_to_tab(&self, tab: TabId) {
        self.record("switch_to_tab", vec![format!("{tab:?}")]);
        self.inner.switch_to_tab(tab);
    }

    fn close_tab(&self, tab: TabId) {
        self.record("close_tab", vec![format!("{tab:?}")]);
        self.inner.close_tab(tab);
    }

    fn reembed_assistant_terminal(&self, tab: TabId, width: Option<u16>) {
        self.record(
            "reembed_assistant_terminal",
            vec![format!("{tab:?}"), format!("{width:?}")],
        );
        self.inner.reembed_assistant_terminal(tab, width);
    }

    fn find_window_showing(&self, path: &Path) -> Option<WindowId> {
        self.record("find_window_showing", vec![path.display().to_string()]);
        self.inner.find_window_showing(path)
    }

    fn current_main_window(&self) -> Option<WindowId> {
        self.record("current_main_window", vec![]);
        self.inner.current_main_window()
    }

    fn split_window(&self, from: WindowId) -> Result<WindowId, HostError> {
        self.record("split_window", vec![format!("{from:?}")]);
        self.inner.split_window(from)
    }

    fn load_file_into_window(
        &self,
        window: WindowId,
        path: &Path,
    ) -> Result<BufferId, HostError> {
        self.record(
            "load_file_into_window",
            vec![format!("{window:?}"), path.display().to_string()],
        );
        self.inner.load_file_into_window(window, path)
    }

    fn read_file_contents(&self, path: &Path) -> Result<String, HostError> {
        self.record("read_file_contents", vec![path.display().to_string()]);
        self.inner.read_file_contents(path)
    }

    fn current_window_empty_scratch_buffer(&self, window: WindowId) -> Option<BufferId> {
        self.record(
            "current_window_empty_scratch_buffer",
            vec![format!("{window:?}")],
        );
        self.inner.current_window_empty_scratch_buffer(window)
    }

    fn create_scratch_buffer(&self, name: &str, contents: &str) -> Result<BufferId, HostError> {
        self.record(
            "create_scratch_buffer",
            vec![name.to_string(), contents.to_string()],
        );
        self.inner.create_scratch_buffer(name, contents)
    }

    fn create_readonly_buffer(&self, name: &str, contents: &str) -> Result<BufferId, HostError> {
        self.record(
            "create_readonly_buffer",
            vec![name.to_string(), contents.to_string()],
        );
        self.inner.create_readonly_buffer(name, contents)
    }

    fn show_buffer_in_window(&self, window: WindowId, buffer: BufferId) {
        self.record(
            "show_buffer_in_window",
            vec![format!("{window:?}"), format!("{buffer:?}")],
        );
        self.inner.show_buffer_in_window(window, buffer);
    }

    fn set_buffer_filetype(&self, buffer: BufferId, filetype: &str) {
        self.record(
            "set_buffer_filetype",
            vec![format!("{buffer:?}"), filetype.to_string()],
        );
        self.inner.set_buffer_filetype(buffer, filetype);
    }

    fn enable_diff_mode(&self, left: BufferId, right: BufferId) {
        self.record(
            "enable_diff_mode",
            vec![format!("{left:?}"), format!("{right:?}")],
        );
        self.inner.enable_diff_mode(left, right);
    }

    fn equalize_window_widths(&self, windows: &[WindowId]) {
        self.record(
            "equalize_window_widths",
            vec![format!("{windows:?}")],
        );
        self.inner.equalize_window_widths(windows);
    }

    fn tag_buffer(&self, buffer: BufferId, tab_name: &str, inline: bool) {
        self.record(
            "tag_buffer",
            vec![format!("{buffer:?}"), tab_name.to_string(), inline.to_string()],
        );
        self.inner.tag_buffer(buffer, tab_name, inline);
    }

    fn install_write_intercept(&self, buffer: BufferId, on_save: HookCallback) -> HookId {
        self.record("install_write_intercept", vec![format!("{buffer:?}")]);
        self.inner.install_write_intercept(buffer, on_save)
    }

    fn install_close_hook(&self, buffer: BufferId, on_close: HookCallback) -> HookId {
        self.record("install_close_hook", vec![format!("{buffer:?}")]);
        self.inner.install_close_hook(buffer, on_close)
    }

    fn detach_hook(&self, hook: HookId) {
        self.record("detach_hook", vec![format!("{hook:?}")]);
        self.inner.detach_hook(hook);
    }

    fn read_buffer_contents(&self, buffer: BufferId) -> String {
        self.record("read_buffer_contents", vec![format!("{buffer:?}")]);
        self.inner.read_buffer_contents(buffer)
    }

    fn buffer_had_trailing_newline_on_load(&self, buffer: BufferId) -> bool {
        self.record(
            "buffer_had_trailing_newline_on_load",
            vec![format!("{buffer:?}")],
        );
        self.inner.buffer_had_trailing_newline_on_load(buffer)
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.record("delete_buffer", vec![format!("{buffer:?}")]);
        self.inner.delete_buffer(buffer);
    }

    fn close_window(&self, window: WindowId) {
        self.record("close_window", vec![format!("{window:?}")]);
        self.inner.close_window(window);
    }

    fn cursor_to_line(&self, window: WindowId, line: usize) {
        self.record("cursor_to_line", vec![format!("{window:?}"), line.to_string()]);
        self.inner.cursor_to_line(window, line);
    }

    fn decorate_inline_line(&self, buffer: BufferId, line: usize, kind: LineKind) {
        self.record(
            "decorate_inline_line",
            vec![format!("{buffer:?}"), line.to_string(), format!("{kind:?}")],
        );
        self.inner.decorate_inline_line(buffer, line, kind);
    }

    fn schedule_reload(&self, path: &Path, delay: Duration) {
        self.record(
            "schedule_reload",
            vec![path.display().to_string(), format!("{delay:?}")],
        );
        self.inner.schedule_reload(path, delay);
    }
}
