//! An in-memory, no-UI `EditorHost`, sufficient to drive the diff core
//! through every invariant and scenario without a real editor attached.
//!
//! A `parking_lot::Mutex` around a plain struct, with monotonic id
//! counters standing in for whatever the real host hands out.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::host::{BufferId, EditorHost, HookCallback, HookId, HostError, TabId, WindowId};
use crate::inline_diff::LineKind;

#[derive(Clone, Copy, PartialEq, Eq)]
enum HookKind {
    WriteIntercept,
    Close,
}

struct InstalledHook {
    buffer: BufferId,
    kind: HookKind,
    callback: HookCallback,
}

#[derive(Debug, Clone)]
struct Buffer {
    name: String,
    contents: String,
    filetype: String,
    had_trailing_newline_on_load: bool,
    tab_name: Option<String>,
    inline: bool,
    decorations: Vec<(usize, LineKind)>,
}

#[derive(Debug, Default)]
struct Tab {
    has_assistant_terminal: bool,
    assistant_terminal_width: Option<u16>,
}

#[derive(Default)]
struct Inner {
    buffers: HashMap<BufferId, Buffer>,
    windows: HashMap<WindowId, Option<BufferId>>,
    tabs: HashMap<TabId, Tab>,
    hooks: HashMap<HookId, InstalledHook>,
    on_disk: HashMap<PathBuf, String>,
    open_unsaved: HashMap<PathBuf, bool>,
    current_tab: Option<TabId>,
    current_window: Option<WindowId>,
    scheduled_reloads: Vec<(PathBuf, Duration)>,
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A fully in-memory `EditorHost`. Tests seed it with
/// [`HeadlessEditorHost::seed_file`] and
/// [`HeadlessEditorHost::seed_open_unsaved`] before exercising
/// `DiffController`.
pub struct HeadlessEditorHost {
    inner: Mutex<Inner>,
}

impl Default for HeadlessEditorHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEditorHost {
    /// Create a host with one window in one tab, both current.
    pub fn new() -> Self {
        let mut inner = Inner::default();
        let tab = TabId(next_id());
        let window = WindowId(next_id());
        inner.tabs.insert(tab, Tab::default());
        inner.windows.insert(window, None);
        inner.current_tab = Some(tab);
        inner.current_window = Some(window);
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Seed on-disk content for `path`, as if it already existed.
    pub fn seed_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.inner.lock().on_disk.insert(path.into(), contents.into());
    }

    /// Mark `path` as currently open with unsaved changes.
    pub fn seed_open_unsaved(&self, path: impl Into<PathBuf>) {
        self.inner.lock().open_unsaved.insert(path.into(), true);
    }

    /// Mark the tab that is current right now as showing the assistant
    /// terminal, at the given width.
    pub fn seed_assistant_terminal(&self, width: u16) {
        let mut inner = self.inner.lock();
        let tab = inner.current_tab.expect("host always has a current tab");
        let entry = inner.tabs.entry(tab).or_default();
        entry.has_assistant_terminal = true;
        entry.assistant_terminal_width = Some(width);
    }

    /// Current content of `path` on disk, for test assertions.
    pub fn disk_contents(&self, path: &Path) -> Option<String> {
        self.inner.lock().on_disk.get(path).cloned()
    }

    /// Read back a buffer's assigned tab tag, for test assertions.
    pub fn buffer_tab_tag(&self, buffer: BufferId) -> Option<(String, bool)> {
        self.inner
            .lock()
            .buffers
            .get(&buffer)
            .and_then(|b| b.tab_name.clone().map(|t| (t, b.inline)))
    }

    /// Number of buffers currently tracked, for leak-detection asserts.
    pub fn buffer_count(&self) -> usize {
        self.inner.lock().buffers.len()
    }

    /// Number of windows currently tracked, for leak-detection asserts.
    pub fn window_count(&self) -> usize {
        self.inner.lock().windows.len()
    }

    /// Scheduled-reload calls recorded so far, for test assertions.
    pub fn scheduled_reloads(&self) -> Vec<(PathBuf, Duration)> {
        self.inner.lock().scheduled_reloads.clone()
    }

    /// Decorations applied to a buffer's lines, for test assertions.
    pub fn decorations_of(&self, buffer: BufferId) -> Vec<(usize, LineKind)> {
        self.inner
            .lock()
            .buffers
            .get(&buffer)
            .map(|b| b.decorations.clone())
            .unwrap_or_default()
    }

    /// Directly write `contents` into `buffer`, simulating user edits.
    pub fn write_buffer(&self, buffer: BufferId, contents: impl Into<String>) {
        if let Some(b) = self.inner.lock().buffers.get_mut(&buffer) {
            b.contents = contents.into();
        }
    }

    /// Find the buffer tagged with `tab_name` via `tag_buffer`, for
    /// tests and demos that need to fire its write intercept or close
    /// hook directly.
    pub fn buffer_for_tab_name(&self, tab_name: &str) -> Option<BufferId> {
        self.inner
            .lock()
            .buffers
            .iter()
            .find(|(_, b)| b.tab_name.as_deref() == Some(tab_name))
            .map(|(id, _)| *id)
    }

    /// Simulate the editor firing the write intercept installed on
    /// `buffer`, as if the user had just saved it.
    pub fn fire_write_intercept(&self, buffer: BufferId) {
        self.fire_hook(buffer, HookKind::WriteIntercept);
    }

    /// Simulate the editor firing the close hook installed on `buffer`,
    /// as if the user had just closed it without saving.
    pub fn fire_close_hook(&self, buffer: BufferId) {
        self.fire_hook(buffer, HookKind::Close);
    }

    fn fire_hook(&self, buffer: BufferId, kind: HookKind) {
        let callback = {
            let inner = self.inner.lock();
            inner
                .hooks
                .values()
                .find(|h| h.buffer == buffer && h.kind == kind)
                .map(|h| h.callback.clone())
        };
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl EditorHost for HeadlessEditorHost {
    fn file_exists(&self, path: &Path) -> bool {
        self.inner.lock().on_disk.contains_key(path)
    }

    fn is_open_with_unsaved_changes(&self, path: &Path) -> bool {
        self.inner
            .lock()
            .open_unsaved
            .get(path)
            .copied()
            .unwrap_or(false)
    }

    fn current_tab(&self) -> TabId {
        self.inner.lock().current_tab.expect("host always has a current tab")
    }

    fn current_tab_had_assistant_terminal(&self) -> bool {
        let inner = self.inner.lock();
        inner
            .current_tab
            .and_then(|t| inner.tabs.get(&t))
            .map(|t| t.has_assistant_terminal)
            .unwrap_or(false)
    }

    fn assistant_terminal_width(&self) -> Option<u16> {
        let inner = self.inner.lock();
        inner
            .current_tab
            .and_then(|t| inner.tabs.get(&t))
            .and_then(|t| t.assistant_terminal_width)
    }

    fn create_tab(&self) -> (TabId, TabId) {
        let mut inner = self.inner.lock();
        let original = inner.current_tab.expect("host always has a current tab");
        let new_tab = TabId(next_id());
        inner.tabs.insert(new_tab, Tab::default());
        inner.current_tab = Some(new_tab);
        let window = WindowId(next_id());
        inner.windows.insert(window, None);
        inner.current_window = Some(window);
        (new_tab, original)
    }

    fn switch_to_tab(&self, tab: TabId) {
        self.inner.lock().current_tab = Some(tab);
    }

    fn close_tab(&self, tab: TabId) {
        self.inner.lock().tabs.remove(&tab);
    }

    fn reembed_assistant_terminal(&self, tab: TabId, width: Option<u16>) {
        let mut inner = self.inner.lock();
        let entry = inner.tabs.entry(tab).or_default();
        entry.has_assistant_terminal = true;
        entry.assistant_terminal_width = width;
    }

    fn find_window_showing(&self, path: &Path) -> Option<WindowId> {
        let inner = self.inner.lock();
        let name = path.to_string_lossy().into_owned();
        inner.windows.iter().find_map(|(win, buf)| {
            let buf = (*buf)?;
            let b = inner.buffers.get(&buf)?;
            (b.name == name).then_some(*win)
        })
    }

    fn current_main_window(&self) -> Option<WindowId> {
        self.inner.lock().current_window
    }

    fn split_window(&self, _from: WindowId) -> Result<WindowId, HostError> {
        let window = WindowId(next_id());
        self.inner.lock().windows.insert(window, None);
        Ok(window)
    }

    fn load_file_into_window(
        &self,
        window: WindowId,
        path: &Path,
    ) -> Result<BufferId, HostError> {
        let mut inner = self.inner.lock();
        let contents = inner.on_disk.get(path).cloned().ok_or_else(|| {
            HostError::new(format!("no such file: {}", path.display()))
        })?;
        let trailing = contents.ends_with('\n');
        let buffer = BufferId(next_id());
        inner.buffers.insert(
            buffer,
            Buffer {
                name: path.to_string_lossy().into_owned(),
                contents,
                filetype: "text".to_string(),
                had_trailing_newline_on_load: trailing,
                tab_name: None,
                inline: false,
                decorations: Vec::new(),
            },
        );
        inner.windows.insert(window, Some(buffer));
        Ok(buffer)
    }

    fn read_file_contents(&self, path: &Path) -> Result<String, HostError> {
        self.inner
            .lock()
            .on_disk
            .get(path)
            .cloned()
            .ok_or_else(|| HostError::new(format!("no such file: {}", path.display())))
    }

    fn current_window_empty_scratch_buffer(&self, window: WindowId) -> Option<BufferId> {
        let inner = self.inner.lock();
        let buf_id = (*inner.windows.get(&window)?)?;
        let buf = inner.buffers.get(&buf_id)?;
        (buf.contents.is_empty() && buf.tab_name.is_none()).then_some(buf_id)
    }

    fn create_scratch_buffer(&self, name: &str, contents: &str) -> Result<BufferId, HostError> {
        let buffer = BufferId(next_id());
        self.inner.lock().buffers.insert(
            buffer,
            Buffer {
                name: name.to_string(),
                contents: contents.to_string(),
                filetype: "text".to_string(),
                had_trailing_newline_on_load: contents.ends_with('\n'),
                tab_name: None,
                inline: false,
                decorations: Vec::new(),
            },
        );
        Ok(buffer)
    }

    fn create_readonly_buffer(&self, name: &str, contents: &str) -> Result<BufferId, HostError> {
        self.create_scratch_buffer(name, contents)
    }

    fn show_buffer_in_window(&self, window: WindowId, buffer: BufferId) {
        self.inner.lock().windows.insert(window, Some(buffer));
    }

    fn set_buffer_filetype(&self, buffer: BufferId, filetype: &str) {
        if let Some(b) = self.inner.lock().buffers.get_mut(&buffer) {
            b.filetype = filetype.to_string();
        }
    }

    fn enable_diff_mode(&self, _left: BufferId, _right: BufferId) {}

    fn equalize_window_widths(&self, _windows: &[WindowId]) {}

    fn tag_buffer(&self, buffer: BufferId, tab_name: &str, inline: bool) {
        if let Some(b) = self.inner.lock().buffers.get_mut(&buffer) {
            b.tab_name = Some(tab_name.to_string());
            b.inline = inline;
        }
    }

    fn install_write_intercept(&self, buffer: BufferId, on_save: HookCallback) -> HookId {
        let hook = HookId(next_id());
        self.inner.lock().hooks.insert(
            hook,
            InstalledHook {
                buffer,
                kind: HookKind::WriteIntercept,
                callback: on_save,
            },
        );
        hook
    }

    fn install_close_hook(&self, buffer: BufferId, on_close: HookCallback) -> HookId {
        let hook = HookId(next_id());
        self.inner.lock().hooks.insert(
            hook,
            InstalledHook {
                buffer,
                kind: HookKind::Close,
                callback: on_close,
            },
        );
        hook
    }

    fn detach_hook(&self, hook: HookId) {
        self.inner.lock().hooks.remove(&hook);
    }

    fn read_buffer_contents(&self, buffer: BufferId) -> String {
        self.inner
            .lock()
            .buffers
            .get(&buffer)
            .map(|b| b.contents.clone())
            .unwrap_or_default()
    }

    fn buffer_had_trailing_newline_on_load(&self, buffer: BufferId) -> bool {
        self.inner
            .lock()
            .buffers
            .get(&buffer)
            .map(|b| b.had_trailing_newline_on_load)
            .unwrap_or(false)
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.inner.lock().buffers.remove(&buffer);
    }

    fn close_window(&self, window: WindowId) {
        self.inner.lock().windows.remove(&window);
    }

    fn cursor_to_line(&self, _window: WindowId, _line: usize) {}

    fn decorate_inline_line(&self, buffer: BufferId, line: usize, kind: LineKind) {
        if let Some(b) = self.inner.lock().buffers.get_mut(&buffer) {
            b.decorations.push((line, kind));
        }
    }

    fn schedule_reload(&self, path: &Path, delay: Duration) {
        self.inner
            .lock()
            .scheduled_reloads
            .push((path.to_path_buf(), delay));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn loads_seeded_file_into_window() {
        let host = HeadlessEditorHost::new();
        host.seed_file("/tmp/a.txt", "hello\n");
        let window = host.current_main_window().unwrap();
        let buffer = host.load_file_into_window(window, Path::new("/tmp/a.txt")).unwrap();
        assert_eq!(host.read_buffer_contents(buffer), "hello\n");
        assert!(host.buffer_had_trailing_newline_on_load(buffer));
    }

    #[test]
    fn create_tab_tracks_original() {
        let host = HeadlessEditorHost::new();
        let original = host.current_main_window().is_some();
        assert!(original);
        let (_new_tab, original_tab) = host.create_tab();
        assert!(host.inner.lock().tabs.contains_key(&original_tab));
    }

    #[test]
    fn write_intercept_hook_is_tracked_and_detachable() {
        let host = HeadlessEditorHost::new();
        let buffer = host.create_scratch_buffer("scratch", "x").unwrap();
        let hook = host.install_write_intercept(buffer, Arc::new(|| {}));
        assert!(host.inner.lock().hooks.contains_key(&hook));
        host.detach_hook(hook);
        assert!(!host.inner.lock().hooks.contains_key(&hook));
    }

    #[test]
    fn firing_write_intercept_invokes_its_callback() {
        let host = HeadlessEditorHost::new();
        let buffer = host.create_scratch_buffer("scratch", "x").unwrap();
        let fired = Arc::new(AtomicBool::new(false));
        let fired_from_callback = fired.clone();
        host.install_write_intercept(
            buffer,
            Arc::new(move || fired_from_callback.store(true, Ordering::Relaxed)),
        );
        host.fire_write_intercept(buffer);
        assert!(fired.load(Ordering::Relaxed));
    }

    #[test]
    fn firing_close_hook_does_not_invoke_the_write_intercept() {
        let host = HeadlessEditorHost::new();
        let buffer = host.create_scratch_buffer("scratch", "x").unwrap();
        let fired = Arc::new(AtomicBool::new(false));
        let fired_from_callback = fired.clone();
        host.install_write_intercept(
            buffer,
            Arc::new(move || fired_from_callback.store(true, Ordering::Relaxed)),
        );
        host.fire_close_hook(buffer);
        assert!(!fired.load(Ordering::Relaxed));
    }
}
