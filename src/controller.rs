//! `DiffController` -- the orchestration entry point for one diff request,
//! plus the `closeTab` / `closeAllDiffTabs` surface built on top of it.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{DiffOpts, OnNewFileReject};
use crate::errors::DiffError;
use crate::filetype;
use crate::host::{BufferId, EditorHost, HookCallback, HookId, HostError, TabId, WindowId};
use crate::inline_diff;
use crate::proto::ToolReply;
use crate::registry::DiffRegistry;
use crate::state::{DiffRequest, DiffState, Layout, Orientation, Status};
use crate::suspension::{bridge, Resolution};

fn setup_failed(err: HostError) -> DiffError {
    DiffError::SetupFailed { cause: err.0 }
}

fn buffer_creation_failed(err: HostError) -> DiffError {
    DiffError::BufferCreationFailed { reason: err.0 }
}

/// Windows, buffers and hooks created so far while building a diff's UI,
/// torn down on error before it propagates.
#[derive(Default)]
struct PartialBuild {
    windows: Vec<WindowId>,
    buffers: Vec<BufferId>,
    hooks: Vec<HookId>,
    created_new_tab: bool,
    tab_id: Option<TabId>,
}

/// What tab placement produced.
struct TabPlacement {
    created_new_tab: bool,
    tab_id: TabId,
    original_tab_id: Option<TabId>,
    had_assistant_terminal: bool,
    assistant_terminal_width: Option<u16>,
}

/// Orchestrates diff requests against one `EditorHost` and `DiffRegistry`.
pub struct DiffController<H: EditorHost> {
    host: Arc<H>,
    registry: Arc<DiffRegistry>,
    config: DiffOpts,
}

impl<H: EditorHost + Send + Sync + 'static> DiffController<H> {
    /// Build a controller over a host, registry and static diff config.
    pub fn new(host: Arc<H>, registry: Arc<DiffRegistry>, config: DiffOpts) -> Self {
        Self {
            host,
            registry,
            config,
        }
    }

    /// Entry point for `openDiff`. Must run inside a suspendable
    /// execution context -- running outside one (no Tokio runtime bound
    /// to the current thread) is a programmer error.
    pub async fn open_diff_blocking(&self, request: DiffRequest) -> Result<ToolReply, DiffError> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(DiffError::InternalError);
        }

        // Step 1: replacement.
        if let Some(previous) = self.registry.force_reject_and_take(&request.tab_name) {
            self.teardown(previous);
        }

        // Step 2: precondition check.
        let old_file_existed = self.host.file_exists(&request.old_file_path);
        if old_file_existed && self.host.is_open_with_unsaved_changes(&request.old_file_path) {
            return Err(DiffError::UnsavedChanges {
                path: request.old_file_path.clone(),
            });
        }

        // Step 3: layout selection.
        match self.config.layout() {
            Layout::Inline => self.open_inline(request, old_file_existed),
            Layout::Split { orientation } => self.open_split(request, old_file_existed, orientation),
        }
        .await
    }

    fn place_tab(&self, build: &mut PartialBuild) -> TabPlacement {
        let had_assistant_terminal = self.host.current_tab_had_assistant_terminal();
        let assistant_terminal_width = self.host.assistant_terminal_width();

        if self.config.open_in_new_tab {
            let (new_tab, original_tab) = self.host.create_tab();
            if had_assistant_terminal && !self.config.hide_terminal_in_new_tab {
                self.host
                    .reembed_assistant_terminal(new_tab, assistant_terminal_width);
            }
            build.created_new_tab = true;
            build.tab_id = Some(new_tab);
            TabPlacement {
                created_new_tab: true,
                tab_id: new_tab,
                original_tab_id: Some(original_tab),
                had_assistant_terminal,
                assistant_terminal_width,
            }
        } else {
            let tab_id = self.host.current_tab();
            build.tab_id = Some(tab_id);
            TabPlacement {
                created_new_tab: false,
                tab_id,
                original_tab_id: None,
                had_assistant_terminal,
                assistant_terminal_width,
            }
        }
    }

    /// Return focus to the assistant terminal's tab if `keep_terminal_focus`
    /// is set and one was visible before this diff was opened.
    fn restore_terminal_focus(&self, placement: &TabPlacement) {
        if self.config.keep_terminal_focus && placement.had_assistant_terminal {
            if let Some(original) = placement.original_tab_id {
                self.host.switch_to_tab(original);
            }
        }
    }

    async fn open_split(
        &self,
        request: DiffRequest,
        old_file_existed: bool,
        orientation: Orientation,
    ) -> Result<ToolReply, DiffError> {
        let is_new_file = !old_file_existed;
        let mut build = PartialBuild::default();
        let placement = self.place_tab(&mut build);

        let built = self.build_split_ui(&request, is_new_file, placement.created_new_tab, &mut build);
        let (original_window, proposed_window, original_buffer, proposed_buffer, original_buffer_created_by_us) =
            match built {
                Ok(v) => v,
                Err(e) => {
                    self.rollback(&build);
                    return Err(e);
                }
            };

        self.host.tag_buffer(proposed_buffer, &request.tab_name, false);

        let placeholder = original_buffer_created_by_us.then_some((original_window, original_buffer));

        let registry_for_save = self.registry.clone();
        let host_for_save = self.host.clone();
        let tab_name_for_save = request.tab_name.clone();
        let on_save: HookCallback = Arc::new(move || {
            let contents = host_for_save.read_buffer_contents(proposed_buffer);
            let _ = registry_for_save.resolve_saved(&tab_name_for_save, contents);
        });
        let write_hook = self.host.install_write_intercept(proposed_buffer, on_save);

        let registry_for_close = self.registry.clone();
        let host_for_close = self.host.clone();
        let tab_name_for_close = request.tab_name.clone();
        let on_new_file_reject = self.config.on_new_file_reject;
        let on_close: HookCallback = Arc::new(move || {
            let _ = registry_for_close.resolve_rejected(&tab_name_for_close);
            if let (Some((window, _buffer)), OnNewFileReject::CloseWindow) = (placeholder, on_new_file_reject) {
                host_for_close.close_window(window);
            }
        });
        let close_hook = self.host.install_close_hook(proposed_buffer, on_close);

        build.hooks.push(write_hook);
        build.hooks.push(close_hook);

        self.restore_terminal_focus(&placement);

        let new_had_trailing_newline = request.new_file_contents.ends_with('\n');
        let mut buffers = vec![proposed_buffer];
        if original_buffer_created_by_us {
            buffers.push(original_buffer);
        }

        let state = DiffState {
            request: request.clone(),
            status: Status::Pending,
            layout: Layout::Split { orientation },
            tab_id: placement.tab_id,
            created_new_tab: placement.created_new_tab,
            original_tab_id: placement.original_tab_id,
            had_assistant_terminal: placement.had_assistant_terminal,
            assistant_terminal_width: placement.assistant_terminal_width,
            windows: vec![original_window, proposed_window],
            buffers,
            ui_hook_ids: vec![write_hook, close_hook],
            old_file_existed,
            new_had_trailing_newline,
            placeholder,
        };

        self.finish_registration(request.tab_name, state, build).await
    }

    fn build_split_ui(
        &self,
        request: &DiffRequest,
        is_new_file: bool,
        created_new_tab: bool,
        build: &mut PartialBuild,
    ) -> Result<(WindowId, WindowId, BufferId, BufferId, bool), DiffError> {
        let reuse_window = if created_new_tab {
            None
        } else {
            self.host.find_window_showing(&request.old_file_path)
        };

        let original_window = match reuse_window {
            Some(w) => w,
            None => self
                .host
                .current_main_window()
                .ok_or(DiffError::NoSuitableWindow)?,
        };

        let mut original_buffer_created_by_us = false;
        let original_buffer = if is_new_file {
            match self.host.current_window_empty_scratch_buffer(original_window) {
                Some(existing) => existing,
                None => {
                    let placeholder = self
                        .host
                        .create_scratch_buffer("(NEW FILE)", "")
                        .map_err(buffer_creation_failed)?;
                    self.host.show_buffer_in_window(original_window, placeholder);
                    original_buffer_created_by_us = true;
                    build.buffers.push(placeholder);
                    placeholder
                }
            }
        } else {
            self.host
                .load_file_into_window(original_window, &request.old_file_path)
                .map_err(setup_failed)?
        };

        let proposed_window = self
            .host
            .split_window(original_window)
            .map_err(setup_failed)?;
        build.windows.push(proposed_window);

        let proposed_name = if is_new_file {
            format!("{} (NEW FILE - proposed)", request.tab_name)
        } else {
            format!("{} (proposed)", request.tab_name)
        };
        let proposed_buffer = self
            .host
            .create_scratch_buffer(&proposed_name, &request.new_file_contents)
            .map_err(buffer_creation_failed)?;
        build.buffers.push(proposed_buffer);
        self.host.show_buffer_in_window(proposed_window, proposed_buffer);

        let filetype = filetype::detect(&request.old_file_path);
        self.host.set_buffer_filetype(original_buffer, filetype);
        self.host.set_buffer_filetype(proposed_buffer, filetype);
        self.host.enable_diff_mode(original_buffer, proposed_buffer);
        if self.config.equalize_windows {
            self.host
                .equalize_window_widths(&[original_window, proposed_window]);
        }

        Ok((
            original_window,
            proposed_window,
            original_buffer,
            proposed_buffer,
            original_buffer_created_by_us,
        ))
    }

    async fn open_inline(
        &self,
        request: DiffRequest,
        old_file_existed: bool,
    ) -> Result<ToolReply, DiffError> {
        let is_new_file = !old_file_existed;
        let mut build = PartialBuild::default();
        let placement = self.place_tab(&mut build);

        let built = self.build_inline_ui(&request, is_new_file, &mut build);
        let (window, buffer, diff) = match built {
            Ok(v) => v,
            Err(e) => {
                self.rollback(&build);
                return Err(e);
            }
        };

        self.host.tag_buffer(buffer, &request.tab_name, true);

        let new_had_trailing_newline = request.new_file_contents.ends_with('\n');
        let accepted_content = inline_diff::extract_accepted_content(&diff, new_had_trailing_newline);

        let registry_for_save = self.registry.clone();
        let tab_name_for_save = request.tab_name.clone();
        let on_save: HookCallback = Arc::new(move || {
            let _ = registry_for_save.resolve_saved(&tab_name_for_save, accepted_content.clone());
        });
        let write_hook = self.host.install_write_intercept(buffer, on_save);

        let registry_for_close = self.registry.clone();
        let tab_name_for_close = request.tab_name.clone();
        let on_close: HookCallback = Arc::new(move || {
            let _ = registry_for_close.resolve_rejected(&tab_name_for_close);
        });
        let close_hook = self.host.install_close_hook(buffer, on_close);

        build.hooks.push(write_hook);
        build.hooks.push(close_hook);

        self.restore_terminal_focus(&placement);

        let state = DiffState {
            request: request.clone(),
            status: Status::Pending,
            layout: Layout::Inline,
            tab_id: placement.tab_id,
            created_new_tab: placement.created_new_tab,
            original_tab_id: placement.original_tab_id,
            had_assistant_terminal: placement.had_assistant_terminal,
            assistant_terminal_width: placement.assistant_terminal_width,
            windows: vec![window],
            buffers: vec![buffer],
            ui_hook_ids: vec![write_hook, close_hook],
            old_file_existed,
            new_had_trailing_newline,
            placeholder: None,
        };

        self.finish_registration(request.tab_name, state, build).await
    }

    fn build_inline_ui(
        &self,
        request: &DiffRequest,
        is_new_file: bool,
        build: &mut PartialBuild,
    ) -> Result<(WindowId, BufferId, inline_diff::InlineDiff), DiffError> {
        let old_contents = if is_new_file {
            String::new()
        } else {
            self.host
                .read_file_contents(&request.old_file_path)
                .map_err(setup_failed)?
        };

        let diff = inline_diff::compute(&old_contents, &request.new_file_contents);

        let window = self
            .host
            .current_main_window()
            .ok_or(DiffError::NoSuitableWindow)?;
        build.windows.push(window);

        let name = format!("{} (inline diff)", request.tab_name);
        let rendered = render_inline_text(&diff);
        let buffer = self
            .host
            .create_readonly_buffer(&name, &rendered)
            .map_err(buffer_creation_failed)?;
        build.buffers.push(buffer);
        self.host.show_buffer_in_window(window, buffer);

        let filetype = filetype::detect(&request.old_file_path);
        self.host.set_buffer_filetype(buffer, filetype);

        for (i, kind) in diff.kinds.iter().enumerate() {
            if *kind != inline_diff::LineKind::Unchanged {
                self.host.decorate_inline_line(buffer, i, *kind);
            }
        }

        if let Some(row) = diff.first_changed_row() {
            self.host.cursor_to_line(window, row);
        }

        Ok((window, buffer, diff))
    }

    async fn finish_registration(
        &self,
        tab_name: String,
        state: DiffState,
        build: PartialBuild,
    ) -> Result<ToolReply, DiffError> {
        let (suspension, resumer) = bridge();
        if let Err(e) = self.registry.register(state, resumer) {
            self.rollback(&build);
            return Err(e);
        }

        match suspension.wait().await {
            Resolution::Saved(contents) => Ok(ToolReply::file_saved(contents)),
            Resolution::Rejected => Ok(ToolReply::diff_rejected(tab_name)),
        }
    }

    /// `closeTab(tab_name)`. If still pending, reject first. If it was
    /// saved, schedule a delayed buffer reload before tearing down.
    pub fn close_tab(&self, tab_name: &str) -> Result<ToolReply, DiffError> {
        let state = match self.registry.status_of(tab_name) {
            None => {
                return Err(DiffError::NotFound {
                    tab_name: tab_name.to_string(),
                })
            }
            Some(Status::Pending) => self
                .registry
                .force_reject_and_take(tab_name)
                .expect("just observed it present"),
            Some(_) => self
                .registry
                .take(tab_name)
                .expect("just observed it present"),
        };

        if matches!(state.status, Status::Saved) {
            self.host.schedule_reload(
                &state.request.old_file_path,
                Duration::from_millis(self.config.reload_delay_ms),
            );
        }

        self.teardown(state);
        Ok(ToolReply::tab_closed())
    }

    /// `closeAllDiffTabs()`: reject every pending diff, tear all of them
    /// down, report how many were closed.
    pub fn close_all_diff_tabs(&self) -> ToolReply {
        let states = self.registry.take_all_rejecting_pending();
        let count = states.len();
        for state in states {
            if matches!(state.status, Status::Saved) {
                self.host.schedule_reload(
                    &state.request.old_file_path,
                    Duration::from_millis(self.config.reload_delay_ms),
                );
            }
            self.teardown(state);
        }
        ToolReply::closed_n_diff_tabs(count)
    }

    /// Process-shutdown hook: force-reject and tear down every live diff.
    pub fn shutdown(&self) {
        for state in self.registry.take_all_rejecting_pending() {
            self.teardown(state);
        }
    }

    fn teardown(&self, state: DiffState) {
        let keep_placeholder = matches!(state.status, Status::Rejected)
            && self.config.on_new_file_reject == OnNewFileReject::KeepEmpty
            && state.placeholder.is_some();

        for hook in state.ui_hook_ids {
            self.host.detach_hook(hook);
        }

        let (skip_window, skip_buffer) = if keep_placeholder {
            let (window, buffer) = state.placeholder.expect("just checked is_some");
            (Some(window), Some(buffer))
        } else {
            (None, None)
        };

        for buffer in state.buffers {
            if Some(buffer) != skip_buffer {
                self.host.delete_buffer(buffer);
            }
        }
        for window in state.windows {
            if Some(window) != skip_window {
                self.host.close_window(window);
            }
        }
        if state.created_new_tab {
            if let Some(original) = state.original_tab_id {
                self.host.switch_to_tab(original);
                self.host
                    .reembed_assistant_terminal(original, state.assistant_terminal_width);
            }
            self.host.close_tab(state.tab_id);
        }
    }

    fn rollback(&self, build: &PartialBuild) {
        for &hook in &build.hooks {
            self.host.detach_hook(hook);
        }
        for &buffer in &build.buffers {
            self.host.delete_buffer(buffer);
        }
        for &window in &build.windows {
            self.host.close_window(window);
        }
        if build.created_new_tab {
            if let Some(tab) = build.tab_id {
                self.host.close_tab(tab);
            }
        }
    }
}

/// Render the interleaved (unchanged/added/deleted) line set as the text
/// an inline-diff buffer should show.
fn render_inline_text(diff: &inline_diff::InlineDiff) -> String {
    let mut out = diff.lines.join("\n");
    if !diff.lines.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::headless::HeadlessEditorHost;

    fn controller(config: DiffOpts) -> DiffController<HeadlessEditorHost> {
        DiffController::new(
            Arc::new(HeadlessEditorHost::new()),
            Arc::new(DiffRegistry::new()),
            config,
        )
    }

    fn request(tab_name: &str, path: &str, contents: &str) -> DiffRequest {
        DiffRequest {
            old_file_path: path.into(),
            new_file_path: path.into(),
            new_file_contents: contents.to_string(),
            tab_name: tab_name.to_string(),
        }
    }

    #[tokio::test]
    async fn accept_scenario_returns_final_content() {
        let host = Arc::new(HeadlessEditorHost::new());
        let registry = Arc::new(DiffRegistry::new());
        host.seed_file("/t/a.txt", "one\ntwo\n");
        let controller = DiffController::new(host.clone(), registry.clone(), Config::default().diff_opts);
        let req = request("tab1", "/t/a.txt", "one\ntwo_x\n");

        let resolve = async {
            while !registry.contains("tab1") {
                tokio::task::yield_now().await;
            }
            let buffer = host.buffer_for_tab_name("tab1").unwrap();
            host.fire_write_intercept(buffer);
        };

        let (reply, _) = tokio::join!(controller.open_diff_blocking(req), resolve);
        let reply = reply.unwrap();
        assert_eq!(reply.content[0].text, "FILE_SAVED");
        assert_eq!(reply.content[1].text, "one\ntwo_x\n");
    }

    #[tokio::test]
    async fn reject_scenario_returns_tab_name() {
        let host = Arc::new(HeadlessEditorHost::new());
        let registry = Arc::new(DiffRegistry::new());
        host.seed_file("/t/a.txt", "one\ntwo\n");
        let controller = DiffController::new(host.clone(), registry.clone(), Config::default().diff_opts);
        let req = request("tab1", "/t/a.txt", "one\ntwo_x\n");

        let resolve = async {
            while !registry.contains("tab1") {
                tokio::task::yield_now().await;
            }
            let buffer = host.buffer_for_tab_name("tab1").unwrap();
            host.fire_close_hook(buffer);
        };

        let (reply, _) = tokio::join!(controller.open_diff_blocking(req), resolve);
        let reply = reply.unwrap();
        assert_eq!(reply.content[0].text, "DIFF_REJECTED");
        assert_eq!(reply.content[1].text, "tab1");
    }

    #[tokio::test]
    async fn replacement_rejects_the_first_caller() {
        let host = Arc::new(HeadlessEditorHost::new());
        let registry = Arc::new(DiffRegistry::new());
        host.seed_file("/t/a.txt", "one\n");
        let controller = Arc::new(DiffController::new(
            host.clone(),
            registry.clone(),
            Config::default().diff_opts,
        ));

        let first = {
            let controller = controller.clone();
            let req = request("dup", "/t/a.txt", "first\n");
            tokio::spawn(async move { controller.open_diff_blocking(req).await })
        };

        let second_req = request("dup", "/t/a.txt", "second\n");
        let resolve_second = async {
            while registry.pending_tab_names().is_empty() {
                tokio::task::yield_now().await;
            }
            let buffer = host.buffer_for_tab_name("dup").unwrap();
            host.fire_write_intercept(buffer);
        };

        // Give the first request time to register before the second
        // replaces it.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        let (second_reply, _) = tokio::join!(controller.open_diff_blocking(second_req), resolve_second);
        let first_reply = first.await.unwrap().unwrap();

        assert_eq!(first_reply.content[0].text, "DIFF_REJECTED");
        let second_reply = second_reply.unwrap();
        assert_eq!(second_reply.content[0].text, "FILE_SAVED");
    }

    #[tokio::test]
    async fn unsaved_changes_is_rejected_before_any_state_created() {
        let controller = controller(Config::default().diff_opts);
        controller.host.seed_file("/t/a.txt", "one\n");
        controller.host.seed_open_unsaved("/t/a.txt");
        let req = request("tab1", "/t/a.txt", "two\n");

        let err = controller.open_diff_blocking(req).await.unwrap_err();
        assert!(matches!(err, DiffError::UnsavedChanges { .. }));
        assert!(!controller.registry.contains("tab1"));
    }
}
