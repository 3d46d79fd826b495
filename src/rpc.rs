//! The three exposed tool handlers (`openDiff`/`closeTab`/
//! `closeAllDiffTabs`), wiring `proto.rs`'s wire types onto a
//! `DiffController`.
//!
//! This is the layer a real transport (WebSocket, stdio JSON-RPC, ...)
//! would call into after deserializing a request; framing itself is out
//! of scope here.

use std::sync::Arc;

use crate::controller::DiffController;
use crate::host::EditorHost;
use crate::proto::{CloseTabRequest, ErrorEnvelope, OpenDiffRequest, ToolReply};
use crate::state::DiffRequest;

/// Dispatches the three tool calls onto a shared `DiffController`.
pub struct RpcHandler<H: EditorHost> {
    controller: Arc<DiffController<H>>,
}

impl<H: EditorHost + Send + Sync + 'static> RpcHandler<H> {
    /// Wrap a controller for RPC dispatch.
    pub fn new(controller: Arc<DiffController<H>>) -> Self {
        Self { controller }
    }

    /// `openDiff`: render a diff and block the caller until it resolves.
    pub async fn open_diff(&self, request: OpenDiffRequest) -> Result<ToolReply, ErrorEnvelope> {
        let request = DiffRequest {
            old_file_path: request.old_file_path,
            new_file_path: request.new_file_path,
            new_file_contents: request.new_file_contents,
            tab_name: request.tab_name,
        };
        self.controller
            .open_diff_blocking(request)
            .await
            .map_err(ErrorEnvelope::from)
    }

    /// `closeTab`: force-resolve and tear down one diff tab.
    pub fn close_tab(&self, request: CloseTabRequest) -> Result<ToolReply, ErrorEnvelope> {
        self.controller
            .close_tab(&request.tab_name)
            .map_err(ErrorEnvelope::from)
    }

    /// `closeAllDiffTabs`: force-resolve and tear down every open diff tab.
    /// Cannot fail: an empty registry just yields `CLOSED_0_DIFF_TABS`.
    pub fn close_all_diff_tabs(&self) -> ToolReply {
        self.controller.close_all_diff_tabs()
    }
}
